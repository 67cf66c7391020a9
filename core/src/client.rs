//! Stateless HTTP request builder and response parser for the SKU catalog.
//!
//! # Design
//! `SkuClient` holds only the collection URL and carries no mutable state
//! between calls. Each CRUD operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. `SkuApi` glues the two together over a `Transport`.
//!
//! Status checks are exact: a 202 from a create or a 200 from a delete is a
//! failure, not a success.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::Record;

/// Everything but RFC 3986 unreserved characters is escaped, so an id is
/// always exactly one path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Synchronous, stateless request builder for the `/skus` resource.
#[derive(Debug, Clone)]
pub struct SkuClient {
    base_url: String,
}

impl SkuClient {
    /// `base_url` is the collection URL, e.g. `https://host/dev/skus`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, utf8_percent_encode(id, PATH_SEGMENT))
    }

    pub fn build_list_skus(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.base_url.clone(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_sku(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_sku(&self, data: &Record) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: self.base_url.clone(),
            headers: json_headers(),
            body: Some(to_body(data)?),
        })
    }

    pub fn build_update_sku(&self, id: &str, data: &Record) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            url: self.item_url(id),
            headers: json_headers(),
            body: Some(to_body(data)?),
        })
    }

    pub fn build_delete_sku(&self, id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_skus(&self, response: HttpResponse) -> Result<Vec<Record>, ApiError> {
        check_status(&response, 200)?;
        from_body(&response.body)
    }

    pub fn parse_get_sku(&self, response: HttpResponse) -> Result<Record, ApiError> {
        check_status(&response, 200)?;
        from_body(&response.body)
    }

    pub fn parse_create_sku(&self, response: HttpResponse) -> Result<Record, ApiError> {
        check_status(&response, 201)?;
        from_body(&response.body)
    }

    pub fn parse_update_sku(&self, response: HttpResponse) -> Result<Record, ApiError> {
        check_status(&response, 200)?;
        from_body(&response.body)
    }

    pub fn parse_delete_sku(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn to_body(data: &Record) -> Result<String, ApiError> {
    serde_json::to_string(data).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map anything but the expected status to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::UnexpectedStatus {
        status: response.status,
        body: response.body.clone(),
    })
}
