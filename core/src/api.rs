//! One call per CRUD operation against the SKU catalog.
//!
//! # Design
//! `SkuApi` pairs a `SkuClient` with a `Transport` and runs build, execute
//! and parse in sequence. Every operation makes a single attempt. Failures
//! come back as `Err(ApiError)` and are also reported as `tracing` events so
//! a caller that ignores the error still leaves a trace in the logs:
//! transport failures at ERROR, status and decode failures at WARN.

use crate::client::SkuClient;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::transport::{Transport, UreqTransport};
use crate::types::Record;

/// Blocking CRUD facade over the `/skus` resource.
#[derive(Clone)]
pub struct SkuApi<T = UreqTransport> {
    client: SkuClient,
    transport: T,
}

impl SkuApi<UreqTransport> {
    /// Facade over a fresh ureq agent pointed at `config.base_url`.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(SkuClient::new(&config.base_url), UreqTransport::new())
    }
}

impl<T: Transport> SkuApi<T> {
    pub fn new(client: SkuClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &SkuClient {
        &self.client
    }

    /// `GET {base}`; succeeds only on 200.
    pub fn list_all(&self) -> Result<Vec<Record>, ApiError> {
        let request = self.client.build_list_skus();
        self.transport
            .execute(request)
            .and_then(|response| self.client.parse_list_skus(response))
            .inspect_err(|e| report("list", None, e))
    }

    /// `GET {base}/{id}`; succeeds only on 200.
    pub fn get_by_id(&self, id: &str) -> Result<Record, ApiError> {
        let request = self.client.build_get_sku(id);
        self.transport
            .execute(request)
            .and_then(|response| self.client.parse_get_sku(response))
            .inspect_err(|e| report("get", Some(id), e))
    }

    /// `POST {base}`; succeeds only on 201 and returns the record the
    /// service stored.
    pub fn create(&self, data: &Record) -> Result<Record, ApiError> {
        let created = self
            .client
            .build_create_sku(data)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.client.parse_create_sku(response))
            .inspect_err(|e| report("create", data.sku(), e))?;
        tracing::info!(sku_id = created.sku(), "SKU created");
        Ok(created)
    }

    /// `PUT {base}/{id}`; succeeds only on 200.
    pub fn update(&self, id: &str, data: &Record) -> Result<Record, ApiError> {
        let updated = self
            .client
            .build_update_sku(id, data)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.client.parse_update_sku(response))
            .inspect_err(|e| report("update", Some(id), e))?;
        tracing::info!(sku_id = id, "SKU updated");
        Ok(updated)
    }

    /// `DELETE {base}/{id}`; succeeds only on 204.
    pub fn delete(&self, id: &str) -> Result<(), ApiError> {
        let request = self.client.build_delete_sku(id);
        self.transport
            .execute(request)
            .and_then(|response| self.client.parse_delete_sku(response))
            .inspect_err(|e| report("delete", Some(id), e))?;
        tracing::info!(sku_id = id, "SKU deleted");
        Ok(())
    }
}

fn report(op: &'static str, sku_id: Option<&str>, err: &ApiError) {
    match err {
        ApiError::Transport(_) => {
            tracing::error!(op, sku_id, error = %err, "SKU request did not complete")
        }
        _ => tracing::warn!(op, sku_id, error = %err, "SKU request failed"),
    }
}
