//! Domain types for the SKU catalog.
//!
//! # Design
//! The catalog speaks loosely typed JSON, so every field is optional, no
//! field is type-checked on the way in, and any key this crate does not know
//! about is kept in `extra`. A record decoded from the service and saved back
//! to disk is structurally identical to what the service sent. `sku` and
//! `description` stay raw JSON behind `&str` accessors; `createdAt` is only
//! coerced to a number when something asks for it (see
//! `Record::created_at_secs`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RecordError;

/// A single catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Unix timestamp in seconds. Usually a number, sometimes a numeric string.
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Price as sent by the service, usually `"2.99"` or `2.99`. Never parsed;
/// any other JSON shape is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Text(String),
    Number(serde_json::Number),
    Other(Value),
}

impl From<&str> for Price {
    fn from(value: &str) -> Self {
        Price::Text(value.to_string())
    }
}

impl Record {
    /// Record with the three descriptive fields set and no timestamp.
    pub fn new(sku: &str, description: &str, price: impl Into<Price>) -> Self {
        Self {
            sku: Some(Value::from(sku)),
            description: Some(Value::from(description)),
            price: Some(price.into()),
            ..Self::default()
        }
    }

    /// The `sku` field when it is a JSON string.
    pub fn sku(&self) -> Option<&str> {
        self.sku.as_ref().and_then(Value::as_str)
    }

    /// The `description` field when it is a JSON string.
    pub fn description(&self) -> Option<&str> {
        self.description.as_ref().and_then(Value::as_str)
    }

    pub fn with_created_at(mut self, secs: i64) -> Self {
        self.created_at = Some(Value::from(secs));
        self
    }

    /// Coerce `createdAt` to seconds as `f64`.
    ///
    /// Numbers are taken as-is and strings are parsed as floats. Anything
    /// else, including a missing field, is an error.
    pub fn created_at_secs(&self) -> Result<f64, RecordError> {
        let value = self.created_at.as_ref().ok_or(RecordError::MissingCreatedAt)?;
        match value {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| RecordError::InvalidCreatedAt(n.to_string())),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| RecordError::InvalidCreatedAt(format!("{s:?}"))),
            other => Err(RecordError::InvalidCreatedAt(other.to_string())),
        }
    }
}
