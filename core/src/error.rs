//! Error types for the SKU client and the record utilities.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the SKU does not exist" from "the server returned an unexpected status."
//! Every other status mismatch lands in `UnexpectedStatus` with the raw
//! status code and body for debugging, including 2xx codes that are not the
//! exact one an operation expects.

use thiserror::Error;

/// Errors returned by `SkuClient` parse methods, transports and `SkuApi`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a status other than the one the operation expects.
    #[error("HTTP {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The request never produced a response (connection refused, DNS, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Errors raised while filtering or persisting records.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record is missing the 'createdAt' field")]
    MissingCreatedAt,

    #[error("could not convert 'createdAt' to a number: {0}")]
    InvalidCreatedAt(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
