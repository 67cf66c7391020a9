//! Blocking client for the SKU catalog service plus helpers for the records
//! it returns.
//!
//! # Overview
//! - [`SkuClient`] builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network.
//! - [`SkuApi`] runs those requests through a [`Transport`] (ureq by default)
//!   and reports failures both as `Err` and as `tracing` events.
//! - [`records`] filters, counts and saves lists of [`Record`].
//!
//! # Design
//! - No state is shared between calls; the base URL is fixed at construction
//!   from an [`ApiConfig`].
//! - Each operation is tried once. There is no retry and no timeout beyond
//!   the transport's defaults.
//! - Status codes must match exactly; see [`client`].

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod records;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use api::SkuApi;
pub use client::SkuClient;
pub use config::{ApiConfig, DEFAULT_BASE_URL};
pub use error::{ApiError, RecordError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{Price, Record};
