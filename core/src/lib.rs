//! Synchronous client core for the Freshservice contacts API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! round-trip, either by hand or by handing a `Transport` to the
//! convenience methods on `ContactClient`.
//!
//! # Design
//! - `ContactClient` is stateless: base URL plus an optional auth header.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - `QueryBatcher` packs filter conditions into search queries that stay
//!   under the server's length cap; see the `query` module for its contract.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod types;

pub use client::ContactClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use query::{
    Batches, FilterCondition, FilterValue, QueryBatch, QueryBatcher, DEFAULT_BATCH_LIMIT,
};
pub use types::{Contact, SearchResults};
