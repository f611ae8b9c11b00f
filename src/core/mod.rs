//! Core components of the `marketplace-api` client.
//!
//! This module contains the request layer every collaborator goes through:
//! - The main [`ApiClient`] and its builder.
//! - The normalized [`ApiError`] and its [`ErrorKind`] taxonomy.
//! - The [`Transport`] seam and its `reqwest` implementation.
//! - Session events emitted on credential expiry.

/// The main client (`ApiClient`), builder, retry, cache, and connectivity.
pub mod client;
/// Error normalization (`ApiError`, `ErrorKind`) and build errors.
pub mod error;
/// The transport seam (`Transport`, `HttpRequest`, `RawResponse`).
pub mod net;
/// Request descriptors (`ApiRequest`).
pub mod request;
/// Session lifecycle events.
pub mod session;

// convenient re-exports so most code can just `use crate::core::ApiClient`
pub use client::{ApiClient, ApiClientBuilder, BaseUrls, CacheMode, CachePolicy, RetryConfig};
pub use error::{ApiError, BuildError, ErrorKind, classify_status, classify_transport};
pub use net::{HttpRequest, RawResponse, ReqwestTransport, Transport, TransportError};
pub use request::ApiRequest;
pub use session::SessionEvent;
