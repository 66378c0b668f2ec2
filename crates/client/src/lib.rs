//! HTTP client for the unified connector backend.
//!
//! [`ApiClient`] performs single JSON requests with tenant scoping and error
//! normalization; [`ConnectorApi`] wraps the backend's connector endpoints
//! with typed, shape-tolerant results.

pub mod api;
pub mod endpoints;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
pub mod normalize;
pub mod transport;

pub use api::{ApiClient, DEFAULT_BASE_URL, Payload};
pub use endpoints::{ConnectorApi, connector_path};
pub use transport::{ApiRequest, HttpMethod, RawResponse, ReqwestTransport, Transport};
