//! Uniform request/response handling against the connector backend.

use std::sync::Arc;
use std::time::Duration;

use proto::{ApiError, TENANT_HEADER, TenantContext};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::normalize::error_message;
use crate::transport::{ApiRequest, HttpMethod, RawResponse, ReqwestTransport, Transport};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Query parameters; `None` values are skipped.
pub type Query<'a> = [(&'a str, Option<String>)];

/// Decoded body of a 2xx response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Empty body (e.g. 204).
    Empty,
    /// Body parsed as JSON.
    Json(Value),
    /// Non-empty body that is not JSON.
    Text(String),
}

impl Payload {
    /// Returns the JSON value, if the body was JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Converts into a JSON value: empty → `null`, text → string.
    pub fn into_value(self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Json(v) => v,
            Self::Text(t) => Value::String(t),
        }
    }
}

/// JSON client for the backend REST API.
///
/// Each call is a single request: no retries, no caching.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl ApiClient {
    /// Creates a client using the reqwest transport.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self::with_transport(
            base_url,
            Arc::new(ReqwestTransport::new(timeout)?),
        ))
    }

    /// Creates a client over an arbitrary transport (useful for tests).
    pub fn with_transport(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let base_url = if base_url.is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            base_url
        };
        Self {
            transport,
            base_url,
        }
    }

    /// Configured base URL without trailing slashes.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the absolute URL for `path` plus the non-empty `query` pairs.
    pub fn build_url(&self, path: &str, query: &Query<'_>) -> Result<Url, ApiError> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        let mut url = Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|e| ApiError::InvalidResponse(format!("invalid request URL: {e}")))?;
        let present: Vec<(&str, &str)> = query
            .iter()
            .filter_map(|(k, v)| v.as_deref().map(|v| (*k, v)))
            .collect();
        if !present.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in present {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends one request and normalizes the response.
    ///
    /// Non-2xx responses become [`ApiError::Status`] with a message taken
    /// from the JSON body when possible. 2xx bodies decode to [`Payload`].
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &Query<'_>,
        body: Option<&Value>,
        tenant: &TenantContext,
    ) -> Result<Payload, ApiError> {
        let url = self.build_url(path, query)?;

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(tenant_id) = tenant.header_value() {
            headers.push((TENANT_HEADER.to_string(), tenant_id.to_string()));
        }

        let body = if method.sends_body() {
            let body = body.cloned().unwrap_or_else(|| Value::Object(Default::default()));
            Some(
                serde_json::to_string(&body)
                    .map_err(|e| ApiError::InvalidResponse(format!("unserializable body: {e}")))?,
            )
        } else {
            None
        };

        debug!(
            method = %method,
            path = %url.path(),
            tenant = ?tenant.header_value(),
            "Sending API request"
        );
        let response = self
            .transport
            .send(ApiRequest {
                method,
                url,
                headers,
                body,
            })
            .await?;
        debug!(method = %method, path = %path, status = %response.status, "API response received");

        decode_response(response)
    }

    /// `GET path?query`.
    pub async fn get(
        &self,
        path: &str,
        query: &Query<'_>,
        tenant: &TenantContext,
    ) -> Result<Payload, ApiError> {
        self.request(HttpMethod::Get, path, query, None, tenant)
            .await
    }

    /// `POST path` with a JSON body.
    pub async fn post(
        &self,
        path: &str,
        body: Option<&Value>,
        tenant: &TenantContext,
    ) -> Result<Payload, ApiError> {
        self.request(HttpMethod::Post, path, &[], body, tenant)
            .await
    }

    /// `DELETE path`.
    pub async fn delete(&self, path: &str, tenant: &TenantContext) -> Result<Payload, ApiError> {
        self.request(HttpMethod::Delete, path, &[], None, tenant)
            .await
    }
}

/// Maps a raw response onto `Payload` or `ApiError::Status`.
pub fn decode_response(response: RawResponse) -> Result<Payload, ApiError> {
    if !response.is_success() {
        let detail = serde_json::from_str::<Value>(&response.body).ok();
        return Err(ApiError::Status {
            status: response.status,
            message: error_message(response.status, detail.as_ref()),
            detail,
        });
    }

    if response.body.trim().is_empty() {
        return Ok(Payload::Empty);
    }
    match serde_json::from_str::<Value>(&response.body) {
        Ok(value) => Ok(Payload::Json(value)),
        Err(_) => Ok(Payload::Text(response.body)),
    }
}
