use serde::{Deserialize, Serialize};

/// Name of the request header that scopes a call to a tenant.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Tenant scope threaded explicitly through every API call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl TenantContext {
    /// No tenant; requests carry no tenant header.
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a context from an optional id. Blank ids mean "no tenant".
    pub fn new(tenant_id: Option<impl Into<String>>) -> Self {
        let tenant_id = tenant_id
            .map(Into::into)
            .map(|id: String| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Self { tenant_id }
    }

    /// Value for the tenant header, if one should be sent.
    pub fn header_value(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }
}

impl std::fmt::Display for TenantContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.tenant_id {
            Some(id) => write!(f, "{id}"),
            None => write!(f, "(none)"),
        }
    }
}
