//! Shared data model for the unified connector client.
//!
//! This crate defines connector/status/tenant/OAuth types, normalized
//! search and create shapes, and strongly-typed error enums shared across
//! the workspace.

pub mod connector;
pub mod error;
pub mod oauth;
pub mod resource;
pub mod tenant;

/// Re-export of connector metadata and status types.
pub use connector::{ConnectorDescriptor, ConnectorStatus, ConnectorSummary};
/// Re-export of all error types.
pub use error::*;
/// Re-export of the OAuth session record.
pub use oauth::OAuthSession;
/// Re-export of search/create/PAT payload types.
pub use resource::{
    ConfluencePageDraft, CreatedResource, JiraIssueDraft, PatCredentials, SearchItem, SearchPage,
    SearchQuery,
};
/// Re-export of tenant scope types.
pub use tenant::{TENANT_HEADER, TenantContext};
