//! Connector workflows on top of the backend client.
//!
//! - [`registry`]: the static Jira/Confluence catalog
//! - [`oauth`]: the OAuth connect flow as explicit phases
//! - [`status`]: connection status reconciliation
//! - [`lifecycle`]: token connect and disconnect
//! - [`search`]: superseding search runner

pub mod lifecycle;
pub mod oauth;
pub mod registry;
pub mod search;
pub mod status;

pub use lifecycle::{DisconnectOutcome, connect_with_token, disconnect_connector};
pub use oauth::{
    CallbackParams, OAuthController, OAuthPhase, OAuthSettings, parse_callback,
    parse_connected_banner, post_connect_redirect,
};
pub use registry::{CONNECTORS, connector_by_id, connector_ids, resolve_connector};
pub use search::{SearchOutcome, SearchRunner};
pub use status::{ConnectorListing, StatusMap, StatusReconciler};
