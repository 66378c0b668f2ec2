//! Token-based connect and disconnect.

use client::{ConnectorApi, Payload};
use proto::{ApiError, ConnectError, PatCredentials, TenantContext};
use tracing::{debug, info};

use crate::registry;

/// Which endpoint removed the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// `DELETE /connectors/{id}/connection` succeeded.
    ConnectionDeleted,
    /// The delete endpoint was missing; `POST /connectors/{id}/disconnect`
    /// succeeded instead.
    LegacyDisconnect,
}

/// Disconnects `connector_id`.
///
/// The `DELETE` route is tried first; only a 404 from it falls back to the
/// legacy `POST` route. Any other failure is returned as-is.
pub async fn disconnect_connector(
    api: &ConnectorApi,
    connector_id: &str,
    tenant: &TenantContext,
) -> Result<DisconnectOutcome, ApiError> {
    match api.delete_connection(connector_id, tenant).await {
        Ok(_) => {
            info!(connector = %connector_id, "Connection deleted");
            Ok(DisconnectOutcome::ConnectionDeleted)
        }
        Err(err) if err.is_not_found() => {
            debug!(connector = %connector_id, "Delete route missing, using legacy disconnect");
            api.disconnect(connector_id, tenant).await?;
            info!(connector = %connector_id, "Connector disconnected");
            Ok(DisconnectOutcome::LegacyDisconnect)
        }
        Err(err) => Err(err),
    }
}

/// Checks PAT credentials locally before anything is sent.
pub fn validate_credentials(credentials: &PatCredentials) -> Result<(), ConnectError> {
    if credentials.site_url.trim().is_empty() {
        return Err(ConnectError::MissingField("site_url".to_string()));
    }
    if credentials.api_token.trim().is_empty() {
        return Err(ConnectError::MissingField("api_token".to_string()));
    }
    Ok(())
}

/// Connects a registry connector with personal access token credentials.
pub async fn connect_with_token(
    api: &ConnectorApi,
    connector_id: &str,
    credentials: &PatCredentials,
    tenant: &TenantContext,
) -> Result<Payload, ConnectError> {
    let connector = registry::resolve_connector(connector_id)?;
    validate_credentials(credentials)?;

    let trimmed = PatCredentials {
        site_url: credentials.site_url.trim().trim_end_matches('/').to_string(),
        email: credentials
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_string),
        api_token: credentials.api_token.trim().to_string(),
    };
    let payload = api.connect_with_token(connector.id, &trimmed, tenant).await?;
    info!(connector = %connector.id, tenant = %tenant, "Connected with access token");
    Ok(payload)
}
