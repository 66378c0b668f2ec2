//! Connection status reconciliation against the backend.

use std::collections::BTreeMap;

use client::ConnectorApi;
use client::normalize::{connector_entries, connector_summaries, find_connector};
use proto::{ApiError, ConnectorStatus, ConnectorSummary, TenantContext};
use tracing::{debug, warn};

use crate::registry;

/// Fallback text for a per-connector lookup that failed without a message.
pub const STATUS_FALLBACK_MESSAGE: &str = "Failed to fetch status";

/// Statuses keyed by connector id.
pub type StatusMap = BTreeMap<String, ConnectorStatus>;

/// Connector list for display, plus a warning when it came from the local
/// catalog because the backend could not be reached.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorListing {
    pub connectors: Vec<ConnectorSummary>,
    pub warning: Option<String>,
}

/// Re-derives connection state from the backend on demand.
///
/// Holds no cached state: every call reflects the backend at that moment,
/// so repeated calls without backend changes yield equal results.
#[derive(Clone)]
pub struct StatusReconciler {
    api: ConnectorApi,
}

impl StatusReconciler {
    pub fn new(api: ConnectorApi) -> Self {
        Self { api }
    }

    /// Status of one connector.
    ///
    /// Tries `/connectors/{id}/status` first. On any failure, falls back to
    /// the matching entry of `/connectors`; a connector absent from the list
    /// is reported disconnected. Errors only when both requests fail.
    pub async fn fetch_status(
        &self,
        connector_id: &str,
        tenant: &TenantContext,
    ) -> Result<ConnectorStatus, ApiError> {
        match self.api.connector_status(connector_id, tenant).await {
            Ok(payload) => return Ok(ConnectorStatus::from_value(connector_id, payload.as_json())),
            Err(err) => {
                debug!(connector = %connector_id, error = %err, "Status endpoint failed, using connector list");
            }
        }

        let payload = self.api.list_connectors_raw(tenant).await?;
        let entry = payload
            .as_json()
            .and_then(connector_entries)
            .and_then(|entries| find_connector(entries, connector_id));
        let mut status = ConnectorStatus::from_value(connector_id, entry);
        status.error = None;
        Ok(status)
    }

    /// Statuses for every id in `connector_ids`.
    ///
    /// One `/connectors` call answers all ids when it succeeds with a
    /// recognizable shape. Otherwise each id is fetched on its own and a
    /// failure for one id becomes that entry's `error` without affecting
    /// the others.
    pub async fn fetch_all_statuses<S: AsRef<str>>(
        &self,
        connector_ids: &[S],
        tenant: &TenantContext,
    ) -> StatusMap {
        match self.api.list_connectors_raw(tenant).await {
            Ok(payload) => {
                if let Some(entries) = payload.as_json().and_then(connector_entries) {
                    return connector_ids
                        .iter()
                        .map(|id| {
                            let id = id.as_ref();
                            let mut status =
                                ConnectorStatus::from_value(id, find_connector(entries, id));
                            status.error = None;
                            (id.to_string(), status)
                        })
                        .collect();
                }
                warn!("Connector list has an unrecognized shape, fetching statuses individually");
            }
            Err(err) => {
                warn!(error = %err, "Connector list unavailable, fetching statuses individually");
            }
        }

        let mut statuses = StatusMap::new();
        for id in connector_ids {
            let id = id.as_ref();
            let status = match self.fetch_status(id, tenant).await {
                Ok(status) => status,
                Err(err) => {
                    let message = err.to_string();
                    let message = if message.trim().is_empty() {
                        STATUS_FALLBACK_MESSAGE.to_string()
                    } else {
                        message
                    };
                    ConnectorStatus::failed(id, message)
                }
            };
            statuses.insert(id.to_string(), status);
        }
        statuses
    }

    /// Connector list for display.
    ///
    /// An empty backend list shows the registry catalog. An unreachable
    /// backend also shows the catalog, with a warning.
    pub async fn connector_listing(&self, tenant: &TenantContext) -> ConnectorListing {
        match self.api.list_connectors_raw(tenant).await {
            Ok(payload) => {
                let connectors = payload
                    .as_json()
                    .map(connector_summaries)
                    .unwrap_or_default();
                ConnectorListing {
                    connectors: if connectors.is_empty() {
                        registry::catalog_fallback()
                    } else {
                        connectors
                    },
                    warning: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "Backend not reachable, using local catalog");
                ConnectorListing {
                    connectors: registry::catalog_fallback(),
                    warning: Some(format!(
                        "Backend not reachable ({err}). Showing local connector catalog."
                    )),
                }
            }
        }
    }
}
