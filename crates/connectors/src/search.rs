//! Search with supersession: a newer search aborts the one in flight.

use client::ConnectorApi;
use parking_lot::Mutex;
use proto::{ApiError, SearchPage, SearchQuery, TenantContext};
use tokio::task::AbortHandle;
use tracing::debug;

/// Result of one [`SearchRunner::search`] call.
#[derive(Debug)]
pub enum SearchOutcome {
    Completed(Result<SearchPage, ApiError>),
    /// A later search started before this one finished.
    Superseded,
}

/// Runs searches so that only the latest one delivers a result.
pub struct SearchRunner {
    api: ConnectorApi,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl SearchRunner {
    pub fn new(api: ConnectorApi) -> Self {
        Self {
            api,
            in_flight: Mutex::new(None),
        }
    }

    /// Searches `connector_id`, aborting any search still in flight.
    pub async fn search(
        &self,
        connector_id: &str,
        query: SearchQuery,
        tenant: TenantContext,
    ) -> SearchOutcome {
        let api = self.api.clone();
        let connector_id = connector_id.to_string();
        let task = tokio::spawn(async move { api.search(&connector_id, &query, &tenant).await });

        if let Some(previous) = self.in_flight.lock().replace(task.abort_handle()) {
            previous.abort();
        }

        match task.await {
            Ok(result) => SearchOutcome::Completed(result),
            Err(err) if err.is_cancelled() => {
                debug!("Search superseded by a newer query");
                SearchOutcome::Superseded
            }
            Err(err) => SearchOutcome::Completed(Err(ApiError::Transport(format!(
                "search task failed: {err}"
            )))),
        }
    }
}
