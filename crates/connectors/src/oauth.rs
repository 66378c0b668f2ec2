//! OAuth connect flow: start, callback parsing, code exchange and the
//! post-connect redirect.
//!
//! The flow is modelled as an explicit [`OAuthPhase`] so each step can be
//! driven (and tested) on its own:
//!
//! ```text
//! Idle -> Redirecting -> AwaitingCallback -> Exchanging -> Connected
//!                                                      \-> Failed
//! ```

use std::time::Duration;

use client::ConnectorApi;
use proto::{ApiError, ConnectorStatus, OAuthError, OAuthSession, TenantContext};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::{Url, form_urlencoded};

use crate::registry;

/// Prefix for exchange failures that carry no backend message.
pub const EXCHANGE_FALLBACK_MESSAGE: &str = "OAuth completion failed";

pub const DEFAULT_CALLBACK_BASE: &str = "http://127.0.0.1:9009";
pub const DEFAULT_CALLBACK_PATH: &str = "/oauth/callback";
pub const DEFAULT_DASHBOARD_PATH: &str = "/connectors";
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_millis(800);

// ── Settings ─────────────────────────────────────────────────

/// Where the provider sends the user back, and where the user lands after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    /// Scheme and authority of the local callback receiver.
    pub callback_base: String,
    pub callback_path: String,
    /// Destination path for the "connected" banner.
    pub dashboard_path: String,
    /// Pause between a successful exchange and the redirect.
    pub redirect_delay: Duration,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            callback_base: DEFAULT_CALLBACK_BASE.to_string(),
            callback_path: DEFAULT_CALLBACK_PATH.to_string(),
            dashboard_path: DEFAULT_DASHBOARD_PATH.to_string(),
            redirect_delay: DEFAULT_REDIRECT_DELAY,
        }
    }
}

impl OAuthSettings {
    /// `<callback_base><callback_path>?connector_id=<id>`.
    pub fn callback_url(&self, connector_id: &str) -> String {
        format!(
            "{}{}?connector_id={}",
            self.callback_base.trim_end_matches('/'),
            normalize_callback_path(&self.callback_path),
            urlencoding::encode(connector_id)
        )
    }
}

/// Request path the local receiver must match for a configured callback
/// path: trimmed, with exactly one leading `/`.
pub fn normalize_callback_path(path: &str) -> String {
    format!("/{}", path.trim().trim_start_matches('/'))
}

// ── Phases ───────────────────────────────────────────────────

/// Validated parameters of a provider callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub connector_id: String,
    pub code: String,
    pub state: Option<String>,
}

/// Where a connect attempt currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum OAuthPhase {
    Idle,
    /// Authorize URL obtained; the user must be sent there.
    Redirecting {
        auth_url: String,
        session: OAuthSession,
    },
    /// User is at the provider; waiting for the callback.
    AwaitingCallback { session: OAuthSession },
    /// Callback received and valid; code exchange pending.
    Exchanging(CallbackParams),
    Connected {
        connector_id: String,
        result: Value,
        /// `<dashboard_path>?connected=1&connector=<id>`.
        redirect_to: String,
    },
    Failed {
        connector_id: Option<String>,
        message: String,
    },
}

impl OAuthPhase {
    /// Classifies a callback query without side effects.
    ///
    /// Accepts a bare query (`a=b&c=d`, with or without leading `?`) or a
    /// full callback URL.
    pub fn from_callback_query(query: &str) -> Self {
        match parse_callback(query) {
            Ok(params) => OAuthPhase::Exchanging(params),
            Err(err) => OAuthPhase::Failed {
                connector_id: connector_id_from_query(query),
                message: err.to_string(),
            },
        }
    }

    /// Like [`OAuthPhase::from_callback_query`], additionally checking the
    /// callback against a pending session.
    pub fn from_callback_query_for(session: &OAuthSession, query: &str) -> Self {
        let phase = Self::from_callback_query(query);
        let OAuthPhase::Exchanging(params) = &phase else {
            return phase;
        };

        let error = if params.connector_id != session.connector_id {
            OAuthError::ConnectorMismatch {
                expected: session.connector_id.clone(),
                received: params.connector_id.clone(),
            }
        } else if !session.accepts_state(params.state.as_deref()) {
            OAuthError::StateMismatch
        } else {
            return phase;
        };
        warn!(
            expected = %session.connector_id,
            received = %params.connector_id,
            error = %error,
            "OAuth callback does not match pending session"
        );
        OAuthPhase::Failed {
            connector_id: Some(params.connector_id.clone()),
            message: error.to_string(),
        }
    }

    /// `Redirecting` becomes `AwaitingCallback` once the user has been sent
    /// to the provider. Other phases are returned unchanged.
    pub fn awaiting(self) -> Self {
        match self {
            OAuthPhase::Redirecting { session, .. } => OAuthPhase::AwaitingCallback { session },
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OAuthPhase::Connected { .. } | OAuthPhase::Failed { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            OAuthPhase::Idle => "idle",
            OAuthPhase::Redirecting { .. } => "redirecting",
            OAuthPhase::AwaitingCallback { .. } => "awaiting_callback",
            OAuthPhase::Exchanging(_) => "exchanging",
            OAuthPhase::Connected { .. } => "connected",
            OAuthPhase::Failed { .. } => "failed",
        }
    }
}

// ── Query helpers ────────────────────────────────────────────

fn query_part(input: &str) -> &str {
    let input = input.trim();
    let query = match input.split_once('?') {
        Some((_, query)) => query,
        None => input,
    };
    query.split('#').next().unwrap_or_default()
}

fn query_value(query: &str, key: &str) -> Option<String> {
    form_urlencoded::parse(query_part(query).as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

fn connector_id_from_query(query: &str) -> Option<String> {
    query_value(query, "connector_id").or_else(|| query_value(query, "connector"))
}

/// Validates a provider callback query.
///
/// `connector` is accepted as an alias of `connector_id`. A provider `error`
/// parameter wins over a missing `code`.
pub fn parse_callback(query: &str) -> Result<CallbackParams, OAuthError> {
    let connector_id = connector_id_from_query(query).ok_or(OAuthError::MissingConnectorId)?;

    if let Some(error) = query_value(query, "error") {
        let description = query_value(query, "error_description").unwrap_or_default();
        return Err(OAuthError::Provider { error, description });
    }

    let code = query_value(query, "code").ok_or(OAuthError::MissingCode)?;
    Ok(CallbackParams {
        connector_id,
        code,
        state: query_value(query, "state"),
    })
}

/// Builds the post-connect destination for `connector_id`.
pub fn post_connect_redirect(dashboard_path: &str, connector_id: &str) -> String {
    format!(
        "{dashboard_path}?connected=1&connector={}",
        urlencoding::encode(connector_id)
    )
}

/// Returns the connector id announced by a post-connect destination, if the
/// destination carries `connected=1`.
pub fn parse_connected_banner(destination: &str) -> Option<String> {
    if query_value(destination, "connected").as_deref() != Some("1") {
        return None;
    }
    query_value(destination, "connector")
}

fn state_from_auth_url(auth_url: &str) -> String {
    Url::parse(auth_url)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(k, _)| k == "state")
                .map(|(_, v)| v.into_owned())
        })
        .unwrap_or_default()
}

fn exchange_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Status { message, .. } if !message.trim().is_empty() => message.clone(),
        other => format!("{EXCHANGE_FALLBACK_MESSAGE}: {other}"),
    }
}

// ── Controller ───────────────────────────────────────────────

/// Drives the backend side of the OAuth flow.
#[derive(Clone)]
pub struct OAuthController {
    api: ConnectorApi,
    settings: OAuthSettings,
}

impl OAuthController {
    pub fn new(api: ConnectorApi, settings: OAuthSettings) -> Self {
        Self { api, settings }
    }

    pub fn settings(&self) -> &OAuthSettings {
        &self.settings
    }

    /// Requests an authorize URL for `connector_id`.
    ///
    /// Rejected locally, without any backend call, when `current` already
    /// reports the connector as connected.
    pub async fn start(
        &self,
        connector_id: &str,
        current: &ConnectorStatus,
        tenant: &TenantContext,
    ) -> Result<OAuthPhase, OAuthError> {
        if current.connected {
            return Err(OAuthError::AlreadyConnected(registry::display_name(
                connector_id,
            )));
        }

        let redirect_target = self.settings.callback_url(connector_id);
        let auth_url = self
            .api
            .oauth_login_url(connector_id, Some(&redirect_target), tenant)
            .await?;
        let state = state_from_auth_url(&auth_url);
        info!(connector = %connector_id, tenant = %tenant, "OAuth authorization started");

        Ok(OAuthPhase::Redirecting {
            auth_url,
            session: OAuthSession {
                connector_id: connector_id.to_string(),
                state,
                redirect_target,
            },
        })
    }

    /// Exchanges the code of an `Exchanging` phase with the backend.
    ///
    /// Phases other than `Exchanging` are returned unchanged and cause no
    /// backend call.
    pub async fn exchange(&self, phase: OAuthPhase, tenant: &TenantContext) -> OAuthPhase {
        let params = match phase {
            OAuthPhase::Exchanging(params) => params,
            other => return other,
        };

        debug!(connector = %params.connector_id, "Exchanging OAuth code");
        match self
            .api
            .complete_oauth_callback(
                &params.connector_id,
                &params.code,
                params.state.as_deref(),
                tenant,
            )
            .await
        {
            Ok(result) => {
                let redirect_to =
                    post_connect_redirect(&self.settings.dashboard_path, &params.connector_id);
                info!(connector = %params.connector_id, "OAuth connection completed");
                OAuthPhase::Connected {
                    connector_id: params.connector_id,
                    result,
                    redirect_to,
                }
            }
            Err(err) => {
                warn!(connector = %params.connector_id, error = %err, "OAuth exchange failed");
                OAuthPhase::Failed {
                    connector_id: Some(params.connector_id),
                    message: exchange_failure_message(&err),
                }
            }
        }
    }

    /// Parses `query` (checked against `session` when one is held) and
    /// exchanges the code if the callback is valid.
    pub async fn complete_callback(
        &self,
        session: Option<&OAuthSession>,
        query: &str,
        tenant: &TenantContext,
    ) -> OAuthPhase {
        let phase = match session {
            Some(session) => OAuthPhase::from_callback_query_for(session, query),
            None => OAuthPhase::from_callback_query(query),
        };
        self.exchange(phase, tenant).await
    }

    /// Waits the redirect delay and returns the post-connect destination of
    /// a `Connected` phase. Any other phase yields `None` at once.
    pub async fn follow_redirect<'a>(&self, phase: &'a OAuthPhase) -> Option<&'a str> {
        let OAuthPhase::Connected { redirect_to, .. } = phase else {
            return None;
        };
        if !self.settings.redirect_delay.is_zero() {
            tokio::time::sleep(self.settings.redirect_delay).await;
        }
        Some(redirect_to)
    }
}
