use serde_json::Value;
use thiserror::Error;

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration loading/validation error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API error.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// OAuth flow error.
    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    /// Connect/disconnect lifecycle error.
    #[error("Connect error: {0}")]
    Connect(#[from] ConnectError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field has an invalid value and reason.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Filesystem read error.
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(String),
}

/// Backend API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network/connection-level failure before any response arrived.
    #[error("Network error: {0}")]
    Transport(String),

    /// Backend answered with a non-2xx status.
    #[error("{message}")]
    Status {
        /// Numeric HTTP status.
        status: u16,
        /// Human-readable message extracted from the body, or a generic one.
        message: String,
        /// Parsed JSON error body, when the body was JSON.
        detail: Option<Value>,
    },

    /// Response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Returns the HTTP status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` when the backend answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// OAuth flow errors
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Connector is already linked; it must be disconnected first.
    #[error("{0} is already connected. Disconnect it before connecting again.")]
    AlreadyConnected(String),

    /// Callback query had no `connector_id`.
    #[error("Missing connector_id")]
    MissingConnectorId,

    /// Callback query had no `code`.
    #[error("Missing OAuth code")]
    MissingCode,

    /// Provider redirected back with an `error` parameter.
    #[error("Provider returned OAuth error '{error}': {description}")]
    Provider { error: String, description: String },

    /// Callback `state` did not match the pending session.
    #[error("OAuth state mismatch; aborting")]
    StateMismatch,

    /// Callback belongs to a different connector than the pending session.
    #[error("OAuth callback is for '{received}' but '{expected}' is being connected")]
    ConnectorMismatch { expected: String, received: String },

    /// Local callback listener failure.
    #[error("Callback failed: {0}")]
    Callback(String),

    /// Backend call failed during start or exchange.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Connect/disconnect lifecycle errors
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Connector id is not in the registry.
    #[error("Unknown connector: {0}")]
    UnknownConnector(String),

    /// A required PAT field is empty.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}
