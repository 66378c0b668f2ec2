use client::DEFAULT_BASE_URL;
use connectors::OAuthSettings;
use connectors::oauth::normalize_callback_path;
use proto::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Application directory: `~/.uconnect`.
pub fn app_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".uconnect")
}

/// Top-level configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub oauth: OAuthConfig,
}

/// Backend API location.
///
/// Environment overrides, highest priority first:
/// - `UCONNECT_API_BASE_URL`
/// - `UCONNECT_BACKEND_URL`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_backend_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_backend_timeout_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_backend_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Local OAuth callback receiver and post-connect redirect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    #[serde(default = "default_callback_host")]
    pub callback_host: String,
    #[serde(default = "default_callback_port")]
    pub callback_port: u16,
    #[serde(default = "default_callback_path")]
    pub callback_path: String,
    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,
    /// Pause after a successful exchange before reconciling.
    #[serde(default = "default_redirect_delay_ms")]
    pub redirect_delay_ms: u64,
    /// Seconds to wait for the browser callback.
    #[serde(default = "default_oauth_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,
}

fn default_callback_host() -> String {
    "127.0.0.1".to_string()
}

fn default_callback_port() -> u16 {
    9009
}

fn default_callback_path() -> String {
    connectors::oauth::DEFAULT_CALLBACK_PATH.to_string()
}

fn default_dashboard_path() -> String {
    connectors::oauth::DEFAULT_DASHBOARD_PATH.to_string()
}

fn default_redirect_delay_ms() -> u64 {
    800
}

fn default_oauth_timeout_secs() -> u64 {
    120
}

fn default_open_browser() -> bool {
    true
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            callback_host: default_callback_host(),
            callback_port: default_callback_port(),
            callback_path: default_callback_path(),
            dashboard_path: default_dashboard_path(),
            redirect_delay_ms: default_redirect_delay_ms(),
            timeout_secs: default_oauth_timeout_secs(),
            open_browser: default_open_browser(),
        }
    }
}

impl OAuthConfig {
    /// `http://<callback_host>:<callback_port>`.
    pub fn callback_base(&self) -> String {
        self.callback_base_on(self.callback_port)
    }

    fn callback_base_on(&self, port: u16) -> String {
        format!("http://{}:{}", self.callback_host, port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Flow settings for [`connectors::OAuthController`].
    pub fn settings(&self) -> OAuthSettings {
        self.settings_for_port(self.callback_port)
    }

    /// Flow settings whose callback points at the port the local listener
    /// actually bound (differs from `callback_port` when that is `0`).
    pub fn settings_for_port(&self, port: u16) -> OAuthSettings {
        OAuthSettings {
            callback_base: self.callback_base_on(port),
            callback_path: normalize_callback_path(&self.callback_path),
            dashboard_path: self.dashboard_path.clone(),
            redirect_delay: Duration::from_millis(self.redirect_delay_ms),
        }
    }
}

impl Config {
    /// Loads configuration from explicit path, fallback locations, and env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = path.map(|p| p.to_path_buf()).or_else(|| {
            let cwd = std::env::current_dir().ok()?.join("config.toml");
            if cwd.exists() {
                return Some(cwd);
            }
            let home_config = app_dir().join("config.toml");
            if home_config.exists() {
                return Some(home_config);
            }
            None
        });
        debug!(path = ?config_path, "Config file resolved");

        let mut config = if let Some(path) = config_path {
            let content = std::fs::read_to_string(&path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(|e| ConfigError::Toml(e.to_string()))?
        } else {
            Config::default()
        };

        // Lowest priority first; later overrides win.
        if let Ok(url) = std::env::var("UCONNECT_BACKEND_URL")
            && !url.trim().is_empty()
        {
            config.backend.base_url = url;
        }
        if let Ok(url) = std::env::var("UCONNECT_API_BASE_URL")
            && !url.trim().is_empty()
        {
            config.backend.base_url = url;
        }
        if let Ok(port) = std::env::var("UCONNECT_CALLBACK_PORT")
            && let Ok(p) = port.parse::<u16>()
        {
            config.oauth.callback_port = p;
        }

        config.validate()?;
        debug!(
            base_url = %config.backend.base_url,
            callback = %config.oauth.callback_base(),
            "Config loaded"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let base = self.backend.base_url.trim();
        if !base.is_empty() {
            Url::parse(base).map_err(|e| ConfigError::InvalidValue {
                field: "backend.base_url".to_string(),
                reason: e.to_string(),
            })?;
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backend.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.oauth.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "oauth.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
