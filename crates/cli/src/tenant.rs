//! Persisted tenant selection (`~/.uconnect/state.toml`).

use proto::TenantContext;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable that overrides the stored tenant for one run.
pub const TENANT_ENV: &str = "UCONNECT_TENANT_ID";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tenant_id: Option<String>,
}

/// Tenant id remembered across invocations.
#[derive(Debug, Clone)]
pub struct TenantStore {
    path: PathBuf,
    tenant_id: Option<String>,
}

impl TenantStore {
    /// Default file path: `~/.uconnect/state.toml`.
    pub fn path() -> PathBuf {
        crate::config::app_dir().join("state.toml")
    }

    /// Load from the default path.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    /// Load from a specific path. A missing or invalid file means no tenant.
    pub fn load_from(path: &Path) -> Self {
        let state: StateFile = match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring invalid state file");
                StateFile::default()
            }),
            Err(_) => StateFile::default(),
        };
        Self {
            path: path.to_path_buf(),
            tenant_id: normalize(state.tenant_id),
        }
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Stores `tenant_id` (trimmed). `None` or a blank value removes it.
    ///
    /// The in-memory value is updated even when persisting fails.
    pub fn set(&mut self, tenant_id: Option<&str>) -> Result<(), std::io::Error> {
        self.tenant_id = normalize(tenant_id.map(str::to_string));
        debug!(tenant = ?self.tenant_id, "Tenant updated");

        let mut state: StateFile = std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default();
        state.tenant_id = self.tenant_id.clone();

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&state).map_err(std::io::Error::other)?;
        std::fs::write(&self.path, content)
    }

    /// Effective tenant for this run: `override_id`, then the
    /// `UCONNECT_TENANT_ID` environment variable, then the stored value.
    pub fn context(&self, override_id: Option<&str>) -> TenantContext {
        let env_id = std::env::var(TENANT_ENV).ok();
        let chosen = override_id
            .filter(|s| !s.trim().is_empty())
            .or(env_id.as_deref().filter(|s| !s.trim().is_empty()))
            .or(self.tenant_id());
        TenantContext::new(chosen)
    }
}

fn normalize(tenant_id: Option<String>) -> Option<String> {
    tenant_id
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
