use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Static metadata for a known connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorDescriptor {
    /// Canonical connector id used in API paths (`jira`, `confluence`).
    pub id: &'static str,
    /// Human-readable label.
    pub display_name: &'static str,
    /// Short description shown in listings.
    pub description: Option<&'static str>,
    /// Grouping label (e.g. "Project Management").
    pub category: Option<&'static str>,
    /// Single-glyph icon.
    pub icon: Option<&'static str>,
    /// Accent color as a hex string.
    pub color: Option<&'static str>,
}

/// One entry of the backend connector list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl ConnectorSummary {
    /// Builds a disconnected summary from a static descriptor.
    pub fn from_descriptor(descriptor: &ConnectorDescriptor) -> Self {
        Self {
            id: descriptor.id.to_string(),
            name: descriptor.display_name.to_string(),
            description: descriptor.description.map(str::to_string),
            connected: Some(false),
            category: descriptor.category.map(str::to_string),
            icon: descriptor.icon.map(str::to_string),
        }
    }

    /// Returns `true` only when the backend explicitly reported `connected: true`.
    pub fn is_connected(&self) -> bool {
        self.connected.unwrap_or(false)
    }
}

/// Connection state derived from one reconciliation pass.
///
/// Never persisted; every reconciliation replaces the previous value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorStatus {
    pub connector_id: String,
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectorStatus {
    /// Status for a connector with no data: disconnected, no error.
    pub fn disconnected(connector_id: impl Into<String>) -> Self {
        Self {
            connector_id: connector_id.into(),
            connected: false,
            last_refresh: None,
            metadata: Map::new(),
            error: None,
        }
    }

    /// Status for a connector whose lookup failed.
    pub fn failed(connector_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::disconnected(connector_id)
        }
    }

    /// Derives a status from a loosely-shaped backend object.
    ///
    /// Only a literal `true` counts as connected. `last_refresh` is kept
    /// when it parses as RFC 3339; `metadata` when it is an object.
    pub fn from_value(connector_id: impl Into<String>, value: Option<&Value>) -> Self {
        let mut status = Self::disconnected(connector_id);
        let Some(obj) = value.and_then(Value::as_object) else {
            return status;
        };
        status.connected = obj.get("connected").and_then(Value::as_bool) == Some(true);
        status.last_refresh = obj
            .get("last_refresh")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));
        if let Some(Value::Object(meta)) = obj.get("metadata") {
            status.metadata = meta.clone();
        }
        status.error = obj
            .get("error")
            .and_then(Value::as_str)
            .filter(|e| !e.is_empty())
            .map(str::to_string);
        status
    }

    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match (self.connected, self.error.is_some()) {
            (_, true) => "error",
            (true, false) => "connected",
            (false, false) => "not connected",
        }
    }
}
