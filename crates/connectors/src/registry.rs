//! Static catalog of known connectors.

use proto::{ConnectError, ConnectorDescriptor, ConnectorSummary};

/// Connectors this client knows how to drive.
pub const CONNECTORS: &[ConnectorDescriptor] = &[
    ConnectorDescriptor {
        id: "jira",
        display_name: "Jira",
        description: Some("Atlassian Jira integration"),
        category: Some("Project Management"),
        icon: Some("🧩"),
        color: Some("#2684FF"),
    },
    ConnectorDescriptor {
        id: "confluence",
        display_name: "Confluence",
        description: Some("Atlassian Confluence integration"),
        category: Some("Knowledge Base"),
        icon: Some("📘"),
        color: Some("#172B4D"),
    },
];

/// Looks up a connector by id (case-insensitive).
pub fn connector_by_id(id: &str) -> Option<&'static ConnectorDescriptor> {
    let needle = id.trim().to_ascii_lowercase();
    CONNECTORS.iter().find(|c| c.id == needle)
}

/// Like [`connector_by_id`], but unknown ids are an error.
pub fn resolve_connector(id: &str) -> Result<&'static ConnectorDescriptor, ConnectError> {
    connector_by_id(id).ok_or_else(|| ConnectError::UnknownConnector(id.trim().to_string()))
}

/// All registry ids, in catalog order.
pub fn connector_ids() -> Vec<&'static str> {
    CONNECTORS.iter().map(|c| c.id).collect()
}

/// Comma-separated id list for user prompts.
pub fn connector_names() -> String {
    connector_ids().join(", ")
}

/// Registry entries as disconnected summaries, shown when the backend list
/// is unavailable or empty.
pub fn catalog_fallback() -> Vec<ConnectorSummary> {
    CONNECTORS
        .iter()
        .map(ConnectorSummary::from_descriptor)
        .collect()
}

/// Display name for `id`, falling back to the id itself.
pub fn display_name(id: &str) -> String {
    connector_by_id(id)
        .map(|c| c.display_name.to_string())
        .unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive_and_trimmed() {
        assert_eq!(connector_by_id(" JIRA ").map(|c| c.id), Some("jira"));
        assert!(connector_by_id("notion").is_none());
    }

    #[test]
    fn resolve_reports_unknown_connector() {
        let err = resolve_connector("notion").unwrap_err();
        assert!(err.to_string().contains("Unknown connector: notion"));
    }

    #[test]
    fn ids_are_unique_and_in_catalog_order() {
        assert_eq!(connector_ids(), vec!["jira", "confluence"]);
        assert_eq!(connector_names(), "jira, confluence");
    }

    #[test]
    fn catalog_fallback_is_all_disconnected() {
        let fallback = catalog_fallback();
        assert_eq!(fallback.len(), CONNECTORS.len());
        assert!(fallback.iter().all(|c| !c.is_connected()));
        assert_eq!(fallback[1].name, "Confluence");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        assert_eq!(display_name("jira"), "Jira");
        assert_eq!(display_name("github"), "github");
    }
}
