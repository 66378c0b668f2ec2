//! Normalized shapes for search, create, and PAT connect payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One search hit, normalized across backend revisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

/// A page of search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<SearchItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// Search request parameters for `GET /connectors/{id}/search`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub q: String,
    pub resource_type: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Arbitrary filters, sent JSON-encoded in the `filters` parameter.
    pub filters: Option<Value>,
}

impl SearchQuery {
    /// Query for `q` with no paging or filters.
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            ..Self::default()
        }
    }
}

/// Result of a create call, normalized to the fields callers display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Full backend response.
    pub raw: Value,
}

impl CreatedResource {
    /// Best identifier to show: key, then id, then title.
    pub fn display_id(&self) -> &str {
        self.key
            .as_deref()
            .or(self.id.as_deref())
            .or(self.title.as_deref())
            .unwrap_or("(unknown)")
    }
}

/// Body of `POST /connectors/jira/issues`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JiraIssueDraft {
    pub project_key: String,
    pub summary: String,
    #[serde(default = "default_issue_type")]
    pub issuetype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_issue_type() -> String {
    "Task".to_string()
}

impl JiraIssueDraft {
    /// Draft with the default `Task` issue type and no description.
    pub fn new(project_key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            summary: summary.into(),
            issuetype: default_issue_type(),
            description: None,
        }
    }
}

/// Body of `POST /connectors/confluence/pages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluencePageDraft {
    pub space_key: String,
    pub title: String,
    pub body: String,
}

/// Personal access token credentials for `POST /connectors/{id}/connect`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PatCredentials {
    pub site_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub api_token: String,
}

impl std::fmt::Debug for PatCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatCredentials")
            .field("site_url", &self.site_url)
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jira_draft_defaults_issue_type_to_task() {
        let draft: JiraIssueDraft =
            serde_json::from_str(r#"{"project_key":"DEMO","summary":"s"}"#).unwrap();
        assert_eq!(draft.issuetype, "Task");
        assert_eq!(JiraIssueDraft::new("DEMO", "s").issuetype, "Task");
    }

    #[test]
    fn jira_draft_omits_missing_description() {
        let body = serde_json::to_value(JiraIssueDraft::new("DEMO", "s")).unwrap();
        assert!(body.get("description").is_none());
    }

    #[test]
    fn created_resource_display_prefers_key() {
        let created = CreatedResource {
            id: Some("10001".to_string()),
            key: Some("DEMO-1".to_string()),
            title: None,
            url: None,
            raw: Value::Null,
        };
        assert_eq!(created.display_id(), "DEMO-1");
    }

    #[test]
    fn pat_debug_redacts_token() {
        let pat = PatCredentials {
            site_url: "https://acme.atlassian.net".to_string(),
            email: None,
            api_token: "secret-token".to_string(),
        };
        let rendered = format!("{pat:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
