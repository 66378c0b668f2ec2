//! Typed wrappers over the connector backend's REST endpoints.

use proto::{
    ApiError, ConfluencePageDraft, ConnectorSummary, CreatedResource, JiraIssueDraft,
    PatCredentials, SearchPage, SearchQuery, TenantContext,
};
use serde_json::Value;
use tracing::debug;

use crate::api::{ApiClient, Payload};
use crate::normalize;

/// Builds `/connectors/{id}{suffix}` with the id percent-encoded.
pub fn connector_path(connector_id: &str, suffix: &str) -> String {
    format!("/connectors/{}{suffix}", urlencoding::encode(connector_id))
}

/// Backend endpoints grouped by connector concern.
#[derive(Clone)]
pub struct ConnectorApi {
    client: ApiClient,
}

impl ConnectorApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Underlying request client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Raw `GET /connectors` body, for callers that need shape detection.
    pub async fn list_connectors_raw(&self, tenant: &TenantContext) -> Result<Payload, ApiError> {
        self.client.get("/connectors", &[], tenant).await
    }

    /// `GET /connectors`, normalized. Unrecognized shapes yield an empty list.
    pub async fn list_connectors(
        &self,
        tenant: &TenantContext,
    ) -> Result<Vec<ConnectorSummary>, ApiError> {
        let payload = self.list_connectors_raw(tenant).await?;
        Ok(payload
            .as_json()
            .map(normalize::connector_summaries)
            .unwrap_or_default())
    }

    /// `GET /connectors/{id}/status`. Not every backend serves it.
    pub async fn connector_status(
        &self,
        connector_id: &str,
        tenant: &TenantContext,
    ) -> Result<Payload, ApiError> {
        self.client
            .get(&connector_path(connector_id, "/status"), &[], tenant)
            .await
    }

    /// `GET /connectors/{id}/oauth/login?redirect_to=...`, returning the
    /// provider authorize URL.
    pub async fn oauth_login_url(
        &self,
        connector_id: &str,
        redirect_to: Option<&str>,
        tenant: &TenantContext,
    ) -> Result<String, ApiError> {
        let payload = self
            .client
            .get(
                &connector_path(connector_id, "/oauth/login"),
                &[("redirect_to", redirect_to.map(str::to_string))],
                tenant,
            )
            .await?;
        let url = payload.as_json().and_then(|v| {
            v.get("auth_url")
                .or_else(|| v.get("authorize_url"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        });
        url.ok_or_else(|| {
            ApiError::InvalidResponse("OAuth login response has no auth_url".to_string())
        })
    }

    /// `GET /connectors/{id}/oauth/callback?code=...&state=...`.
    pub async fn complete_oauth_callback(
        &self,
        connector_id: &str,
        code: &str,
        state: Option<&str>,
        tenant: &TenantContext,
    ) -> Result<Value, ApiError> {
        let payload = self
            .client
            .get(
                &connector_path(connector_id, "/oauth/callback"),
                &[
                    ("code", Some(code.to_string())),
                    ("state", state.filter(|s| !s.is_empty()).map(str::to_string)),
                ],
                tenant,
            )
            .await?;
        Ok(payload.into_value())
    }

    /// `POST /connectors/{id}/connect` using credentials the backend already holds.
    pub async fn connect(
        &self,
        connector_id: &str,
        tenant: &TenantContext,
    ) -> Result<Payload, ApiError> {
        self.client
            .post(&connector_path(connector_id, "/connect"), None, tenant)
            .await
    }

    /// `POST /connectors/{id}/connect` with personal access token credentials.
    pub async fn connect_with_token(
        &self,
        connector_id: &str,
        credentials: &PatCredentials,
        tenant: &TenantContext,
    ) -> Result<Payload, ApiError> {
        let body = serde_json::to_value(credentials)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        debug!(connector = %connector_id, site = %credentials.site_url, "Connecting with PAT");
        self.client
            .post(&connector_path(connector_id, "/connect"), Some(&body), tenant)
            .await
    }

    /// `POST /connectors/{id}/disconnect`.
    pub async fn disconnect(
        &self,
        connector_id: &str,
        tenant: &TenantContext,
    ) -> Result<Payload, ApiError> {
        self.client
            .post(&connector_path(connector_id, "/disconnect"), None, tenant)
            .await
    }

    /// `DELETE /connectors/{id}/connection`.
    pub async fn delete_connection(
        &self,
        connector_id: &str,
        tenant: &TenantContext,
    ) -> Result<Payload, ApiError> {
        self.client
            .delete(&connector_path(connector_id, "/connection"), tenant)
            .await
    }

    /// `GET /connectors/{id}/search`, normalized into a [`SearchPage`].
    pub async fn search(
        &self,
        connector_id: &str,
        query: &SearchQuery,
        tenant: &TenantContext,
    ) -> Result<SearchPage, ApiError> {
        let filters = query
            .filters
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let payload = self
            .client
            .get(
                &connector_path(connector_id, "/search"),
                &[
                    ("q", Some(query.q.clone())),
                    ("resource_type", query.resource_type.clone()),
                    ("page", query.page.map(|p| p.to_string())),
                    ("per_page", query.per_page.map(|p| p.to_string())),
                    ("filters", filters),
                ],
                tenant,
            )
            .await?;
        Ok(payload
            .as_json()
            .map(normalize::search_page)
            .unwrap_or_default())
    }

    /// `POST /connectors/jira/issues`.
    pub async fn create_jira_issue(
        &self,
        draft: &JiraIssueDraft,
        tenant: &TenantContext,
    ) -> Result<CreatedResource, ApiError> {
        let body =
            serde_json::to_value(draft).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let payload = self
            .client
            .post("/connectors/jira/issues", Some(&body), tenant)
            .await?;
        Ok(normalize::created_resource(payload.into_value()))
    }

    /// `POST /connectors/confluence/pages`.
    pub async fn create_confluence_page(
        &self,
        draft: &ConfluencePageDraft,
        tenant: &TenantContext,
    ) -> Result<CreatedResource, ApiError> {
        let body =
            serde_json::to_value(draft).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let payload = self
            .client
            .post("/connectors/confluence/pages", Some(&body), tenant)
            .await?;
        Ok(normalize::created_resource(payload.into_value()))
    }

    /// `GET /connectors/jira/projects`.
    pub async fn list_jira_projects(&self, tenant: &TenantContext) -> Result<Vec<Value>, ApiError> {
        self.list_resources("/connectors/jira/projects", "projects", tenant)
            .await
    }

    /// `GET /connectors/confluence/spaces`.
    pub async fn list_confluence_spaces(
        &self,
        tenant: &TenantContext,
    ) -> Result<Vec<Value>, ApiError> {
        self.list_resources("/connectors/confluence/spaces", "spaces", tenant)
            .await
    }

    /// Accepts a bare array, `{<envelope>: [...]}`, or `{items|results: [...]}`.
    async fn list_resources(
        &self,
        path: &str,
        envelope: &str,
        tenant: &TenantContext,
    ) -> Result<Vec<Value>, ApiError> {
        let value = self.client.get(path, &[], tenant).await?.into_value();
        let entries = match &value {
            Value::Array(entries) => Some(entries),
            Value::Object(obj) => [envelope, "items", "results"]
                .iter()
                .find_map(|k| obj.get(*k).and_then(Value::as_array)),
            _ => None,
        };
        Ok(entries.cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeTransport;
    use crate::transport::HttpMethod;
    use serde_json::json;
    use std::sync::Arc;

    fn api(fake: &Arc<FakeTransport>) -> ConnectorApi {
        ConnectorApi::new(ApiClient::with_transport("http://backend.test", fake.clone()))
    }

    #[test]
    fn connector_path_percent_encodes_the_id() {
        assert_eq!(connector_path("jira", "/status"), "/connectors/jira/status");
        assert_eq!(
            connector_path("my connector", "/search"),
            "/connectors/my%20connector/search"
        );
    }

    #[tokio::test]
    async fn list_connectors_accepts_envelope() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            HttpMethod::Get,
            "/connectors",
            200,
            r#"{"connectors":[{"id":"jira","name":"Jira","connected":true}]}"#,
        );
        let list = api(&fake)
            .list_connectors(&TenantContext::none())
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
        assert!(list[0].is_connected());
    }

    #[tokio::test]
    async fn list_connectors_unknown_shape_is_empty() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(HttpMethod::Get, "/connectors", 200, r#"{"data":{}}"#);
        let list = api(&fake)
            .list_connectors(&TenantContext::none())
            .await
            .unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn oauth_login_url_sends_redirect_and_accepts_either_field() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            HttpMethod::Get,
            "/connectors/jira/oauth/login",
            200,
            r#"{"auth_url":"https://auth.example/authorize?state=s1"}"#,
        );
        fake.respond(
            HttpMethod::Get,
            "/connectors/confluence/oauth/login",
            200,
            r#"{"authorize_url":"https://auth.example/c","state":"s2"}"#,
        );
        let api = api(&fake);
        let tenant = TenantContext::new(Some("acme"));

        let jira = api
            .oauth_login_url("jira", Some("http://127.0.0.1:9009/cb?connector_id=jira"), &tenant)
            .await
            .unwrap();
        assert_eq!(jira, "https://auth.example/authorize?state=s1");
        let confluence = api
            .oauth_login_url("confluence", None, &tenant)
            .await
            .unwrap();
        assert_eq!(confluence, "https://auth.example/c");

        let calls = fake.calls();
        assert_eq!(
            calls[0].query_param("redirect_to").as_deref(),
            Some("http://127.0.0.1:9009/cb?connector_id=jira")
        );
        assert_eq!(calls[1].query_param("redirect_to"), None);
    }

    #[tokio::test]
    async fn oauth_login_url_without_url_is_invalid_response() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(HttpMethod::Get, "/connectors/jira/oauth/login", 200, "{}");
        let err = api(&fake)
            .oauth_login_url("jira", None, &TenantContext::none())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn complete_callback_omits_empty_state() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            HttpMethod::Get,
            "/connectors/jira/oauth/callback",
            200,
            r#"{"ok":true}"#,
        );
        let result = api(&fake)
            .complete_oauth_callback("jira", "c0de", Some(""), &TenantContext::none())
            .await
            .unwrap();
        assert_eq!(result, json!({"ok": true}));
        let call = &fake.calls()[0];
        assert_eq!(call.query_param("code").as_deref(), Some("c0de"));
        assert_eq!(call.query_param("state"), None);
    }

    #[tokio::test]
    async fn search_sends_paging_and_json_filters() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            HttpMethod::Get,
            "/connectors/jira/search",
            200,
            r#"{"results":[{"key":"DEMO-1","url":"https://x/DEMO-1"}],"total":1}"#,
        );
        let mut query = SearchQuery::new("login bug");
        query.resource_type = Some("issue".to_string());
        query.page = Some(2);
        query.per_page = Some(10);
        query.filters = Some(json!({"status": "open"}));

        let page = api(&fake)
            .search("jira", &query, &TenantContext::none())
            .await
            .unwrap();
        assert_eq!(page.total, Some(1));
        assert_eq!(page.items[0].title, "DEMO-1");

        let call = &fake.calls()[0];
        assert_eq!(call.query_param("q").as_deref(), Some("login bug"));
        assert_eq!(call.query_param("resource_type").as_deref(), Some("issue"));
        assert_eq!(call.query_param("page").as_deref(), Some("2"));
        assert_eq!(call.query_param("per_page").as_deref(), Some("10"));
        assert_eq!(
            call.query_param("filters").as_deref(),
            Some(r#"{"status":"open"}"#)
        );
    }

    #[tokio::test]
    async fn create_jira_issue_posts_draft_and_normalizes() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            HttpMethod::Post,
            "/connectors/jira/issues",
            201,
            r#"{"id":"10001","key":"DEMO-7","url":"https://acme/browse/DEMO-7"}"#,
        );
        let created = api(&fake)
            .create_jira_issue(
                &JiraIssueDraft::new("DEMO", "Broken login"),
                &TenantContext::none(),
            )
            .await
            .unwrap();
        assert_eq!(created.display_id(), "DEMO-7");

        let body: Value =
            serde_json::from_str(fake.calls()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["project_key"], "DEMO");
        assert_eq!(body["issuetype"], "Task");
    }

    #[tokio::test]
    async fn create_confluence_page_surfaces_backend_message() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            HttpMethod::Post,
            "/connectors/confluence/pages",
            400,
            r#"{"message":"space_key not found"}"#,
        );
        let draft = ConfluencePageDraft {
            space_key: "NOPE".to_string(),
            title: "t".to_string(),
            body: "b".to_string(),
        };
        let err = api(&fake)
            .create_confluence_page(&draft, &TenantContext::none())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "space_key not found");
    }

    #[tokio::test]
    async fn list_resources_accepts_named_envelope() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(
            HttpMethod::Get,
            "/connectors/jira/projects",
            200,
            r#"{"projects":[{"key":"DEMO"},{"key":"OPS"}]}"#,
        );
        fake.respond(
            HttpMethod::Get,
            "/connectors/confluence/spaces",
            200,
            r#"[{"key":"ENG"}]"#,
        );
        let api = api(&fake);
        let tenant = TenantContext::none();
        assert_eq!(api.list_jira_projects(&tenant).await.unwrap().len(), 2);
        assert_eq!(api.list_confluence_spaces(&tenant).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn pat_connect_posts_credentials() {
        let fake = Arc::new(FakeTransport::new());
        fake.respond(HttpMethod::Post, "/connectors/jira/connect", 200, "{}");
        let creds = PatCredentials {
            site_url: "https://acme.atlassian.net".to_string(),
            email: Some("dev@acme.test".to_string()),
            api_token: "tok".to_string(),
        };
        api(&fake)
            .connect_with_token("jira", &creds, &TenantContext::none())
            .await
            .unwrap();
        let body: Value =
            serde_json::from_str(fake.calls()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["site_url"], "https://acme.atlassian.net");
        assert_eq!(body["api_token"], "tok");
    }
}
