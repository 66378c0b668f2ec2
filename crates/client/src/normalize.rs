//! Shape tolerance for backend responses.
//!
//! Backend revisions disagree on envelope shapes (bare arrays vs.
//! `{connectors: [...]}`, `items` vs. `results`). Everything here accepts
//! every shape seen so far and degrades to "empty" rather than failing.

use proto::{ConnectorSummary, CreatedResource, SearchItem, SearchPage};
use serde_json::Value;

/// Returns the connector entries of a `GET /connectors` body, or `None`
/// when the shape is not recognized.
pub fn connector_entries(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(entries) => Some(entries),
        Value::Object(obj) => obj.get("connectors").and_then(Value::as_array),
        _ => None,
    }
}

/// Finds the entry whose `id` (string or number) equals `connector_id`.
pub fn find_connector<'a>(entries: &'a [Value], connector_id: &str) -> Option<&'a Value> {
    entries.iter().find(|entry| {
        entry
            .get("id")
            .and_then(scalar_to_string)
            .is_some_and(|id| id == connector_id)
    })
}

/// Parses connector summaries, skipping entries without an id.
pub fn connector_summaries(value: &Value) -> Vec<ConnectorSummary> {
    let Some(entries) = connector_entries(value) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let id = obj.get("id").and_then(scalar_to_string)?;
            let name = string_field(entry, &["name", "display_name"]).unwrap_or_default();
            Some(ConnectorSummary {
                id,
                name,
                description: string_field(entry, &["description"]),
                connected: obj.get("connected").and_then(Value::as_bool),
                category: string_field(entry, &["category"]),
                icon: string_field(entry, &["icon"]),
            })
        })
        .collect()
}

/// Normalizes a search response body into a [`SearchPage`].
pub fn search_page(value: &Value) -> SearchPage {
    let (items, total) = match value {
        Value::Array(items) => (Some(items), None),
        Value::Object(obj) => (
            obj.get("items")
                .and_then(Value::as_array)
                .or_else(|| obj.get("results").and_then(Value::as_array)),
            obj.get("total").and_then(Value::as_u64),
        ),
        _ => (None, None),
    };
    SearchPage {
        items: items
            .map(|items| items.iter().filter_map(search_item).collect())
            .unwrap_or_default(),
        total,
    }
}

/// Normalizes one search hit. Non-object entries are dropped.
pub fn search_item(value: &Value) -> Option<SearchItem> {
    value.as_object()?;
    Some(SearchItem {
        id: value.get("id").and_then(scalar_to_string),
        title: string_field(value, &["title", "key", "name"]).unwrap_or_else(|| "Result".to_string()),
        url: string_field(value, &["url"]),
        kind: string_field(value, &["type", "resource_type"]),
        subtitle: string_field(value, &["subtitle"]),
    })
}

/// Normalizes a create response, keeping the raw body.
pub fn created_resource(value: Value) -> CreatedResource {
    CreatedResource {
        id: value.get("id").and_then(scalar_to_string),
        key: string_field(&value, &["key"]),
        title: string_field(&value, &["title"]),
        url: string_field(&value, &["url"]),
        raw: value,
    }
}

/// Human-readable message for a non-2xx response.
///
/// Looks at `message`, `detail`, `error`, then `error.message`; falls back
/// to `API Error <status> <reason>`.
pub fn error_message(status: u16, detail: Option<&Value>) -> String {
    let from_body = detail.and_then(|v| {
        v.get("message")
            .and_then(Value::as_str)
            .or_else(|| v.get("detail").and_then(Value::as_str))
            .or_else(|| v.get("error").and_then(Value::as_str))
            .or_else(|| v.get("error").and_then(|e| e.get("message")).and_then(Value::as_str))
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
    });
    from_body.unwrap_or_else(|| {
        match reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
        {
            Some(reason) => format!("API Error {status} {reason}"),
            None => format!("API Error {status}"),
        }
    })
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| value.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn connector_entries_accepts_array_and_envelope() {
        let bare = json!([{"id": "jira"}]);
        let wrapped = json!({"connectors": [{"id": "jira"}]});
        assert_eq!(connector_entries(&bare).map(Vec::len), Some(1));
        assert_eq!(connector_entries(&wrapped).map(Vec::len), Some(1));
        assert!(connector_entries(&json!({"items": []})).is_none());
        assert!(connector_entries(&json!("nope")).is_none());
    }

    #[test]
    fn find_connector_matches_numeric_ids_as_strings() {
        let entries = vec![json!({"id": 7, "connected": true}), json!({"name": "no id"})];
        assert!(find_connector(&entries, "7").is_some());
        assert!(find_connector(&entries, "jira").is_none());
    }

    #[test]
    fn connector_summaries_skip_entries_without_id() {
        let value = json!({"connectors": [
            {"id": "jira", "name": "Jira", "connected": true, "category": "PM"},
            {"name": "orphan"},
            "garbage"
        ]});
        let summaries = connector_summaries(&value);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "jira");
        assert!(summaries[0].is_connected());
        assert_eq!(summaries[0].category.as_deref(), Some("PM"));
    }

    #[test]
    fn search_page_handles_every_envelope() {
        let bare = search_page(&json!([{"id": "1", "title": "A"}]));
        assert_eq!(bare.items.len(), 1);
        assert_eq!(bare.total, None);

        let items = search_page(&json!({"items": [{"key": "DEMO-1"}], "total": 40}));
        assert_eq!(items.items[0].title, "DEMO-1");
        assert_eq!(items.total, Some(40));

        let results = search_page(&json!({"results": [{"name": "Space"}]}));
        assert_eq!(results.items[0].title, "Space");

        assert!(search_page(&json!({"unexpected": true})).items.is_empty());
    }

    #[test]
    fn search_item_title_falls_back_to_placeholder() {
        let item = search_item(&json!({"id": 3, "url": "https://x"})).unwrap();
        assert_eq!(item.title, "Result");
        assert_eq!(item.id.as_deref(), Some("3"));
        assert!(search_item(&json!(42)).is_none());
    }

    #[test]
    fn created_resource_keeps_raw_body() {
        let created = created_resource(json!({"id": "10001", "key": "DEMO-9", "self": "x"}));
        assert_eq!(created.key.as_deref(), Some("DEMO-9"));
        assert_eq!(created.raw["self"], "x");
    }

    #[test]
    fn error_message_prefers_body_fields_in_order() {
        let both = json!({"message": "first", "detail": "second"});
        assert_eq!(error_message(400, Some(&both)), "first");

        let nested = json!({"error": {"message": "quota exceeded"}});
        assert_eq!(error_message(429, Some(&nested)), "quota exceeded");

        let structured_detail = json!({"detail": [{"loc": ["body"], "msg": "bad"}]});
        assert_eq!(
            error_message(422, Some(&structured_detail)),
            "API Error 422 Unprocessable Entity"
        );
        assert_eq!(error_message(404, None), "API Error 404 Not Found");
    }
}
