//! Substring search over the loaded lists

use crate::wire::{LoggedRequest, StubMapping};

/// Case-insensitive substring match against any of `fields`
///
/// An empty query matches everything.
pub fn matches_query(query: &str, fields: &[&str]) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Journal entries whose method or URL contains `query`
pub fn filter_requests<'a>(records: &'a [LoggedRequest], query: &str) -> Vec<&'a LoggedRequest> {
    records
        .iter()
        .filter(|r| matches_query(query, &[r.request.method.as_str(), r.request.url.as_str()]))
        .collect()
}

/// Mappings whose method label or URL matcher value contains `query`
pub fn filter_mappings<'a>(mappings: &'a [StubMapping], query: &str) -> Vec<&'a StubMapping> {
    mappings
        .iter()
        .filter(|m| matches_query(query, &[m.method_label(), m.url_label()]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, method: &str, url: &str) -> LoggedRequest {
        serde_json::from_value(json!({
            "id": id,
            "request": { "method": method, "url": url, "absoluteUrl": format!("http://h{url}") },
            "responseDefinition": { "status": 200 },
            "wasMatched": true
        }))
        .unwrap()
    }

    fn stub(id: &str, request: serde_json::Value) -> StubMapping {
        serde_json::from_value(json!({ "id": id, "request": request, "response": { "status": 200 } }))
            .unwrap()
    }

    #[test]
    fn test_empty_query_returns_everything() {
        let records = vec![record("1", "GET", "/a"), record("2", "POST", "/b")];
        assert_eq!(filter_requests(&records, "").len(), 2);
    }

    #[test]
    fn test_requests_match_method_or_url_case_insensitively() {
        let records = vec![
            record("1", "GET", "/Users/1"),
            record("2", "POST", "/orders"),
            record("3", "DELETE", "/posts"),
        ];

        let ids = |query: &str| -> Vec<String> {
            filter_requests(&records, query)
                .into_iter()
                .map(|r| r.id.clone())
                .collect()
        };

        assert_eq!(ids("users"), vec!["1"]);
        assert_eq!(ids("post"), vec!["2", "3"]);
        assert_eq!(ids("DEL"), vec!["3"]);
        assert!(ids("nothing").is_empty());
    }

    #[test]
    fn test_mappings_match_resolved_url_and_any_method() {
        let mappings = vec![
            stub("a", json!({ "method": "GET", "urlPathPattern": "/api/.*" })),
            stub("b", json!({ "urlPath": "/health" })),
            stub("c", json!({ "method": "PUT" })),
        ];

        let ids = |query: &str| -> Vec<String> {
            filter_mappings(&mappings, query)
                .into_iter()
                .map(|m| m.id.clone())
                .collect()
        };

        assert_eq!(ids("API"), vec!["a"]);
        assert_eq!(ids("any"), vec!["b", "c"]);
        assert_eq!(ids("put"), vec!["c"]);
    }
}
