//! Requests panel state

use crate::admin::RequestScope;
use chrono::{DateTime, Local};
use stubdeck_common::constants::{DEFAULT_LIMIT, LIMIT_OPTIONS};
use stubdeck_common::{filter_requests, LoggedRequest, RequestsEnvelope};

#[derive(Debug, Clone)]
pub struct RequestsPanel {
    /// Last fetched journal page, newest first
    pub records: Vec<LoggedRequest>,

    /// Total number of entries held by the server
    pub total: usize,

    pub search: String,
    pub limit: usize,

    /// Search has been widened to the whole journal
    pub search_all: bool,

    pub error: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
    pub cursor: usize,
}

impl Default for RequestsPanel {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            total: 0,
            search: String::new(),
            limit: DEFAULT_LIMIT,
            search_all: false,
            error: None,
            last_updated: None,
            cursor: 0,
        }
    }
}

impl RequestsPanel {
    /// Scope of the next fetch
    pub fn scope(&self) -> RequestScope {
        if self.search_all && !self.search.is_empty() {
            RequestScope::All
        } else {
            RequestScope::Limited(self.limit)
        }
    }

    pub fn filtered(&self) -> Vec<&LoggedRequest> {
        filter_requests(&self.records, &self.search)
    }

    pub fn selected(&self) -> Option<&LoggedRequest> {
        self.filtered().get(self.cursor).copied()
    }

    /// Offer "search all" when the server holds more than was fetched
    pub fn can_widen(&self) -> bool {
        !self.search.is_empty() && !self.search_all && self.total > self.records.len()
    }

    /// Update the query; clearing it cancels a widened search
    ///
    /// Returns true when the fetch scope changed.
    pub fn set_search(&mut self, query: String) -> bool {
        let before = self.scope();
        self.search = query;
        if self.search.is_empty() {
            self.search_all = false;
        }
        self.cursor = 0;
        self.scope() != before
    }

    /// Returns true when the fetch scope changed
    pub fn widen(&mut self) -> bool {
        if !self.can_widen() {
            return false;
        }
        self.search_all = true;
        true
    }

    pub fn cycle_limit(&mut self) {
        let idx = LIMIT_OPTIONS
            .iter()
            .position(|l| *l == self.limit)
            .map(|i| (i + 1) % LIMIT_OPTIONS.len())
            .unwrap_or(0);
        self.limit = LIMIT_OPTIONS[idx];
    }

    /// Take a fetch result; a failure keeps the previous list
    pub fn apply_fetch(&mut self, result: Result<RequestsEnvelope, String>) {
        match result {
            Ok(envelope) => {
                self.records = envelope.requests;
                self.total = envelope.meta.total;
                self.error = None;
                self.last_updated = Some(Local::now());
                self.clamp_cursor();
            }
            Err(message) => self.error = Some(message),
        }
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.filtered().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    fn clamp_cursor(&mut self) {
        let len = self.filtered().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(count: usize, total: usize) -> RequestsEnvelope {
        let requests: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "id": format!("r{}", i),
                    "request": { "method": "GET", "url": format!("/item/{}", i) },
                    "responseDefinition": { "status": 200 },
                    "wasMatched": true
                })
            })
            .collect();
        serde_json::from_value(json!({ "requests": requests, "meta": { "total": total } }))
            .unwrap()
    }

    #[test]
    fn test_default_scope_uses_limit() {
        let panel = RequestsPanel::default();
        assert_eq!(panel.scope(), RequestScope::Limited(100));
    }

    #[test]
    fn test_widen_only_when_truncated() {
        let mut panel = RequestsPanel::default();
        panel.apply_fetch(Ok(envelope(3, 3)));
        panel.set_search("item".to_string());
        assert!(!panel.can_widen());

        panel.apply_fetch(Ok(envelope(3, 250)));
        assert!(panel.can_widen());
        assert!(panel.widen());
        assert_eq!(panel.scope(), RequestScope::All);
        assert!(!panel.can_widen());
    }

    #[test]
    fn test_clearing_search_cancels_widening() {
        let mut panel = RequestsPanel::default();
        panel.apply_fetch(Ok(envelope(2, 500)));
        panel.set_search("x".to_string());
        panel.widen();

        assert!(panel.set_search(String::new()));
        assert!(!panel.search_all);
        assert_eq!(panel.scope(), RequestScope::Limited(100));
    }

    #[test]
    fn test_failure_keeps_previous_list() {
        let mut panel = RequestsPanel::default();
        panel.apply_fetch(Ok(envelope(2, 2)));
        panel.apply_fetch(Err("Network error: could not reach the server.".to_string()));

        assert_eq!(panel.records.len(), 2);
        assert!(panel.error.is_some());

        panel.apply_fetch(Ok(envelope(1, 1)));
        assert!(panel.error.is_none());
    }

    #[test]
    fn test_cycle_limit_wraps() {
        let mut panel = RequestsPanel::default();
        panel.cycle_limit();
        assert_eq!(panel.limit, 200);
        panel.cycle_limit();
        assert_eq!(panel.limit, 20);
    }

    #[test]
    fn test_filter_and_cursor() {
        let mut panel = RequestsPanel::default();
        panel.apply_fetch(Ok(envelope(12, 12)));
        panel.set_search("/item/1".to_string());
        assert_eq!(panel.filtered().len(), 3);

        panel.move_cursor(10);
        assert_eq!(panel.selected().unwrap().id, "r11");
        panel.move_cursor(-10);
        assert_eq!(panel.selected().unwrap().id, "r1");
    }
}
