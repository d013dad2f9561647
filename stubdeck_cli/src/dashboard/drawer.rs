//! Read-only detail drawers

use stubdeck_common::{LoggedRequest, StubMapping};

/// Which detail view is layered over the active tab
#[derive(Debug, Clone)]
pub enum Drawer {
    Request(RequestDrawer),
    Mapping(MappingDrawer),
}

impl Drawer {
    pub fn scroll_by(&mut self, delta: i32) {
        let scroll = match self {
            Drawer::Request(d) => &mut d.scroll,
            Drawer::Mapping(d) => &mut d.scroll,
        };
        *scroll = scroll.saturating_add_signed(delta as i16);
    }
}

/// Detail of one journal entry
#[derive(Debug, Clone)]
pub struct RequestDrawer {
    pub record: LoggedRequest,
    pub scroll: u16,
}

impl RequestDrawer {
    pub fn new(record: LoggedRequest) -> Self {
        Self { record, scroll: 0 }
    }
}

/// Detail of one stub mapping
#[derive(Debug, Clone)]
pub struct MappingDrawer {
    pub mapping: StubMapping,

    /// The request this drawer was reached from, restored by "back"
    pub back: Option<LoggedRequest>,

    pub confirm_delete: bool,
    pub deleting: bool,
    pub delete_error: Option<String>,
    pub scroll: u16,
}

impl MappingDrawer {
    pub fn new(mapping: StubMapping, back: Option<LoggedRequest>) -> Self {
        Self {
            mapping,
            back,
            confirm_delete: false,
            deleting: false,
            delete_error: None,
            scroll: 0,
        }
    }

    /// Show `mapping`; sub-state resets when it is a different mapping
    pub fn show(&mut self, mapping: StubMapping) {
        if mapping.id != self.mapping.id {
            self.confirm_delete = false;
            self.deleting = false;
            self.delete_error = None;
            self.scroll = 0;
        }
        self.mapping = mapping;
    }
}

/// Pretty-print a JSON body, or return it unchanged
pub fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| body.to_string())
}

/// Status code family, for colouring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Redirect,
    ClientError,
    ServerError,
    Other,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirect,
            400..=499 => StatusClass::ClientError,
            500.. => StatusClass::ServerError,
            _ => StatusClass::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stub(id: &str) -> StubMapping {
        serde_json::from_value(json!({ "id": id, "request": {}, "response": { "status": 200 } }))
            .unwrap()
    }

    #[test]
    fn test_pretty_body() {
        assert_eq!(pretty_body(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
        assert_eq!(pretty_body("plain <text>"), "plain <text>");
    }

    #[test]
    fn test_show_resets_sub_state_on_identity_change() {
        let mut drawer = MappingDrawer::new(stub("a"), None);
        drawer.confirm_delete = true;
        drawer.delete_error = Some("HTTP 500".to_string());

        drawer.show(stub("a"));
        assert!(drawer.confirm_delete);

        drawer.show(stub("b"));
        assert!(!drawer.confirm_delete);
        assert!(drawer.delete_error.is_none());
        assert_eq!(drawer.mapping.id, "b");
    }

    #[test]
    fn test_status_class() {
        assert_eq!(StatusClass::of(201), StatusClass::Success);
        assert_eq!(StatusClass::of(302), StatusClass::Redirect);
        assert_eq!(StatusClass::of(404), StatusClass::ClientError);
        assert_eq!(StatusClass::of(503), StatusClass::ServerError);
        assert_eq!(StatusClass::of(101), StatusClass::Other);
    }

    #[test]
    fn test_scroll_saturates() {
        let mut drawer = Drawer::Mapping(MappingDrawer::new(stub("a"), None));
        drawer.scroll_by(-3);
        drawer.scroll_by(2);
        match drawer {
            Drawer::Mapping(d) => assert_eq!(d.scroll, 2),
            Drawer::Request(_) => unreachable!(),
        }
    }
}
