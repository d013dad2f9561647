//! Mapping editor form (new / clone / stub from request / edit)

use stubdeck_common::constants::{METHOD_CHOICES, STATUS_PRESETS};
use stubdeck_common::{BodyPattern, BodyPatternOperator, HeaderRow, MappingDraft, StubMapping};

/// Why the editor was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    New,
    Clone,
    StubFromRequest,
    Edit,
}

/// Whether a submission creates or replaces a mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Update,
}

/// A focusable control of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Method,
    UrlMatch,
    UrlValue,
    PatternOperator(usize),
    PatternValue(usize),
    AddPattern,
    Status,
    Templating,
    Body,
    HeaderKey(usize),
    HeaderValue(usize),
    AddHeader,
    Delay,
    Priority,
    Submit,
}

impl EditorField {
    /// Free-text fields accept typed characters
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            EditorField::UrlValue
                | EditorField::PatternValue(_)
                | EditorField::Status
                | EditorField::Body
                | EditorField::HeaderKey(_)
                | EditorField::HeaderValue(_)
                | EditorField::Delay
                | EditorField::Priority
        )
    }
}

/// Editor state layered over the dashboard
#[derive(Debug, Clone)]
pub struct Editor {
    pub mode: EditorMode,

    /// Mapping whose unmanaged fields are carried into the submission
    pub base: Option<StubMapping>,

    pub draft: MappingDraft,
    pub focus: usize,
    pub submitting: bool,
    pub error: Option<String>,
}

impl Editor {
    pub fn new_mapping() -> Self {
        Self::with(EditorMode::New, None, MappingDraft::new_mapping())
    }

    /// Copy of `mapping` that will be created as a new mapping
    pub fn clone_of(mapping: &StubMapping) -> Self {
        let mut base = mapping.clone();
        base.id.clear();
        base.uuid = None;
        Self::with(EditorMode::Clone, Some(base), MappingDraft::from_wire(mapping))
    }

    pub fn stub_from_request(draft: MappingDraft) -> Self {
        Self::with(EditorMode::StubFromRequest, None, draft)
    }

    pub fn edit(mapping: &StubMapping) -> Self {
        Self::with(
            EditorMode::Edit,
            Some(mapping.clone()),
            MappingDraft::from_wire(mapping),
        )
    }

    fn with(mode: EditorMode, base: Option<StubMapping>, draft: MappingDraft) -> Self {
        Self {
            mode,
            base,
            draft,
            focus: 0,
            submitting: false,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            EditorMode::New => "New Mapping",
            EditorMode::Clone => "Clone Mapping",
            EditorMode::StubFromRequest => "Create Stub from Request",
            EditorMode::Edit => "Edit Mapping",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.mode, self.submitting) {
            (EditorMode::Edit, false) => "Update",
            (EditorMode::Edit, true) => "Updating...",
            (_, false) => "Create",
            (_, true) => "Creating...",
        }
    }

    /// Controls in display order
    pub fn fields(&self) -> Vec<EditorField> {
        let mut fields = vec![EditorField::Method, EditorField::UrlMatch, EditorField::UrlValue];
        for idx in 0..self.draft.body_patterns.len() {
            fields.push(EditorField::PatternOperator(idx));
            fields.push(EditorField::PatternValue(idx));
        }
        fields.extend([
            EditorField::AddPattern,
            EditorField::Status,
            EditorField::Templating,
            EditorField::Body,
        ]);
        for idx in 0..self.draft.response_headers.len() {
            fields.push(EditorField::HeaderKey(idx));
            fields.push(EditorField::HeaderValue(idx));
        }
        fields.extend([
            EditorField::AddHeader,
            EditorField::Delay,
            EditorField::Priority,
            EditorField::Submit,
        ]);
        fields
    }

    pub fn focused(&self) -> EditorField {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + 1) % len;
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    fn focus_on(&mut self, field: EditorField) {
        if let Some(pos) = self.fields().iter().position(|f| *f == field) {
            self.focus = pos;
        }
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        let focused = self.focused();
        let draft = &mut self.draft;
        match focused {
            EditorField::UrlValue => Some(&mut draft.url_value),
            EditorField::PatternValue(i) => draft.body_patterns.get_mut(i).map(|p| &mut p.value),
            EditorField::Status => Some(&mut draft.status),
            EditorField::Body => Some(&mut draft.body),
            EditorField::HeaderKey(i) => draft.response_headers.get_mut(i).map(|h| &mut h.key),
            EditorField::HeaderValue(i) => {
                draft.response_headers.get_mut(i).map(|h| &mut h.value)
            }
            EditorField::Delay => Some(&mut draft.delay),
            EditorField::Priority => Some(&mut draft.priority),
            _ => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(text) = self.text_mut() {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.text_mut() {
            text.pop();
        }
    }

    /// Step a choice control forward (method, URL match, operator, status
    /// preset, templating)
    pub fn cycle(&mut self) {
        let focused = self.focused();
        let draft = &mut self.draft;
        match focused {
            EditorField::Method => {
                let idx = METHOD_CHOICES
                    .iter()
                    .position(|m| *m == draft.method)
                    .map(|i| (i + 1) % METHOD_CHOICES.len())
                    .unwrap_or(0);
                draft.method = METHOD_CHOICES[idx].to_string();
            }
            EditorField::UrlMatch => draft.url_match = draft.url_match.next(),
            EditorField::PatternOperator(i) => {
                if let Some(pattern) = draft.body_patterns.get_mut(i) {
                    pattern.operator = pattern.operator.next();
                }
            }
            EditorField::Status => {
                let current = draft.status_code();
                let next = STATUS_PRESETS
                    .iter()
                    .find(|code| Some(**code) > current)
                    .unwrap_or(&STATUS_PRESETS[0]);
                draft.status = next.to_string();
            }
            EditorField::Templating => draft.response_templating = !draft.response_templating,
            _ => {}
        }
    }

    pub fn add_body_pattern(&mut self) {
        self.draft
            .body_patterns
            .push(BodyPattern::new(BodyPatternOperator::EqualToJson, ""));
        let idx = self.draft.body_patterns.len() - 1;
        self.focus_on(EditorField::PatternValue(idx));
    }

    pub fn add_header(&mut self) {
        self.draft.response_headers.push(HeaderRow::default());
        let idx = self.draft.response_headers.len() - 1;
        self.focus_on(EditorField::HeaderKey(idx));
    }

    /// Remove the body pattern or header row under focus
    pub fn remove_row(&mut self) {
        match self.focused() {
            EditorField::PatternOperator(i) | EditorField::PatternValue(i) => {
                self.draft.body_patterns.remove(i);
                self.focus_on(EditorField::AddPattern);
            }
            EditorField::HeaderKey(i) | EditorField::HeaderValue(i) => {
                self.draft.response_headers.remove(i);
                self.focus_on(EditorField::AddHeader);
            }
            _ => {}
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && self.draft.can_submit()
    }

    /// Build the submission and mark the form busy
    ///
    /// Returns `None` while a submission is in flight or the draft is
    /// invalid; the form stays open either way.
    pub fn submit(&mut self) -> Option<(SaveMode, StubMapping)> {
        if self.submitting {
            return None;
        }
        match self.draft.to_wire(self.base.as_ref()) {
            Ok(mapping) => {
                self.submitting = true;
                self.error = None;
                let mode = match self.mode {
                    EditorMode::Edit => SaveMode::Update,
                    _ => SaveMode::Create,
                };
                Some((mode, mapping))
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    /// Keep the form open with an inline error
    pub fn fail(&mut self, message: String) {
        self.submitting = false;
        self.error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stubdeck_common::UrlMatchKind;

    fn stub() -> StubMapping {
        serde_json::from_value(json!({
            "id": "m1",
            "uuid": "m1",
            "request": {
                "method": "GET",
                "urlPath": "/a",
                "headers": { "Accept": { "equalTo": "text/plain" } }
            },
            "response": { "status": 200, "transformers": ["response-template"] }
        }))
        .unwrap()
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut editor = Editor::new_mapping();
        editor.focus_on(EditorField::UrlValue);
        for c in "/ping".chars() {
            editor.insert_char(c);
        }
        editor.backspace();

        assert_eq!(editor.draft.url_value, "/pin");
        assert_eq!(editor.draft.response_headers.len(), 1);
    }

    #[test]
    fn test_cycle_choices() {
        let mut editor = Editor::new_mapping();

        editor.focus_on(EditorField::Method);
        editor.cycle();
        assert_eq!(editor.draft.method, "POST");

        editor.focus_on(EditorField::UrlMatch);
        editor.cycle();
        assert_eq!(editor.draft.url_match, UrlMatchKind::UrlPath);

        editor.focus_on(EditorField::Status);
        editor.cycle();
        assert_eq!(editor.draft.status, "201");
        editor.draft.status = "503".to_string();
        editor.cycle();
        assert_eq!(editor.draft.status, "200");

        editor.focus_on(EditorField::Templating);
        editor.cycle();
        assert!(editor.draft.response_templating);
    }

    #[test]
    fn test_rows_add_and_remove() {
        let mut editor = Editor::new_mapping();
        editor.add_body_pattern();
        assert_eq!(editor.focused(), EditorField::PatternValue(0));
        editor.insert_char('x');
        assert_eq!(editor.draft.body_patterns[0].value, "x");

        editor.remove_row();
        assert!(editor.draft.body_patterns.is_empty());
        assert_eq!(editor.focused(), EditorField::AddPattern);

        editor.add_header();
        assert_eq!(editor.focused(), EditorField::HeaderKey(1));
        editor.remove_row();
        assert_eq!(editor.draft.response_headers.len(), 1);
    }

    #[test]
    fn test_focus_wraps() {
        let mut editor = Editor::new_mapping();
        editor.focus_prev();
        assert_eq!(editor.focused(), EditorField::Submit);
        editor.focus_next();
        assert_eq!(editor.focused(), EditorField::Method);
    }

    #[test]
    fn test_submit_requires_valid_draft() {
        let mut editor = Editor::new_mapping();
        assert!(!editor.can_submit());
        assert!(editor.submit().is_none());
        assert_eq!(editor.error.as_deref(), Some("URL must not be empty"));

        editor.draft.url_value = "/ok".to_string();
        let (mode, mapping) = editor.submit().unwrap();
        assert_eq!(mode, SaveMode::Create);
        assert!(mapping.id.is_empty());
        assert!(editor.submitting);
        assert!(editor.submit().is_none());

        editor.fail("HTTP 500".to_string());
        assert!(!editor.submitting);
        assert_eq!(editor.error.as_deref(), Some("HTTP 500"));
    }

    #[test]
    fn test_edit_submits_update_with_same_id() {
        let mut editor = Editor::edit(&stub());
        let (mode, mapping) = editor.submit().unwrap();

        assert_eq!(mode, SaveMode::Update);
        assert_eq!(mapping.id, "m1");
        assert!(mapping.request.header_matchers().is_some());
        assert!(mapping.response.has_response_templating());
    }

    #[test]
    fn test_clone_drops_identity_but_keeps_configuration() {
        let mut editor = Editor::clone_of(&stub());
        assert_eq!(editor.title(), "Clone Mapping");

        let (mode, mapping) = editor.submit().unwrap();

        assert_eq!(mode, SaveMode::Create);
        assert!(mapping.id.is_empty());
        assert!(mapping.uuid.is_none());
        assert!(mapping.request.header_matchers().is_some());
        assert!(mapping.response.has_response_templating());
        assert_eq!(mapping.request.url.unwrap().value(), "/a");
    }
}
