//! TUI application state and event handling

use crate::dashboard::{Command, Dashboard, Drawer, EditorField, Outcome, Tab};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Rows moved by PageUp/PageDown
const PAGE: isize = 10;

/// Events that can be sent to the TUI
#[derive(Debug)]
pub enum TuiEvent {
    /// Key event from terminal
    Key(KeyEvent),
    /// A command finished
    Outcome(Outcome),
    /// Request log poll timer fired
    Poll,
}

/// TUI application state
pub struct TuiApp {
    pub dashboard: Dashboard,

    /// Keystrokes go to the search line of the active tab
    pub search_active: bool,
}

impl TuiApp {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            search_active: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.dashboard.should_quit
    }

    /// Handle TUI event
    pub fn handle_event(&mut self, event: TuiEvent) -> Vec<Command> {
        match event {
            TuiEvent::Key(key) => self.handle_key(key),
            TuiEvent::Outcome(outcome) => self.dashboard.apply(outcome),
            TuiEvent::Poll => self.dashboard.poll().into_iter().collect(),
        }
    }

    /// Handle key events
    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.dashboard.should_quit = true;
            return Vec::new();
        }

        if !self.dashboard.is_configured() {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                self.dashboard.should_quit = true;
            }
            return Vec::new();
        }

        if self.dashboard.editor.is_some() {
            return self.handle_editor_key(key);
        }
        if self.dashboard.mappings.import_prompt.is_some() {
            return self.handle_import_prompt_key(key);
        }
        if self.search_active {
            return self.handle_search_key(key);
        }
        if self.dashboard.drawer.is_some() {
            return self.handle_drawer_key(key);
        }
        self.handle_list_key(key)
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => return self.dashboard.submit_editor(),
            KeyCode::Esc => {
                self.dashboard.close_editor();
                return Vec::new();
            }
            _ => {}
        }

        let Some(editor) = self.dashboard.editor.as_mut() else {
            return Vec::new();
        };
        let field = editor.focused();
        match key.code {
            KeyCode::Char('d') if ctrl => editor.remove_row(),
            KeyCode::Tab | KeyCode::Down => editor.focus_next(),
            KeyCode::BackTab | KeyCode::Up => editor.focus_prev(),
            KeyCode::Enter => match field {
                EditorField::Body => editor.insert_char('\n'),
                EditorField::AddPattern => editor.add_body_pattern(),
                EditorField::AddHeader => editor.add_header(),
                EditorField::Submit => return self.dashboard.submit_editor(),
                f if f.is_text() => editor.focus_next(),
                _ => editor.cycle(),
            },
            KeyCode::Left | KeyCode::Right if !field.is_text() => editor.cycle(),
            KeyCode::Char(' ') if !field.is_text() => editor.cycle(),
            // Status is free text but also steps through presets
            KeyCode::Left | KeyCode::Right if field == EditorField::Status => editor.cycle(),
            KeyCode::Char(c) if field.is_text() => editor.insert_char(c),
            KeyCode::Backspace => editor.backspace(),
            _ => {}
        }
        Vec::new()
    }

    fn handle_import_prompt_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let mappings = &mut self.dashboard.mappings;
        match key.code {
            KeyCode::Enter => return self.dashboard.submit_import(),
            KeyCode::Esc => mappings.import_prompt = None,
            KeyCode::Backspace => {
                if let Some(path) = mappings.import_prompt.as_mut() {
                    path.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(path) = mappings.import_prompt.as_mut() {
                    path.push(c);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let mut query = match self.dashboard.tab {
            Tab::Requests => self.dashboard.requests.search.clone(),
            Tab::Mappings => self.dashboard.mappings.search.clone(),
        };
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.search_active = false;
                return Vec::new();
            }
            KeyCode::Backspace => {
                query.pop();
            }
            KeyCode::Char(c) => query.push(c),
            _ => return Vec::new(),
        }
        self.dashboard.set_search(query)
    }

    fn handle_drawer_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let dashboard = &mut self.dashboard;
        let on_request = matches!(dashboard.drawer, Some(Drawer::Request(_)));
        let confirming = matches!(
            &dashboard.drawer,
            Some(Drawer::Mapping(drawer)) if drawer.confirm_delete
        );

        if on_request {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') => dashboard.close_drawer(),
                KeyCode::Char('m') => return dashboard.open_matched_stub(),
                KeyCode::Char('s') => dashboard.create_stub_from_request(),
                _ => self.scroll_drawer(key),
            }
        } else if confirming {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => return dashboard.confirm_drawer_delete(),
                _ => dashboard.cancel_drawer_delete(),
            }
        } else {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') => dashboard.close_drawer(),
                KeyCode::Char('b') | KeyCode::Backspace => dashboard.drawer_back(),
                KeyCode::Char('e') => dashboard.edit_drawer_mapping(),
                KeyCode::Char('x') => return dashboard.export_drawer_mapping(),
                KeyCode::Char('d') => dashboard.request_drawer_delete(),
                _ => self.scroll_drawer(key),
            }
        }
        Vec::new()
    }

    fn scroll_drawer(&mut self, key: KeyEvent) {
        let delta = match key.code {
            KeyCode::Up | KeyCode::Char('k') => -1,
            KeyCode::Down | KeyCode::Char('j') => 1,
            KeyCode::PageUp => -(PAGE as i32),
            KeyCode::PageDown => PAGE as i32,
            _ => return,
        };
        if let Some(drawer) = self.dashboard.drawer.as_mut() {
            drawer.scroll_by(delta);
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let dashboard = &mut self.dashboard;

        // Pending confirmations swallow everything but y/n
        if dashboard.tab == Tab::Mappings {
            if dashboard.mappings.confirm_bulk_delete {
                return match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => dashboard.confirm_bulk_delete(),
                    _ => {
                        dashboard.mappings.cancel_bulk_delete();
                        Vec::new()
                    }
                };
            }
            if dashboard.mappings.confirming_delete.is_some() {
                return match key.code {
                    KeyCode::Char('y') | KeyCode::Enter => dashboard.confirm_row_delete(),
                    _ => {
                        dashboard.mappings.cancel_delete();
                        Vec::new()
                    }
                };
            }
        }

        match key.code {
            KeyCode::Char('q') => dashboard.should_quit = true,
            KeyCode::Tab => {
                let tab = match dashboard.tab {
                    Tab::Requests => Tab::Mappings,
                    Tab::Mappings => Tab::Requests,
                };
                return dashboard.switch_tab(tab);
            }
            KeyCode::Char(']') => return dashboard.next_instance(),
            KeyCode::Char('[') => return dashboard.prev_instance(),
            KeyCode::Char(c @ '1'..='9') => {
                let index = (c as usize) - ('1' as usize);
                return dashboard.select_instance(index);
            }
            KeyCode::Char('t') => return dashboard.toggle_theme(),
            KeyCode::Char('/') => self.search_active = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-PAGE),
            KeyCode::PageDown => self.move_cursor(PAGE),
            KeyCode::Home => self.move_cursor(isize::MIN),
            KeyCode::End => self.move_cursor(isize::MAX),
            KeyCode::Enter => dashboard.open_selected(),
            _ => match dashboard.tab {
                Tab::Requests => return self.handle_requests_key(key),
                Tab::Mappings => return self.handle_mappings_key(key),
            },
        }
        Vec::new()
    }

    fn handle_requests_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let dashboard = &mut self.dashboard;
        match key.code {
            KeyCode::Char('l') => dashboard.cycle_limit(),
            KeyCode::Char('a') => dashboard.widen_search(),
            KeyCode::Char('r') => dashboard.poll().into_iter().collect(),
            _ => Vec::new(),
        }
    }

    fn handle_mappings_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let dashboard = &mut self.dashboard;
        match key.code {
            KeyCode::Char(' ') => {
                if let Some(id) = dashboard.mappings.current().map(|m| m.id.clone()) {
                    dashboard.mappings.toggle_selected(&id);
                }
            }
            KeyCode::Char('A') => dashboard.mappings.toggle_all(),
            KeyCode::Char('n') => dashboard.new_mapping(),
            KeyCode::Char('c') => dashboard.clone_current(),
            KeyCode::Char('d') => dashboard.request_row_delete(),
            KeyCode::Char('D') => dashboard.mappings.request_bulk_delete(),
            KeyCode::Char('e') => {
                let now_ms = chrono::Utc::now().timestamp_millis();
                return dashboard.export_selected(now_ms);
            }
            KeyCode::Char('i') => dashboard.mappings.open_import_prompt(),
            KeyCode::Char('r') => return dashboard.refresh_mappings(),
            _ => {}
        }
        Vec::new()
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.dashboard.tab {
            Tab::Requests => self.dashboard.requests.move_cursor(delta),
            Tab::Mappings => self.dashboard.mappings.move_cursor(delta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::dashboard::Ticket;
    use serde_json::json;
    use stubdeck_common::{parse_instances, MappingsEnvelope};

    fn new_app() -> TuiApp {
        let instances = parse_instances("http://a:1,http://b:2").unwrap();
        TuiApp::new(Dashboard::new(instances, 0, Theme::Dark))
    }

    fn press(app: &mut TuiApp, code: KeyCode) -> Vec<Command> {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(app: &mut TuiApp, c: char) -> Vec<Command> {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn ticket(app: &TuiApp) -> Ticket {
        app.dashboard.ticket().unwrap()
    }

    fn load_mappings(app: &mut TuiApp, ids: &[&str]) {
        let mappings = ids
            .iter()
            .map(|id| {
                serde_json::from_value(json!({
                    "id": id,
                    "request": { "method": "GET", "urlPath": format!("/{}", id) },
                    "response": { "status": 200 }
                }))
                .unwrap()
            })
            .collect();
        let ticket = ticket(app);
        app.handle_event(TuiEvent::Outcome(Outcome::Mappings {
            ticket,
            result: Ok(MappingsEnvelope {
                mappings,
                ..Default::default()
            }),
        }));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = new_app();
        ctrl(&mut app, 'c');
        assert!(app.should_quit());

        let mut app = new_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_unconfigured_ignores_everything_but_quit() {
        let mut app = TuiApp::new(Dashboard::new(Vec::new(), 0, Theme::Dark));
        assert!(press(&mut app, KeyCode::Tab).is_empty());
        assert_eq!(app.dashboard.tab, Tab::Requests);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit());
    }

    #[test]
    fn test_instance_keys() {
        let mut app = new_app();
        let commands = press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.dashboard.active, 1);
        assert!(!commands.is_empty());

        press(&mut app, KeyCode::Char(']'));
        assert_eq!(app.dashboard.active, 0);
        assert!(press(&mut app, KeyCode::Char('9')).is_empty());
    }

    #[test]
    fn test_search_typing_updates_filter() {
        let mut app = new_app();
        press(&mut app, KeyCode::Tab);
        load_mappings(&mut app, &["alpha", "beta"]);

        press(&mut app, KeyCode::Char('/'));
        for c in "alp".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.dashboard.mappings.search, "alp");
        assert_eq!(app.dashboard.mappings.filtered().len(), 1);

        // While searching, 'q' is text, not quit
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit());

        press(&mut app, KeyCode::Esc);
        assert!(!app.search_active);
    }

    #[test]
    fn test_bulk_delete_needs_confirmation() {
        let mut app = new_app();
        press(&mut app, KeyCode::Tab);
        load_mappings(&mut app, &["a", "b"]);

        press(&mut app, KeyCode::Char('A'));
        assert!(press(&mut app, KeyCode::Char('D')).is_empty());
        assert!(app.dashboard.mappings.confirm_bulk_delete);

        let commands = press(&mut app, KeyCode::Char('y'));
        assert!(matches!(commands.as_slice(), [Command::BulkDelete { ids, .. }] if ids.len() == 2));
    }

    #[test]
    fn test_row_delete_cancelled_by_other_key() {
        let mut app = new_app();
        press(&mut app, KeyCode::Tab);
        load_mappings(&mut app, &["a"]);

        press(&mut app, KeyCode::Char('d'));
        assert!(app.dashboard.mappings.confirming_delete.is_some());
        assert!(press(&mut app, KeyCode::Char('n')).is_empty());
        assert!(app.dashboard.mappings.confirming_delete.is_none());
    }

    #[test]
    fn test_editor_flow() {
        let mut app = new_app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('n'));
        assert!(app.dashboard.editor.is_some());

        // Method -> UrlMatch -> UrlValue
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        for c in "/hello".chars() {
            press(&mut app, KeyCode::Char(c));
        }

        let commands = ctrl(&mut app, 's');
        assert!(matches!(
            commands.as_slice(),
            [Command::SaveMapping { mapping, .. }]
                if mapping.request.url.as_ref().map(|u| u.value()) == Some("/hello")
        ));

        press(&mut app, KeyCode::Esc);
        assert!(app.dashboard.editor.is_none());
    }

    #[test]
    fn test_import_prompt_typing() {
        let mut app = new_app();
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('i'));
        for c in "m.json".chars() {
            press(&mut app, KeyCode::Char(c));
        }

        let commands = press(&mut app, KeyCode::Enter);
        assert!(matches!(
            commands.as_slice(),
            [Command::Import { path, .. }] if path.to_str() == Some("m.json")
        ));
    }

    #[test]
    fn test_poll_event() {
        let mut app = new_app();
        let commands = app.handle_event(TuiEvent::Poll);
        assert!(matches!(commands.as_slice(), [Command::FetchRequests { .. }]));
    }
}
