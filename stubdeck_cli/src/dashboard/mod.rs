//! Dashboard state machine
//!
//! All state changes happen synchronously here. Anything that needs the
//! network or the filesystem is returned as a [`Command`]; the runner executes
//! it and feeds the result back as an [`Outcome`]. Every command is stamped
//! with a [`Ticket`] so results that arrive after an instance switch are
//! dropped instead of leaking into the new instance's view.

pub mod drawer;
pub mod editor;
pub mod mappings;
pub mod requests;

pub use drawer::{Drawer, MappingDrawer, RequestDrawer};
pub use editor::{Editor, EditorField, EditorMode, SaveMode};
pub use mappings::{CheckState, MappingsPanel};
pub use requests::RequestsPanel;

use crate::admin::RequestScope;
use crate::config::Theme;
use std::collections::HashSet;
use std::path::PathBuf;
use stubdeck_common::interchange::{bulk_export_file_name, single_export_file_name};
use stubdeck_common::{
    ImportSummary, Instance, LoggedRequest, MappingDraft, MappingsDocument, MappingsEnvelope,
    RequestsEnvelope, StubMapping,
};

/// Instance and generation a command was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub instance_id: String,
    pub epoch: u64,
}

/// Where a single delete was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOrigin {
    Row,
    Drawer,
}

/// Active tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Requests,
    Mappings,
}

impl Tab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Requests => "Requests",
            Tab::Mappings => "Mappings",
        }
    }
}

/// Side effect requested by the dashboard
#[derive(Debug, Clone)]
pub enum Command {
    FetchRequests {
        ticket: Ticket,
        scope: RequestScope,
    },
    FetchMappings {
        ticket: Ticket,
    },
    /// Resolve a matched stub id to its mapping
    LookupStub {
        ticket: Ticket,
        stub_id: String,
        from: LoggedRequest,
    },
    SaveMapping {
        ticket: Ticket,
        mode: SaveMode,
        mapping: StubMapping,
    },
    DeleteMapping {
        ticket: Ticket,
        id: String,
        origin: DeleteOrigin,
    },
    BulkDelete {
        ticket: Ticket,
        ids: Vec<String>,
    },
    Import {
        ticket: Ticket,
        path: PathBuf,
        known_ids: HashSet<String>,
    },
    Export {
        file_name: String,
        document: MappingsDocument,
    },
    SaveTheme(Theme),
}

/// Result of a command, fed back into [`Dashboard::apply`]
#[derive(Debug)]
pub enum Outcome {
    Requests {
        ticket: Ticket,
        scope: RequestScope,
        result: Result<RequestsEnvelope, String>,
    },
    Mappings {
        ticket: Ticket,
        result: Result<MappingsEnvelope, String>,
    },
    StubLookup {
        ticket: Ticket,
        from: LoggedRequest,
        result: Result<Option<StubMapping>, String>,
    },
    Saved {
        ticket: Ticket,
        mode: SaveMode,
        result: Result<StubMapping, String>,
    },
    Deleted {
        ticket: Ticket,
        id: String,
        origin: DeleteOrigin,
        result: Result<(), String>,
    },
    BulkDeleted {
        ticket: Ticket,
        results: Vec<(String, Result<(), String>)>,
    },
    Imported {
        ticket: Ticket,
        result: Result<ImportSummary, String>,
    },
    Exported(Result<PathBuf, String>),
}

/// Whole-dashboard state
#[derive(Debug)]
pub struct Dashboard {
    pub instances: Vec<Instance>,
    pub active: usize,

    /// Bumped on every instance switch
    pub epoch: u64,

    pub tab: Tab,
    pub theme: Theme,
    pub requests: RequestsPanel,
    pub mappings: MappingsPanel,
    pub drawer: Option<Drawer>,
    pub editor: Option<Editor>,
    pub should_quit: bool,
}

impl Dashboard {
    pub fn new(instances: Vec<Instance>, active: usize, theme: Theme) -> Self {
        let active = active.min(instances.len().saturating_sub(1));
        Self {
            instances,
            active,
            epoch: 0,
            tab: Tab::Requests,
            theme,
            requests: RequestsPanel::default(),
            mappings: MappingsPanel::default(),
            drawer: None,
            editor: None,
            should_quit: false,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.instances.is_empty()
    }

    pub fn active_instance(&self) -> Option<&Instance> {
        self.instances.get(self.active)
    }

    /// Ticket for commands issued now; none without instances
    pub fn ticket(&self) -> Option<Ticket> {
        self.active_instance().map(|instance| Ticket {
            instance_id: instance.id.clone(),
            epoch: self.epoch,
        })
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        let current = self.ticket().as_ref() == Some(ticket);
        if !current {
            tracing::debug!(
                instance = %ticket.instance_id,
                epoch = ticket.epoch,
                current_epoch = self.epoch,
                "Discarding stale outcome"
            );
        }
        current
    }

    /// Initial fetches
    pub fn start(&mut self) -> Vec<Command> {
        let mut commands: Vec<Command> = self.fetch_requests().into_iter().collect();
        if self.tab == Tab::Mappings {
            commands.extend(self.fetch_mappings());
        }
        commands
    }

    /// Timer tick; runs regardless of drawers or editor
    pub fn poll(&self) -> Option<Command> {
        self.fetch_requests()
    }

    fn fetch_requests(&self) -> Option<Command> {
        Some(Command::FetchRequests {
            ticket: self.ticket()?,
            scope: self.requests.scope(),
        })
    }

    fn fetch_mappings(&mut self) -> Option<Command> {
        let ticket = self.ticket()?;
        self.mappings.loading = true;
        Some(Command::FetchMappings { ticket })
    }

    pub fn refresh_mappings(&mut self) -> Vec<Command> {
        self.fetch_mappings().into_iter().collect()
    }

    /// Switch instance; every per-instance view is reset before returning
    pub fn select_instance(&mut self, index: usize) -> Vec<Command> {
        if index >= self.instances.len() || index == self.active {
            return Vec::new();
        }
        self.active = index;
        self.epoch += 1;
        self.requests = RequestsPanel::default();
        self.mappings = MappingsPanel::default();
        self.drawer = None;
        self.editor = None;
        tracing::info!(
            instance = %self.instances[index].url,
            epoch = self.epoch,
            "Switched instance"
        );
        self.start()
    }

    pub fn next_instance(&mut self) -> Vec<Command> {
        if self.instances.is_empty() {
            return Vec::new();
        }
        self.select_instance((self.active + 1) % self.instances.len())
    }

    pub fn prev_instance(&mut self) -> Vec<Command> {
        if self.instances.is_empty() {
            return Vec::new();
        }
        let len = self.instances.len();
        self.select_instance((self.active + len - 1) % len)
    }

    pub fn switch_tab(&mut self, tab: Tab) -> Vec<Command> {
        if tab == self.tab {
            return Vec::new();
        }
        self.tab = tab;
        self.drawer = None;
        self.editor = None;
        match tab {
            Tab::Mappings => self.refresh_mappings(),
            Tab::Requests => Vec::new(),
        }
    }

    pub fn toggle_theme(&mut self) -> Vec<Command> {
        self.theme = self.theme.toggled();
        vec![Command::SaveTheme(self.theme)]
    }

    pub fn set_search(&mut self, query: String) -> Vec<Command> {
        match self.tab {
            Tab::Requests => {
                if self.requests.set_search(query) {
                    return self.fetch_requests().into_iter().collect();
                }
            }
            Tab::Mappings => self.mappings.set_search(query),
        }
        Vec::new()
    }

    pub fn widen_search(&mut self) -> Vec<Command> {
        if self.requests.widen() {
            return self.fetch_requests().into_iter().collect();
        }
        Vec::new()
    }

    pub fn cycle_limit(&mut self) -> Vec<Command> {
        self.requests.cycle_limit();
        self.fetch_requests().into_iter().collect()
    }

    /// Open the drawer for the row under the cursor
    pub fn open_selected(&mut self) {
        match self.tab {
            Tab::Requests => {
                if let Some(record) = self.requests.selected().cloned() {
                    self.drawer = Some(Drawer::Request(RequestDrawer::new(record)));
                }
            }
            Tab::Mappings => {
                if let Some(mapping) = self.mappings.current().cloned() {
                    self.show_mapping(mapping, None);
                }
            }
        }
    }

    fn show_mapping(&mut self, mapping: StubMapping, back: Option<LoggedRequest>) {
        if let Some(Drawer::Mapping(drawer)) = self.drawer.as_mut() {
            drawer.show(mapping);
            drawer.back = back;
            return;
        }
        self.drawer = Some(Drawer::Mapping(MappingDrawer::new(mapping, back)));
    }

    pub fn close_drawer(&mut self) {
        self.drawer = None;
    }

    /// Request drawer: jump to the stub that matched this request
    pub fn open_matched_stub(&mut self) -> Vec<Command> {
        let Some(Drawer::Request(drawer)) = &self.drawer else {
            return Vec::new();
        };
        let Some(stub_id) = drawer.record.matched_stub_id() else {
            return Vec::new();
        };
        let Some(ticket) = self.ticket() else {
            return Vec::new();
        };
        vec![Command::LookupStub {
            ticket,
            stub_id: stub_id.to_string(),
            from: drawer.record.clone(),
        }]
    }

    /// Mapping drawer: return to the request it was opened from
    pub fn drawer_back(&mut self) {
        let back = match self.drawer.as_mut() {
            Some(Drawer::Mapping(drawer)) => drawer.back.take(),
            _ => None,
        };
        if let Some(record) = back {
            self.drawer = Some(Drawer::Request(RequestDrawer::new(record)));
        }
    }

    /// Request drawer: open the editor pre-filled from an unmatched request
    pub fn create_stub_from_request(&mut self) {
        if let Some(Drawer::Request(drawer)) = &self.drawer {
            if drawer.record.matched_stub_id().is_none() {
                let draft = MappingDraft::from_logged_request(&drawer.record);
                self.editor = Some(Editor::stub_from_request(draft));
            }
        }
    }

    pub fn new_mapping(&mut self) {
        self.editor = Some(Editor::new_mapping());
    }

    pub fn clone_current(&mut self) {
        if let Some(mapping) = self.mappings.current() {
            self.editor = Some(Editor::clone_of(mapping));
        }
    }

    /// Mapping drawer: edit the displayed mapping
    pub fn edit_drawer_mapping(&mut self) {
        if let Some(Drawer::Mapping(drawer)) = &self.drawer {
            self.editor = Some(Editor::edit(&drawer.mapping));
        }
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    pub fn submit_editor(&mut self) -> Vec<Command> {
        let Some(ticket) = self.ticket() else {
            return Vec::new();
        };
        let Some(editor) = self.editor.as_mut() else {
            return Vec::new();
        };
        match editor.submit() {
            Some((mode, mapping)) => vec![Command::SaveMapping {
                ticket,
                mode,
                mapping,
            }],
            None => Vec::new(),
        }
    }

    /// Mappings tab: ask to delete the row under the cursor
    pub fn request_row_delete(&mut self) {
        if let Some(id) = self.mappings.current().map(|m| m.id.clone()) {
            self.mappings.request_delete(&id);
        }
    }

    pub fn confirm_row_delete(&mut self) -> Vec<Command> {
        let Some(ticket) = self.ticket() else {
            return Vec::new();
        };
        match self.mappings.confirm_delete() {
            Some(id) => vec![Command::DeleteMapping {
                ticket,
                id,
                origin: DeleteOrigin::Row,
            }],
            None => Vec::new(),
        }
    }

    pub fn request_drawer_delete(&mut self) {
        if let Some(Drawer::Mapping(drawer)) = &mut self.drawer {
            if !drawer.deleting {
                drawer.confirm_delete = true;
            }
        }
    }

    pub fn cancel_drawer_delete(&mut self) {
        if let Some(Drawer::Mapping(drawer)) = &mut self.drawer {
            drawer.confirm_delete = false;
        }
    }

    pub fn confirm_drawer_delete(&mut self) -> Vec<Command> {
        let Some(ticket) = self.ticket() else {
            return Vec::new();
        };
        let Some(Drawer::Mapping(drawer)) = &mut self.drawer else {
            return Vec::new();
        };
        if !drawer.confirm_delete {
            return Vec::new();
        }
        drawer.confirm_delete = false;
        drawer.deleting = true;
        drawer.delete_error = None;
        vec![Command::DeleteMapping {
            ticket,
            id: drawer.mapping.id.clone(),
            origin: DeleteOrigin::Drawer,
        }]
    }

    pub fn confirm_bulk_delete(&mut self) -> Vec<Command> {
        let Some(ticket) = self.ticket() else {
            return Vec::new();
        };
        match self.mappings.confirm_bulk_delete() {
            Some(ids) => vec![Command::BulkDelete { ticket, ids }],
            None => Vec::new(),
        }
    }

    /// Export the ticked mappings
    pub fn export_selected(&mut self, now_ms: i64) -> Vec<Command> {
        let mappings = self.mappings.selected_mappings();
        if mappings.is_empty() {
            return Vec::new();
        }
        vec![Command::Export {
            file_name: bulk_export_file_name(now_ms),
            document: MappingsDocument::new(mappings),
        }]
    }

    /// Mapping drawer: export the displayed mapping
    pub fn export_drawer_mapping(&mut self) -> Vec<Command> {
        let Some(Drawer::Mapping(drawer)) = &self.drawer else {
            return Vec::new();
        };
        vec![Command::Export {
            file_name: single_export_file_name(&drawer.mapping.id),
            document: MappingsDocument::new(vec![drawer.mapping.clone()]),
        }]
    }

    pub fn submit_import(&mut self) -> Vec<Command> {
        let Some(ticket) = self.ticket() else {
            return Vec::new();
        };
        match self.mappings.take_import_path() {
            Some(path) => vec![Command::Import {
                ticket,
                path: PathBuf::from(path),
                known_ids: self.mappings.known_ids(),
            }],
            None => Vec::new(),
        }
    }

    /// Fold a command result into the state
    pub fn apply(&mut self, outcome: Outcome) -> Vec<Command> {
        match outcome {
            Outcome::Requests {
                ticket,
                scope,
                result,
            } => {
                if !self.is_current(&ticket) {
                    return Vec::new();
                }
                if scope != self.requests.scope() {
                    tracing::debug!(?scope, "Discarding request log for a previous scope");
                    return Vec::new();
                }
                if let Err(message) = &result {
                    tracing::warn!(%message, "Request log fetch failed");
                }
                self.requests.apply_fetch(result);
            }
            Outcome::Mappings { ticket, result } => {
                if !self.is_current(&ticket) {
                    return Vec::new();
                }
                if let Err(message) = &result {
                    tracing::warn!(%message, "Mapping list fetch failed");
                }
                self.mappings.apply_fetch(result);
            }
            Outcome::StubLookup {
                ticket,
                from,
                result,
            } => {
                if !self.is_current(&ticket) {
                    return Vec::new();
                }
                match result {
                    Ok(Some(mapping)) => self.show_mapping(mapping, Some(from)),
                    Ok(None) => tracing::debug!(request = %from.id, "Matched stub no longer exists"),
                    Err(message) => tracing::warn!(%message, "Stub lookup failed"),
                }
            }
            Outcome::Saved {
                ticket,
                mode,
                result,
            } => {
                if !self.is_current(&ticket) {
                    return Vec::new();
                }
                self.apply_saved(mode, result);
            }
            Outcome::Deleted {
                ticket,
                id,
                origin,
                result,
            } => {
                if !self.is_current(&ticket) {
                    return Vec::new();
                }
                self.apply_deleted(id, origin, result);
            }
            Outcome::BulkDeleted { ticket, results } => {
                if !self.is_current(&ticket) {
                    return Vec::new();
                }
                self.mappings.apply_bulk_delete(results);
            }
            Outcome::Imported { ticket, result } => {
                if !self.is_current(&ticket) {
                    return Vec::new();
                }
                let succeeded = result.is_ok();
                if let Err(message) = &result {
                    tracing::warn!(%message, "Import failed");
                }
                self.mappings.apply_import(result.map(|summary| summary.to_string()));
                if succeeded {
                    return self.refresh_mappings();
                }
            }
            Outcome::Exported(result) => match result {
                Ok(path) => {
                    self.mappings.notice = Some(format!("Exported to {}", path.display()));
                }
                Err(message) => {
                    tracing::warn!(%message, "Export failed");
                    self.mappings.error = Some(message);
                }
            },
        }
        Vec::new()
    }

    fn apply_saved(&mut self, mode: SaveMode, result: Result<StubMapping, String>) {
        let mapping = match result {
            Ok(mapping) => mapping,
            Err(message) => {
                tracing::warn!(%message, "Saving mapping failed");
                if let Some(editor) = self.editor.as_mut() {
                    editor.fail(message);
                }
                return;
            }
        };

        let from_request = self
            .editor
            .as_ref()
            .map(|e| e.mode == EditorMode::StubFromRequest)
            .unwrap_or(false);
        self.editor = None;

        match mode {
            SaveMode::Create => self.mappings.insert_created(mapping.clone()),
            SaveMode::Update => self.mappings.replace_updated(mapping.clone()),
        }

        if from_request && matches!(self.drawer, Some(Drawer::Request(_))) {
            self.drawer = None;
        } else if let Some(Drawer::Mapping(drawer)) = self.drawer.as_mut() {
            if drawer.mapping.id == mapping.id {
                drawer.show(mapping);
            }
        }
    }

    fn apply_deleted(&mut self, id: String, origin: DeleteOrigin, result: Result<(), String>) {
        if let Err(message) = &result {
            tracing::warn!(%id, %message, "Deleting mapping failed");
        }

        let drawer_shows_id = matches!(
            &self.drawer,
            Some(Drawer::Mapping(drawer)) if drawer.mapping.id == id
        );

        match (origin, result) {
            (DeleteOrigin::Drawer, Err(message)) => {
                if let Some(Drawer::Mapping(drawer)) = &mut self.drawer {
                    drawer.deleting = false;
                    drawer.delete_error = Some(message);
                }
            }
            (_, result) => {
                let deleted = result.is_ok();
                self.mappings.apply_delete(&id, result);
                if deleted && drawer_shows_id {
                    self.drawer = None;
                }
            }
        }
    }
}
