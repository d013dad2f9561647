//! Mappings panel state

use chrono::{DateTime, Local};
use std::collections::{BTreeSet, HashSet};
use stubdeck_common::{filter_mappings, MappingsEnvelope, StubMapping};

/// Header checkbox state over the visible rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    None,
    Some,
    All,
}

impl CheckState {
    pub fn glyph(&self) -> &'static str {
        match self {
            CheckState::None => "[ ]",
            CheckState::Some => "[-]",
            CheckState::All => "[x]",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MappingsPanel {
    pub mappings: Vec<StubMapping>,
    pub search: String,

    /// Ids ticked for bulk actions
    pub selected: BTreeSet<String>,

    pub confirm_bulk_delete: bool,
    pub bulk_deleting: bool,

    /// Row awaiting its inline delete confirmation
    pub confirming_delete: Option<String>,

    /// Row whose delete call is in flight
    pub deleting: Option<String>,

    pub error: Option<String>,
    pub import_error: Option<String>,

    /// Success banner (import summary, export path)
    pub notice: Option<String>,

    pub importing: bool,

    /// Path being typed for an import, when the prompt is open
    pub import_prompt: Option<String>,

    pub loading: bool,
    pub last_updated: Option<DateTime<Local>>,
    pub cursor: usize,
}

impl MappingsPanel {
    pub fn filtered(&self) -> Vec<&StubMapping> {
        filter_mappings(&self.mappings, &self.search)
    }

    /// Mapping under the cursor
    pub fn current(&self) -> Option<&StubMapping> {
        self.filtered().get(self.cursor).copied()
    }

    pub fn find(&self, id: &str) -> Option<&StubMapping> {
        self.mappings.iter().find(|m| m.id == id)
    }

    pub fn known_ids(&self) -> HashSet<String> {
        self.mappings.iter().map(|m| m.id.clone()).collect()
    }

    pub fn set_search(&mut self, query: String) {
        self.search = query;
        self.cursor = 0;
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

    pub fn check_state(&self) -> CheckState {
        let visible = self.filtered();
        let ticked = visible
            .iter()
            .filter(|m| self.selected.contains(&m.id))
            .count();
        if ticked == 0 {
            CheckState::None
        } else if ticked == visible.len() {
            CheckState::All
        } else {
            CheckState::Some
        }
    }

    pub fn toggle_selected(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
        self.on_selection_changed();
    }

    /// Header checkbox: untick the visible rows when all are ticked,
    /// otherwise tick them all
    pub fn toggle_all(&mut self) {
        let visible: Vec<String> = self.filtered().iter().map(|m| m.id.clone()).collect();
        if self.check_state() == CheckState::All {
            for id in &visible {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(visible);
        }
        self.on_selection_changed();
    }

    fn on_selection_changed(&mut self) {
        if self.selected.is_empty() {
            self.confirm_bulk_delete = false;
        }
    }

    /// Selected mappings in list order
    pub fn selected_mappings(&self) -> Vec<StubMapping> {
        self.mappings
            .iter()
            .filter(|m| self.selected.contains(&m.id))
            .cloned()
            .collect()
    }

    pub fn apply_fetch(&mut self, result: Result<MappingsEnvelope, String>) {
        self.loading = false;
        match result {
            Ok(envelope) => {
                self.mappings = envelope.mappings;
                let known = self.known_ids();
                self.selected.retain(|id| known.contains(id));
                self.on_selection_changed();
                self.error = None;
                self.last_updated = Some(Local::now());
                self.clamp_cursor();
            }
            Err(message) => self.error = Some(message),
        }
    }

    /// First step of bulk delete
    pub fn request_bulk_delete(&mut self) {
        if !self.selected.is_empty() && !self.bulk_deleting {
            self.confirm_bulk_delete = true;
        }
    }

    pub fn cancel_bulk_delete(&mut self) {
        self.confirm_bulk_delete = false;
    }

    /// Second step: hand back the ids to delete
    pub fn confirm_bulk_delete(&mut self) -> Option<Vec<String>> {
        if !self.confirm_bulk_delete || self.selected.is_empty() {
            return None;
        }
        self.confirm_bulk_delete = false;
        self.bulk_deleting = true;
        Some(self.selected.iter().cloned().collect())
    }

    /// Drop deleted ids; failed ids stay selected for a retry
    pub fn apply_bulk_delete(&mut self, results: Vec<(String, Result<(), String>)>) {
        self.bulk_deleting = false;

        let mut failed = 0;
        for (id, result) in results {
            match result {
                Ok(()) => {
                    self.mappings.retain(|m| m.id != id);
                    self.selected.remove(&id);
                }
                Err(message) => {
                    tracing::warn!(%id, %message, "Bulk delete failed for mapping");
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            self.error = Some(format!("Failed to delete {} mapping(s).", failed));
        }
        self.on_selection_changed();
        self.clamp_cursor();
    }

    /// First step of a row delete
    pub fn request_delete(&mut self, id: &str) {
        if self.deleting.is_none() {
            self.confirming_delete = Some(id.to_string());
        }
    }

    pub fn cancel_delete(&mut self) {
        self.confirming_delete = None;
    }

    /// Second step: hand back the id to delete
    pub fn confirm_delete(&mut self) -> Option<String> {
        let id = self.confirming_delete.take()?;
        self.deleting = Some(id.clone());
        Some(id)
    }

    /// Outcome of a single delete, from a row or a drawer
    pub fn apply_delete(&mut self, id: &str, result: Result<(), String>) {
        if self.deleting.as_deref() == Some(id) {
            self.deleting = None;
        }
        match result {
            Ok(()) => self.remove(id),
            Err(message) => self.error = Some(message),
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.mappings.retain(|m| m.id != id);
        self.selected.remove(id);
        self.on_selection_changed();
        self.clamp_cursor();
    }

    /// A mapping created from the editor goes to the top of the list
    pub fn insert_created(&mut self, mapping: StubMapping) {
        self.mappings.retain(|m| m.id != mapping.id);
        self.mappings.insert(0, mapping);
    }

    pub fn replace_updated(&mut self, mapping: StubMapping) {
        match self.mappings.iter_mut().find(|m| m.id == mapping.id) {
            Some(existing) => *existing = mapping,
            None => self.mappings.insert(0, mapping),
        }
    }

    pub fn open_import_prompt(&mut self) {
        if !self.importing {
            self.import_prompt = Some(String::new());
        }
    }

    /// Submit the typed path
    pub fn take_import_path(&mut self) -> Option<String> {
        let path = self.import_prompt.take()?;
        let path = path.trim().to_string();
        if path.is_empty() {
            return None;
        }
        self.importing = true;
        self.import_error = None;
        self.notice = None;
        Some(path)
    }

    pub fn apply_import(&mut self, result: Result<String, String>) {
        self.importing = false;
        match result {
            Ok(summary) => {
                self.import_error = None;
                self.notice = Some(summary);
            }
            Err(message) => self.import_error = Some(message),
        }
    }
}
