//! Export/import document `{"mappings": [...]}`

use crate::wire::StubMapping;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Reasons an import file is rejected before anything is sent
#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("Invalid file: not valid JSON ({0})")]
    NotJson(#[from] serde_json::Error),

    #[error("Invalid file: expected {{ \"mappings\": [...] }}")]
    MissingMappings,
}

/// Exported set of mappings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingsDocument {
    pub mappings: Vec<StubMapping>,
}

impl MappingsDocument {
    pub fn new(mappings: Vec<StubMapping>) -> Self {
        Self { mappings }
    }

    /// Pretty-printed JSON, as written to disk
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// File name for a single exported mapping
pub fn single_export_file_name(id: &str) -> String {
    format!("mapping-{}.json", id)
}

/// File name for a bulk export taken at `timestamp_ms`
pub fn bulk_export_file_name(timestamp_ms: i64) -> String {
    format!("mappings-{}.json", timestamp_ms)
}

/// An import file that passed the shape check
///
/// The document is kept as parsed and submitted unchanged; only the ids are
/// read, to tell creates from updates.
#[derive(Debug, Clone)]
pub struct ImportDocument {
    raw: Value,
    ids: Vec<Option<String>>,
}

impl ImportDocument {
    pub fn parse(text: &str) -> Result<Self, InterchangeError> {
        let raw: Value = serde_json::from_str(text)?;
        let ids = raw
            .get("mappings")
            .and_then(Value::as_array)
            .ok_or(InterchangeError::MissingMappings)?
            .iter()
            .map(|m| {
                m.get("id")
                    .and_then(Value::as_str)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
            })
            .collect();
        Ok(Self { raw, ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Body for `POST /__admin/mappings/import`
    pub fn as_json(&self) -> &Value {
        &self.raw
    }

    /// Count incoming mappings whose id is already known as updates
    pub fn classify(&self, existing_ids: &HashSet<String>) -> ImportSummary {
        let updated = self
            .ids
            .iter()
            .flatten()
            .filter(|id| existing_ids.contains(*id))
            .count();
        ImportSummary {
            created: self.ids.len() - updated,
            updated,
        }
    }
}

/// Client-side estimate of what an import did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
}

impl ImportSummary {
    pub fn total(&self) -> usize {
        self.created + self.updated
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total();
        write!(
            f,
            "Imported {} mapping{}",
            total,
            if total == 1 { "" } else { "s" }
        )?;

        let mut parts = Vec::new();
        if self.created > 0 {
            parts.push(format!("{} created", self.created));
        }
        if self.updated > 0 {
            parts.push(format!("{} updated", self.updated));
        }
        if !parts.is_empty() {
            write!(f, ": {}", parts.join(", "))?;
        }
        Ok(())
    }
}
