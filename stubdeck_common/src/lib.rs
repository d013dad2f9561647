//! Stubdeck Common - Shared model for the mock-server admin dashboard
//!
//! This crate contains the admin API wire types, the editor draft and its
//! translation to and from the wire shape, list filters, the instance
//! registry parser and the export/import document. It performs no I/O.

pub mod draft;
pub mod filter;
pub mod instance;
pub mod interchange;
pub mod wire;

pub use draft::{DraftError, HeaderRow, MappingDraft};
pub use filter::{filter_mappings, filter_requests};
pub use instance::{parse_instances, Instance, InstanceError};
pub use interchange::{ImportDocument, ImportSummary, InterchangeError, MappingsDocument};
pub use wire::{
    AdminErrorBody, BodyPattern, BodyPatternOperator, ListMeta, LoggedRequest, MappingsEnvelope,
    RequestPattern, RequestsEnvelope, ResponseDefinition, StubMapping, UrlMatchKind, UrlMatcher,
    WireError,
};

/// Constants shared by the client and the dashboard
pub mod constants {
    /// Path prefix of the mock server's admin API
    pub const ADMIN_PREFIX: &str = "/__admin";

    /// Request log poll interval
    pub const POLL_INTERVAL_SECONDS: u64 = 3;

    /// Selectable request log limits
    pub const LIMIT_OPTIONS: [usize; 4] = [20, 50, 100, 200];

    /// Request log limit used until the operator picks another
    pub const DEFAULT_LIMIT: usize = 100;

    /// Transformer token that turns on response templating
    pub const RESPONSE_TEMPLATE_TRANSFORMER: &str = "response-template";

    /// Method wildcard shown by the editor; never sent on the wire
    pub const ANY_METHOD: &str = "ANY";

    /// Methods offered by the editor
    pub const METHOD_CHOICES: [&str; 8] = [
        "ANY", "GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS",
    ];

    /// Status codes offered as one-key presets in the editor
    pub const STATUS_PRESETS: [u16; 10] = [200, 201, 204, 301, 400, 401, 403, 404, 500, 503];

    /// Shown instead of a URL when a mapping has no URL matcher
    pub const ANY_URL: &str = "(any)";
}
