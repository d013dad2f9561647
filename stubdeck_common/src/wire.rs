//! Wire types of the mock server's admin API
//!
//! Shapes follow what `/__admin/requests` and `/__admin/mappings` return.
//! Fields the dashboard does not manage are kept in `extra` maps so that a
//! mapping survives a read-modify-write cycle untouched.

use crate::constants::{ANY_METHOD, ANY_URL, RESPONSE_TEMPLATE_TRANSFORMER};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while reading a request pattern object
#[derive(Debug, Error)]
pub enum WireError {
    #[error("`{0}` must be a string")]
    NotAString(&'static str),

    #[error("`bodyPatterns` must be an array of objects")]
    InvalidBodyPatterns,
}

/// Which of the four mutually exclusive URL matching strategies is in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlMatchKind {
    /// Exact path and query
    Url,

    /// Exact path, any query
    UrlPath,

    /// Regex over path and query
    UrlPattern,

    /// Regex over the path
    UrlPathPattern,
}

impl UrlMatchKind {
    /// All kinds, in the order the server resolves them
    pub const ALL: [UrlMatchKind; 4] = [
        UrlMatchKind::Url,
        UrlMatchKind::UrlPath,
        UrlMatchKind::UrlPattern,
        UrlMatchKind::UrlPathPattern,
    ];

    /// Field name used on the wire
    pub fn wire_key(&self) -> &'static str {
        match self {
            UrlMatchKind::Url => "url",
            UrlMatchKind::UrlPath => "urlPath",
            UrlMatchKind::UrlPattern => "urlPattern",
            UrlMatchKind::UrlPathPattern => "urlPathPattern",
        }
    }

    pub fn from_wire_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.wire_key() == key)
    }

    /// Label for the editor's selector
    pub fn choice_label(&self) -> &'static str {
        match self {
            UrlMatchKind::Url => "url (exact)",
            UrlMatchKind::UrlPath => "urlPath (path only)",
            UrlMatchKind::UrlPattern => "urlPattern (regex)",
            UrlMatchKind::UrlPathPattern => "urlPathPattern (path regex)",
        }
    }

    /// Label for the mapping detail view
    pub fn detail_label(&self) -> &'static str {
        match self {
            UrlMatchKind::Url => "URL (exact)",
            UrlMatchKind::UrlPath => "URL path",
            UrlMatchKind::UrlPattern => "URL pattern",
            UrlMatchKind::UrlPathPattern => "URL path pattern",
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, UrlMatchKind::UrlPattern | UrlMatchKind::UrlPathPattern)
    }

    /// Next kind in selector order, wrapping around
    pub fn next(&self) -> Self {
        match self {
            UrlMatchKind::Url => UrlMatchKind::UrlPath,
            UrlMatchKind::UrlPath => UrlMatchKind::UrlPattern,
            UrlMatchKind::UrlPattern => UrlMatchKind::UrlPathPattern,
            UrlMatchKind::UrlPathPattern => UrlMatchKind::Url,
        }
    }
}

/// A request's URL matcher. Exactly one strategy is ever set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlMatcher {
    Exact(String),
    PathExact(String),
    Pattern(String),
    PathPattern(String),
}

impl UrlMatcher {
    pub fn new(kind: UrlMatchKind, value: impl Into<String>) -> Self {
        let value = value.into();
        match kind {
            UrlMatchKind::Url => UrlMatcher::Exact(value),
            UrlMatchKind::UrlPath => UrlMatcher::PathExact(value),
            UrlMatchKind::UrlPattern => UrlMatcher::Pattern(value),
            UrlMatchKind::UrlPathPattern => UrlMatcher::PathPattern(value),
        }
    }

    pub fn kind(&self) -> UrlMatchKind {
        match self {
            UrlMatcher::Exact(_) => UrlMatchKind::Url,
            UrlMatcher::PathExact(_) => UrlMatchKind::UrlPath,
            UrlMatcher::Pattern(_) => UrlMatchKind::UrlPattern,
            UrlMatcher::PathPattern(_) => UrlMatchKind::UrlPathPattern,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            UrlMatcher::Exact(v)
            | UrlMatcher::PathExact(v)
            | UrlMatcher::Pattern(v)
            | UrlMatcher::PathPattern(v) => v,
        }
    }
}

/// Request side of a stub mapping
///
/// `method`, the URL matcher and `bodyPatterns` are typed; every other
/// matcher (headers, query parameters, cookies, ...) stays in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct RequestPattern {
    /// HTTP method; `None` matches any method
    pub method: Option<String>,

    /// URL matcher; `None` matches any URL
    pub url: Option<UrlMatcher>,

    /// Body clauses as sent on the wire, e.g. `{"equalToJson": "..."}`
    pub body_patterns: Vec<Map<String, Value>>,

    /// Matchers the dashboard has no control for
    pub extra: Map<String, Value>,
}

impl RequestPattern {
    /// Header matchers, if any
    pub fn header_matchers(&self) -> Option<&Map<String, Value>> {
        self.extra.get("headers").and_then(Value::as_object)
    }

    /// Query parameter matchers, if any
    pub fn query_parameters(&self) -> Option<&Map<String, Value>> {
        self.extra.get("queryParameters").and_then(Value::as_object)
    }
}

impl TryFrom<Map<String, Value>> for RequestPattern {
    type Error = WireError;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let method = match fields.remove("method") {
            None | Some(Value::Null) => None,
            Some(Value::String(method)) => Some(method),
            Some(_) => return Err(WireError::NotAString("method")),
        };

        // Only one matcher is meaningful; the server resolves them in this order.
        let mut url = None;
        for kind in UrlMatchKind::ALL {
            match fields.remove(kind.wire_key()) {
                None | Some(Value::Null) => {}
                Some(Value::String(value)) => {
                    if url.is_none() {
                        url = Some(UrlMatcher::new(kind, value));
                    }
                }
                Some(_) => return Err(WireError::NotAString(kind.wire_key())),
            }
        }

        let body_patterns = match fields.remove("bodyPatterns") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(clause) => Ok(clause),
                    _ => Err(WireError::InvalidBodyPatterns),
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(WireError::InvalidBodyPatterns),
        };

        Ok(Self {
            method,
            url,
            body_patterns,
            extra: fields,
        })
    }
}

impl From<RequestPattern> for Map<String, Value> {
    fn from(pattern: RequestPattern) -> Self {
        let mut fields = pattern.extra;
        if let Some(url) = pattern.url {
            fields.insert(url.kind().wire_key().to_string(), Value::String(url.value().to_string()));
        }
        if let Some(method) = pattern.method {
            fields.insert("method".to_string(), Value::String(method));
        }
        if !pattern.body_patterns.is_empty() {
            let clauses = pattern.body_patterns.into_iter().map(Value::Object).collect();
            fields.insert("bodyPatterns".to_string(), Value::Array(clauses));
        }
        fields
    }
}

fn default_status() -> u16 {
    200
}

/// Response side of a stub mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDefinition {
    #[serde(default = "default_status")]
    pub status: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_delay_milliseconds: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformers: Option<Vec<String>>,

    /// jsonBody, bodyFileName, fault, proxyBaseUrl and friends
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResponseDefinition {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            body: None,
            headers: None,
            fixed_delay_milliseconds: None,
            transformers: None,
            extra: Map::new(),
        }
    }

    /// Response headers flattened to display strings
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .flatten()
            .map(|(key, value)| (key.clone(), display_value(value)))
            .collect()
    }

    pub fn has_response_templating(&self) -> bool {
        self.transformers
            .iter()
            .flatten()
            .any(|t| t == RESPONSE_TEMPLATE_TRANSFORMER)
    }
}

/// A stub mapping as stored by the mock server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StubMapping {
    /// Server-assigned id; empty until the mapping is created
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,

    #[serde(default)]
    pub request: RequestPattern,

    pub response: ResponseDefinition,

    /// name, persistent, metadata, scenario fields, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StubMapping {
    /// Method shown in lists, `ANY` when unset
    pub fn method_label(&self) -> &str {
        self.request.method.as_deref().unwrap_or(ANY_METHOD)
    }

    /// URL matcher value shown in lists, `(any)` when unset
    pub fn url_label(&self) -> &str {
        self.request.url.as_ref().map(UrlMatcher::value).unwrap_or(ANY_URL)
    }

    pub fn is_pattern(&self) -> bool {
        self.request
            .url
            .as_ref()
            .is_some_and(|url| url.kind().is_pattern())
    }

    pub fn name(&self) -> Option<&str> {
        self.extra.get("name").and_then(Value::as_str)
    }
}

/// One entry of the server's request journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedRequest {
    pub id: String,

    pub request: LoggedRequestDetails,

    pub response_definition: LoggedResponse,

    #[serde(default)]
    pub was_matched: bool,

    /// The stub that served this request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stub_mapping: Option<StubReference>,
}

impl LoggedRequest {
    /// Id of the matching stub, only for matched requests
    pub fn matched_stub_id(&self) -> Option<&str> {
        if !self.was_matched {
            return None;
        }
        self.stub_mapping
            .as_ref()
            .map(|stub| stub.id.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// The inbound request as received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedRequestDetails {
    pub method: String,

    /// Path and query
    pub url: String,

    #[serde(default)]
    pub absolute_url: String,

    #[serde(default)]
    pub headers: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_date: Option<i64>,
}

impl LoggedRequestDetails {
    /// Headers flattened to display strings
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(key, value)| (key.clone(), display_value(value)))
            .collect()
    }
}

/// What the server answered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedResponse {
    #[serde(default = "default_status")]
    pub status: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Reference to a stub from a journal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StubReference {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `meta` block of list responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListMeta {
    #[serde(default)]
    pub total: usize,
}

/// Body of `GET /__admin/requests`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestsEnvelope {
    #[serde(default)]
    pub requests: Vec<LoggedRequest>,

    #[serde(default)]
    pub meta: ListMeta,
}

/// Body of `GET /__admin/mappings`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingsEnvelope {
    #[serde(default)]
    pub mappings: Vec<StubMapping>,

    #[serde(default)]
    pub meta: ListMeta,
}

/// Error body the admin API may attach to a failed call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Body-matching operators the editor exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPatternOperator {
    EqualToJson,
    MatchesJsonPath,
    EqualTo,
    Contains,
    Matches,
}

impl BodyPatternOperator {
    pub const ALL: [BodyPatternOperator; 5] = [
        BodyPatternOperator::EqualToJson,
        BodyPatternOperator::MatchesJsonPath,
        BodyPatternOperator::EqualTo,
        BodyPatternOperator::Contains,
        BodyPatternOperator::Matches,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPatternOperator::EqualToJson => "equalToJson",
            BodyPatternOperator::MatchesJsonPath => "matchesJsonPath",
            BodyPatternOperator::EqualTo => "equalTo",
            BodyPatternOperator::Contains => "contains",
            BodyPatternOperator::Matches => "matches",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    /// Hint shown in an empty value field
    pub fn placeholder(&self) -> &'static str {
        match self {
            BodyPatternOperator::EqualToJson => r#"{"key": "value"}"#,
            BodyPatternOperator::MatchesJsonPath => "$.name",
            _ => "value",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|op| op == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// One editable body clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyPattern {
    pub operator: BodyPatternOperator,
    pub value: String,
}

impl BodyPattern {
    pub fn new(operator: BodyPatternOperator, value: impl Into<String>) -> Self {
        Self {
            operator,
            value: value.into(),
        }
    }

    /// Read a wire clause the editor can represent
    ///
    /// Only single-key clauses with a known operator and a string value
    /// qualify; anything richer (flags such as `ignoreArrayOrder`, object
    /// operands) returns `None` and must be carried verbatim by the caller.
    pub fn from_wire(clause: &Map<String, Value>) -> Option<Self> {
        if clause.len() != 1 {
            return None;
        }
        let (name, value) = clause.iter().next()?;
        let operator = BodyPatternOperator::parse(name)?;
        let value = value.as_str()?;
        Some(Self::new(operator, value))
    }

    pub fn to_wire(&self) -> Map<String, Value> {
        let mut clause = Map::new();
        clause.insert(
            self.operator.as_str().to_string(),
            Value::String(self.value.clone()),
        );
        clause
    }
}

/// Render a JSON header value the way a header table shows it
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
