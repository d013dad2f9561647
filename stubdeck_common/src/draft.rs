//! Editor draft and its translation to and from the wire mapping
//!
//! The draft mirrors the editor's fields as the operator types them (status,
//! delay and priority are text until submit). `MappingDraft::from_wire` and
//! `MappingDraft::to_wire` are the only places the two shapes meet.

use crate::constants::{ANY_METHOD, RESPONSE_TEMPLATE_TRANSFORMER};
use crate::wire::{
    BodyPattern, BodyPatternOperator, LoggedRequest, RequestPattern, ResponseDefinition,
    StubMapping, UrlMatchKind, UrlMatcher,
};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

/// Reasons a draft cannot be submitted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Status must be an integer between 100 and 599 (got {0:?})")]
    InvalidStatus(String),

    #[error("URL must not be empty")]
    EmptyUrl,
}

/// One editable response header row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRow {
    pub key: String,
    pub value: String,
}

impl HeaderRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    fn json_content_type() -> Self {
        Self::new("Content-Type", "application/json")
    }
}

/// Form state of the mapping editor
#[derive(Debug, Clone, PartialEq)]
pub struct MappingDraft {
    /// One of `METHOD_CHOICES`; `ANY` omits the method on the wire
    pub method: String,

    pub url_match: UrlMatchKind,

    pub url_value: String,

    /// Status code as typed
    pub status: String,

    pub body: String,

    pub response_headers: Vec<HeaderRow>,

    pub body_patterns: Vec<BodyPattern>,

    /// Wire clauses the editor cannot represent, re-emitted untouched
    pub preserved_body_patterns: Vec<Map<String, Value>>,

    /// Fixed delay in milliseconds, as typed
    pub delay: String,

    /// Priority, as typed
    pub priority: String,

    pub response_templating: bool,
}

impl Default for MappingDraft {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            url_match: UrlMatchKind::Url,
            url_value: String::new(),
            status: "200".to_string(),
            body: String::new(),
            response_headers: Vec::new(),
            body_patterns: Vec::new(),
            preserved_body_patterns: Vec::new(),
            delay: String::new(),
            priority: String::new(),
            response_templating: false,
        }
    }
}

impl MappingDraft {
    /// Blank draft for "new mapping", pre-filled with a JSON content type
    pub fn new_mapping() -> Self {
        Self {
            response_headers: vec![HeaderRow::json_content_type()],
            ..Self::default()
        }
    }

    /// Editable view of an existing mapping
    pub fn from_wire(mapping: &StubMapping) -> Self {
        let request = &mapping.request;
        let response = &mapping.response;

        let (url_match, url_value) = match &request.url {
            Some(url) => (url.kind(), url.value().to_string()),
            None => (UrlMatchKind::UrlPathPattern, String::new()),
        };

        let mut body_patterns = Vec::new();
        let mut preserved_body_patterns = Vec::new();
        for clause in &request.body_patterns {
            match BodyPattern::from_wire(clause) {
                Some(pattern) => body_patterns.push(pattern),
                None => preserved_body_patterns.push(clause.clone()),
            }
        }

        let response_headers = response
            .header_pairs()
            .into_iter()
            .map(|(key, value)| HeaderRow { key, value })
            .collect();

        Self {
            method: request
                .method
                .clone()
                .unwrap_or_else(|| ANY_METHOD.to_string()),
            url_match,
            url_value,
            status: response.status.to_string(),
            body: response.body.clone().unwrap_or_default(),
            response_headers,
            body_patterns,
            preserved_body_patterns,
            delay: positive_text(response.fixed_delay_milliseconds),
            priority: positive_text(mapping.priority.map(u64::from)),
            response_templating: response.has_response_templating(),
        }
    }

    /// Draft for a stub that would have served an unmatched request
    ///
    /// Matches the exact path and query, answers with what the server
    /// answered, and guesses JSON equality vs plain equality for the body.
    pub fn from_logged_request(record: &LoggedRequest) -> Self {
        let url_value = Url::parse(&record.request.absolute_url)
            .map(|url| match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            })
            .unwrap_or_else(|_| record.request.url.clone());

        let body_patterns = record
            .request
            .body
            .as_deref()
            .filter(|body| !body.trim().is_empty())
            .map(|body| {
                let operator = if serde_json::from_str::<Value>(body).is_ok() {
                    BodyPatternOperator::EqualToJson
                } else {
                    BodyPatternOperator::EqualTo
                };
                vec![BodyPattern::new(operator, body)]
            })
            .unwrap_or_default();

        Self {
            method: record.request.method.clone(),
            url_match: UrlMatchKind::Url,
            url_value,
            status: record.response_definition.status.to_string(),
            body: record.response_definition.body.clone().unwrap_or_default(),
            response_headers: vec![HeaderRow::json_content_type()],
            body_patterns,
            ..Self::default()
        }
    }

    /// Parsed status if it is an integer in 100..=599
    pub fn status_code(&self) -> Option<u16> {
        self.status
            .trim()
            .parse::<u16>()
            .ok()
            .filter(|code| (100..=599).contains(code))
    }

    pub fn validate(&self) -> Result<u16, DraftError> {
        let status = self
            .status_code()
            .ok_or_else(|| DraftError::InvalidStatus(self.status.clone()))?;
        if self.url_value.trim().is_empty() {
            return Err(DraftError::EmptyUrl);
        }
        Ok(status)
    }

    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }

    /// Build the mapping to send
    ///
    /// With a `base`, every field of the base the editor does not manage is
    /// carried over: mapping-level fields (id, uuid, name, metadata, ...),
    /// request matchers beyond method/URL/body, and transformers other than
    /// the templating marker. `request`, `response` and `priority` are always
    /// rebuilt, so an unset priority clears the base's value.
    pub fn to_wire(&self, base: Option<&StubMapping>) -> Result<StubMapping, DraftError> {
        let status = self.validate()?;

        let mut body_patterns: Vec<Map<String, Value>> = self
            .body_patterns
            .iter()
            .filter(|p| !p.value.trim().is_empty())
            .map(|p| BodyPattern::new(p.operator, p.value.trim()).to_wire())
            .collect();
        body_patterns.extend(self.preserved_body_patterns.iter().cloned());

        let request = RequestPattern {
            method: (self.method != ANY_METHOD).then(|| self.method.clone()),
            url: Some(UrlMatcher::new(self.url_match, self.url_value.trim())),
            body_patterns,
            extra: base.map(|b| b.request.extra.clone()).unwrap_or_default(),
        };

        let mut headers = Map::new();
        for row in &self.response_headers {
            let key = row.key.trim();
            let value = row.value.trim();
            if !key.is_empty() && !value.is_empty() {
                headers.insert(key.to_string(), Value::String(value.to_string()));
            }
        }

        let mut transformers: Vec<String> = base
            .and_then(|b| b.response.transformers.clone())
            .unwrap_or_default()
            .into_iter()
            .filter(|t| t != RESPONSE_TEMPLATE_TRANSFORMER)
            .collect();
        if self.response_templating {
            transformers.push(RESPONSE_TEMPLATE_TRANSFORMER.to_string());
        }

        let body = self.body.trim();
        let response = ResponseDefinition {
            body: (!body.is_empty()).then(|| body.to_string()),
            headers: (!headers.is_empty()).then_some(headers),
            fixed_delay_milliseconds: parse_positive(&self.delay),
            transformers: (!transformers.is_empty()).then_some(transformers),
            ..ResponseDefinition::new(status)
        };

        let priority = parse_positive(&self.priority).and_then(|p| u32::try_from(p).ok());

        Ok(match base {
            Some(base) => StubMapping {
                priority,
                request,
                response,
                ..base.clone()
            },
            None => StubMapping {
                id: String::new(),
                uuid: None,
                priority,
                request,
                response,
                extra: Map::new(),
            },
        })
    }
}

fn parse_positive(text: &str) -> Option<u64> {
    text.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

fn positive_text(value: Option<u64>) -> String {
    value
        .filter(|n| *n > 0)
        .map(|n| n.to_string())
        .unwrap_or_default()
}
