//! Type definitions for stub endpoints.
//!
//! This module contains the validated rule, the per-request descriptor and
//! directive, and the error enums used by the endpoint system.

use crate::predicate::{decode_query, QueryMap};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Methods
// ============================================================================

/// HTTP methods a rule may accept. Parsing is case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or(ConfigurationError::InvalidMethod)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Rule
// ============================================================================

/// A validated endpoint rule. Immutable once built.
///
/// Codes and messages that were left out stay `None`; defaults are applied
/// only when a response is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub name: Option<String>,
    pub port: u16,
    pub path: String,
    pub methods: BTreeSet<HttpMethod>,
    pub expected_input: Option<Value>,
    pub success_code: Option<u16>,
    pub success_output: Option<String>,
    pub error_code: Option<u16>,
    pub error_message: Option<String>,
}

impl Rule {
    /// Whether the request line targets this rule: the path (query already
    /// stripped) equals the rule path exactly and the method is accepted.
    pub fn route_matches(&self, method: &str, path: &str) -> bool {
        path == self.path
            && method
                .parse::<HttpMethod>()
                .is_ok_and(|m| self.methods.contains(&m))
    }

    /// Name shown in logs and the startup table.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("default")
    }

    /// Comma separated method list, e.g. `GET,POST`.
    pub fn methods_label(&self) -> String {
        self.methods
            .iter()
            .map(HttpMethod::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

// ============================================================================
// Request / Response
// ============================================================================

/// One inbound request, fully buffered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDescriptor {
    pub method: String,
    /// Request path without the query fragment
    pub path: String,
    /// Parsed JSON body; `None` when absent, empty or not valid JSON
    pub body: Option<Value>,
    pub query: QueryMap,
}

impl RequestDescriptor {
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        body: Option<Value>,
        raw_query: Option<&str>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            body,
            query: decode_query(raw_query),
        }
    }

    /// Build a descriptor from a request target such as `/x?type=text`.
    pub fn from_target(method: impl Into<String>, target: &str, body: Option<Value>) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        Self::new(method, path, body, query)
    }
}

/// The status code and text body to answer one request with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDirective {
    pub status_code: u16,
    pub body: String,
}

impl ResponseDirective {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }
}

/// Result of comparing a request payload against a rule's expected input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    NotMatched,
}

impl MatchOutcome {
    pub fn is_matched(self) -> bool {
        self == MatchOutcome::Matched
    }
}

impl From<bool> for MatchOutcome {
    fn from(matched: bool) -> Self {
        if matched {
            MatchOutcome::Matched
        } else {
            MatchOutcome::NotMatched
        }
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Lifecycle state of an endpoint.
///
/// A rule that fails validation never produces an endpoint, so there is no
/// failed state to observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    /// Rule validated, not yet accepting requests
    Validated,
    Serving,
    Closed,
}

// ============================================================================
// Errors
// ============================================================================

/// A rule that must not serve traffic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Port is required")]
    MissingPort,
    #[error("Invalid or missing method")]
    InvalidMethod,
}

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("Failed to bind port {0}: {1}")]
    BindError(u16, String),
    #[error("Endpoint on port {port} is not serving (state: {state:?})")]
    NotServing { port: u16, state: EndpointState },
    #[error("Endpoint on port {port} was already started (state: {state:?})")]
    AlreadyStarted { port: u16, state: EndpointState },
}

/// A request body that is present but is not valid JSON.
#[derive(Debug, thiserror::Error)]
#[error("Request body is not valid JSON: {0}")]
pub struct PayloadParseError(#[from] serde_json::Error);

/// Parse a collected request body.
///
/// An empty (or whitespace-only) body is `Ok(None)`.
pub fn parse_body(bytes: &[u8]) -> Result<Option<Value>, PayloadParseError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(bytes)?))
}
