//! Rule validation.
//!
//! Runs once per endpoint, before it can accept traffic. Checks are ordered and
//! the first failure is returned.

use super::types::{ConfigurationError, HttpMethod, Rule};
use crate::config::RuleConfig;
use std::collections::BTreeSet;

/// Path served when a record leaves `path` out.
pub const DEFAULT_PATH: &str = "/";

/// Check a record for the minimum needed to serve traffic.
///
/// 1. `port` must be present and non-zero.
/// 2. `methods` must be present, non-empty, and contain only
///    GET, POST, PUT, DELETE, PATCH, OPTIONS or HEAD (case-sensitive).
///
/// Returns the validated port and method set. `Rule::try_from` goes through
/// here, so this is the only place the checks run.
pub fn validate_rule(
    config: &RuleConfig,
) -> Result<(u16, BTreeSet<HttpMethod>), ConfigurationError> {
    let port = parse_port(config)?;
    let methods = parse_methods(config)?;
    Ok((port, methods))
}

fn parse_port(config: &RuleConfig) -> Result<u16, ConfigurationError> {
    match config.port {
        Some(port) if port > 0 => Ok(port),
        _ => Err(ConfigurationError::MissingPort),
    }
}

fn parse_methods(config: &RuleConfig) -> Result<BTreeSet<HttpMethod>, ConfigurationError> {
    let spec = config
        .methods
        .as_ref()
        .ok_or(ConfigurationError::InvalidMethod)?;
    let names = spec.names();
    if names.is_empty() {
        return Err(ConfigurationError::InvalidMethod);
    }
    names
        .into_iter()
        .map(|name| name.parse::<HttpMethod>())
        .collect()
}

/// Treat empty strings like absent ones.
fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Treat zero like an absent code.
fn non_zero(value: Option<u16>) -> Option<u16> {
    value.filter(|code| *code != 0)
}

impl TryFrom<&RuleConfig> for Rule {
    type Error = ConfigurationError;

    fn try_from(config: &RuleConfig) -> Result<Self, Self::Error> {
        let (port, methods) = validate_rule(config)?;

        Ok(Rule {
            name: non_empty(&config.name),
            port,
            path: non_empty(&config.path).unwrap_or_else(|| DEFAULT_PATH.to_string()),
            methods,
            expected_input: config.input.clone().filter(|input| !input.is_null()),
            success_code: non_zero(config.code),
            success_output: non_empty(&config.output),
            error_code: non_zero(config.error_code),
            error_message: non_empty(&config.error_message),
        })
    }
}
