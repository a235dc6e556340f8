//! Response resolution.
//!
//! Every way a request can end up with an answer goes through `resolve`, so the
//! defaults for omitted codes and messages are applied in exactly one place.

use super::types::{MatchOutcome, ResponseDirective, Rule};

pub const DEFAULT_SUCCESS_CODE: u16 = 200;
pub const DEFAULT_ERROR_CODE: u16 = 404;
pub const DEFAULT_ERROR_MESSAGE: &str = "Not Found";

/// What is known about a request once it has been checked against a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Method and path both matched the rule
    pub route_matched: bool,
    /// Comparison of the payload against the expected input
    pub outcome: MatchOutcome,
    /// The merged payload had at least one field, item or scalar value
    pub has_payload: bool,
}

impl Evaluation {
    /// Method or path did not match; nothing else was looked at.
    pub fn route_mismatch() -> Self {
        Self {
            route_matched: false,
            outcome: MatchOutcome::NotMatched,
            has_payload: false,
        }
    }
}

/// The configured error answer, with defaults filled in.
pub fn error_directive(rule: &Rule) -> ResponseDirective {
    ResponseDirective::new(
        rule.error_code.unwrap_or(DEFAULT_ERROR_CODE),
        rule.error_message
            .as_deref()
            .unwrap_or(DEFAULT_ERROR_MESSAGE),
    )
}

/// Pick the answer for one request. The first applicable row wins:
///
/// | route | expected input | outcome    | output | answer  |
/// |-------|----------------|------------|--------|---------|
/// | no    | any            | -          | -      | error   |
/// | yes   | unset          | -          | -      | error   |
/// | yes   | set            | NotMatched | -      | error   |
/// | yes   | set            | Matched    | set    | success |
/// | yes   | set            | Matched    | unset  | error   |
///
/// A request without payload never counts as matched.
pub fn resolve(rule: &Rule, evaluation: &Evaluation) -> ResponseDirective {
    if !evaluation.route_matched || rule.expected_input.is_none() {
        return error_directive(rule);
    }
    if !evaluation.has_payload || !evaluation.outcome.is_matched() {
        return error_directive(rule);
    }
    match rule.success_output.as_deref() {
        Some(output) => ResponseDirective::new(
            rule.success_code.unwrap_or(DEFAULT_SUCCESS_CODE),
            output,
        ),
        None => error_directive(rule),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::types::HttpMethod;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn rule() -> Rule {
        Rule {
            name: None,
            port: 3000,
            path: "/".to_string(),
            methods: BTreeSet::from([HttpMethod::Post]),
            expected_input: Some(json!({"type": "text"})),
            success_code: None,
            success_output: Some("text".to_string()),
            error_code: None,
            error_message: None,
        }
    }

    fn matched() -> Evaluation {
        Evaluation {
            route_matched: true,
            outcome: MatchOutcome::Matched,
            has_payload: true,
        }
    }

    #[test]
    fn test_success_with_default_code() {
        assert_eq!(resolve(&rule(), &matched()), ResponseDirective::new(200, "text"));
    }

    #[test]
    fn test_success_with_configured_code() {
        let rule = Rule {
            success_code: Some(201),
            ..rule()
        };
        assert_eq!(resolve(&rule, &matched()), ResponseDirective::new(201, "text"));
    }

    #[test]
    fn test_route_mismatch_uses_error_defaults() {
        assert_eq!(
            resolve(&rule(), &Evaluation::route_mismatch()),
            ResponseDirective::new(404, "Not Found")
        );
    }

    #[test]
    fn test_route_mismatch_wins_over_match() {
        let evaluation = Evaluation {
            route_matched: false,
            ..matched()
        };
        assert_eq!(
            resolve(&rule(), &evaluation),
            ResponseDirective::new(404, "Not Found")
        );
    }

    #[test]
    fn test_no_expected_input_never_succeeds() {
        let rule = Rule {
            expected_input: None,
            ..rule()
        };
        assert_eq!(resolve(&rule, &matched()), ResponseDirective::new(404, "Not Found"));
    }

    #[test]
    fn test_not_matched_uses_configured_error() {
        let rule = Rule {
            error_code: Some(500),
            error_message: Some("Internal Server Error".to_string()),
            ..rule()
        };
        let evaluation = Evaluation {
            outcome: MatchOutcome::NotMatched,
            ..matched()
        };
        assert_eq!(
            resolve(&rule, &evaluation),
            ResponseDirective::new(500, "Internal Server Error")
        );
    }

    #[test]
    fn test_partial_error_configuration() {
        let code_only = Rule {
            error_code: Some(418),
            ..rule()
        };
        assert_eq!(
            resolve(&code_only, &Evaluation::route_mismatch()),
            ResponseDirective::new(418, "Not Found")
        );

        let message_only = Rule {
            error_message: Some("nope".to_string()),
            ..rule()
        };
        assert_eq!(
            resolve(&message_only, &Evaluation::route_mismatch()),
            ResponseDirective::new(404, "nope")
        );
    }

    #[test]
    fn test_match_without_output_is_error() {
        let rule = Rule {
            success_output: None,
            error_code: Some(503),
            ..rule()
        };
        assert_eq!(resolve(&rule, &matched()), ResponseDirective::new(503, "Not Found"));
    }

    #[test]
    fn test_no_payload_never_succeeds() {
        let rule = Rule {
            expected_input: Some(json!({})),
            ..rule()
        };
        let evaluation = Evaluation {
            has_payload: false,
            ..matched()
        };
        assert_eq!(resolve(&rule, &evaluation), ResponseDirective::new(404, "Not Found"));
    }
}
