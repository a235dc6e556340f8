//! Configuration file model for stub endpoints.
//!
//! A configuration file holds an array of records, one per endpoint. A single
//! top-level record is accepted as a one-element array. Files ending in `.yaml`
//! or `.yml` are parsed as YAML, everything else as JSON.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// One endpoint record as written in the configuration file.
///
/// Nothing here is validated yet; see `endpoint::validate_rule`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    /// Informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Accepted as `methods` or `method`, as a string or an array of strings
    #[serde(default, alias = "method", skip_serializing_if = "Option::is_none")]
    pub methods: Option<MethodSpec>,
    /// Expected request payload. JSON `null` is the same as leaving it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// HTTP method(s) as written in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MethodSpec {
    One(String),
    Many(Vec<String>),
}

impl MethodSpec {
    /// Method names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            MethodSpec::One(name) => vec![name.as_str()],
            MethodSpec::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for MethodSpec {
    fn from(value: &str) -> Self {
        MethodSpec::One(value.to_string())
    }
}

impl From<Vec<&str>> for MethodSpec {
    fn from(values: Vec<&str>) -> Self {
        MethodSpec::Many(values.into_iter().map(str::to_string).collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigFile {
    Many(Vec<RuleConfig>),
    One(Box<RuleConfig>),
}

impl From<ConfigFile> for Vec<RuleConfig> {
    fn from(file: ConfigFile) -> Self {
        match file {
            ConfigFile::Many(rules) => rules,
            ConfigFile::One(rule) => vec![*rule],
        }
    }
}

/// Parse configuration text as JSON.
pub fn parse_json(contents: &str) -> Result<Vec<RuleConfig>, anyhow::Error> {
    let file: ConfigFile =
        serde_json::from_str(contents).context("Invalid JSON endpoint configuration")?;
    Ok(file.into())
}

/// Parse configuration text as YAML.
pub fn parse_yaml(contents: &str) -> Result<Vec<RuleConfig>, anyhow::Error> {
    let file: ConfigFile =
        serde_yaml::from_str(contents).context("Invalid YAML endpoint configuration")?;
    Ok(file.into())
}

/// Load endpoint records from a file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Vec<RuleConfig>, anyhow::Error> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let rules = if is_yaml {
        parse_yaml(&contents)
    } else {
        parse_json(&contents)
    }
    .with_context(|| format!("Failed to parse config file {}", path.display()))?;

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_full_record() {
        let rules = parse_json(
            r#"[{
                "name": "text",
                "port": 3000,
                "path": "/",
                "method": "POST",
                "input": {"type": "text"},
                "code": 200,
                "output": "text",
                "errorCode": 500,
                "errorMessage": "Internal Server Error"
            }]"#,
        )
        .unwrap();

        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.name.as_deref(), Some("text"));
        assert_eq!(rule.port, Some(3000));
        assert_eq!(rule.methods, Some(MethodSpec::from("POST")));
        assert_eq!(rule.input, Some(json!({"type": "text"})));
        assert_eq!(rule.error_code, Some(500));
        assert_eq!(rule.error_message.as_deref(), Some("Internal Server Error"));
    }

    #[test]
    fn test_methods_accepts_array_under_either_name() {
        let rules =
            parse_json(r#"[{"port": 1, "methods": ["GET", "POST"]}, {"port": 2, "method": ["PUT"]}]"#)
                .unwrap();
        assert_eq!(rules[0].methods, Some(MethodSpec::from(vec!["GET", "POST"])));
        assert_eq!(rules[1].methods, Some(MethodSpec::from(vec!["PUT"])));
        assert_eq!(rules[0].methods.as_ref().unwrap().names(), vec!["GET", "POST"]);
    }

    #[test]
    fn test_minimal_record_leaves_everything_unset() {
        let rules = parse_json(r#"[{}]"#).unwrap();
        assert_eq!(rules[0], RuleConfig::default());
    }

    #[test]
    fn test_null_input_is_unset() {
        let rules = parse_json(r#"[{"port": 1, "method": "GET", "input": null}]"#).unwrap();
        assert_eq!(rules[0].input, None);
    }

    #[test]
    fn test_single_record_is_wrapped() {
        let rules = parse_json(r#"{"port": 3000, "method": "GET"}"#).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].port, Some(3000));
    }

    #[test]
    fn test_invalid_port_type_is_rejected() {
        assert!(parse_json(r#"[{"port": -1, "method": "GET"}]"#).is_err());
        assert!(parse_json(r#"[{"port": "3000", "method": "GET"}]"#).is_err());
    }

    #[test]
    fn test_parse_yaml() {
        let rules = parse_yaml(
            "- name: patch\n  port: 3003\n  path: /update\n  methods: [PATCH]\n  input:\n    type: json\n  code: 201\n  output: Updated\n",
        )
        .unwrap();
        assert_eq!(rules[0].port, Some(3003));
        assert_eq!(rules[0].path.as_deref(), Some("/update"));
        assert_eq!(rules[0].input, Some(json!({"type": "json"})));
        assert_eq!(rules[0].code, Some(201));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"port": 3000, "method": "GET"}}]"#).unwrap();

        let rules = load_config(file.path()).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].port, Some(3000));
    }

    #[test]
    fn test_load_config_picks_yaml_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        write!(file, "port: 3000\nmethod: GET\n").unwrap();

        let rules = load_config(file.path()).unwrap();
        assert_eq!(rules[0].methods, Some(MethodSpec::from("GET")));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("definitely-not-here.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
