//! # Argument Translation
//!
//! Each packager descriptor carries a table of [`ArgumentMappingRule`]s
//! describing how a flag given to `dry` is expressed for the wrapped package
//! manager. The [`ArgumentTranslator`] applies that table token by token and
//! fills two output streams:
//!
//! - the *general* stream, forwarded to the main package manager command;
//! - the *install-parent* stream, appended to the command installing the
//!   dependencies a parent fragment needs. Only rules flagged with
//!   `allowArgInInstallParentCommand` contribute to it.
//!
//! Rule JSON format:
//!
//! ```json
//! { "arguments": ["-q", "--quiet"], "allowArgInInstallParentCommand": true,
//!   "mappedTo": ["--loglevel", "warn"] }
//! { "arguments": ["--loglevel"], "expectSubArgument": true,
//!   "mappedArgumentValues": { "trace": ["--loglevel", "silly"] } }
//! ```
//!
//! Matching is case-insensitive on both the flag and its value. A flag whose
//! value has no mapping is forwarded unchanged; an argument is never dropped.

use serde::Deserialize;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{Error, Result};

/// How the output tokens of a rule are produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapping {
    /// Fixed output for a flag without value
    Fixed(Vec<String>),
    /// Output selected by the lower-cased flag value
    ByValue(HashMap<String, Vec<String>>),
}

/// One entry of a packager's argument table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawArgumentMapping")]
pub struct ArgumentMappingRule {
    arguments: Vec<String>,
    expects_value: bool,
    allow_on_install_parent: bool,
    mapping: Mapping,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawArgumentMapping {
    arguments: Vec<String>,
    #[serde(default)]
    expect_sub_argument: bool,
    #[serde(default)]
    allow_arg_in_install_parent_command: bool,
    #[serde(default)]
    mapped_to: Option<Vec<String>>,
    #[serde(default)]
    mapped_argument_values: Option<HashMap<String, Vec<String>>>,
}

impl TryFrom<RawArgumentMapping> for ArgumentMappingRule {
    type Error = String;

    fn try_from(raw: RawArgumentMapping) -> std::result::Result<Self, Self::Error> {
        let label = raw.arguments.join(", ");
        if raw.arguments.iter().all(|a| a.trim().is_empty()) {
            return Err("an argument mapping must list at least one argument".to_string());
        }
        let mapping = match (
            raw.expect_sub_argument,
            raw.mapped_to,
            raw.mapped_argument_values,
        ) {
            (false, Some(fixed), None) => Mapping::Fixed(fixed),
            (true, None, Some(values)) => Mapping::ByValue(values),
            (false, _, _) => {
                return Err(format!(
                    "argument [{}] does not expect a value and must define only 'mappedTo'",
                    label
                ))
            }
            (true, _, _) => {
                return Err(format!(
                    "argument [{}] expects a value and must define only 'mappedArgumentValues'",
                    label
                ))
            }
        };
        Ok(Self::new(
            raw.arguments,
            mapping,
            raw.allow_arg_in_install_parent_command,
        ))
    }
}

impl ArgumentMappingRule {
    /// Build a rule; `expects_value` follows the mapping form
    pub fn new(arguments: Vec<String>, mapping: Mapping, allow_on_install_parent: bool) -> Self {
        let expects_value = matches!(mapping, Mapping::ByValue(_));
        let mapping = match mapping {
            Mapping::ByValue(values) => Mapping::ByValue(
                values
                    .into_iter()
                    .map(|(value, out)| (value.to_lowercase(), out))
                    .collect(),
            ),
            fixed => fixed,
        };
        Self {
            arguments: arguments
                .into_iter()
                .filter(|a| !a.trim().is_empty())
                .map(|a| a.to_lowercase())
                .collect(),
            expects_value,
            allow_on_install_parent,
            mapping,
        }
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn expects_value(&self) -> bool {
        self.expects_value
    }

    pub fn allow_on_install_parent(&self) -> bool {
        self.allow_on_install_parent
    }

    fn matches(&self, lowered: &str) -> bool {
        self.arguments.iter().any(|a| a == lowered)
    }

    /// Output tokens for `token` with its optional `value`
    fn resolve(&self, token: &str, value: Option<&str>) -> Vec<String> {
        let mapped = match &self.mapping {
            Mapping::Fixed(out) => Some(out.clone()),
            Mapping::ByValue(values) => {
                value.and_then(|v| values.get(&v.to_lowercase()).cloned())
            }
        };
        mapped.unwrap_or_else(|| {
            let mut passthrough = vec![token.to_string()];
            if let Some(v) = value {
                passthrough.push(v.to_string());
            }
            passthrough
        })
    }
}

/// Applies a packager's argument table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentTranslator {
    rules: Vec<ArgumentMappingRule>,
}

impl ArgumentTranslator {
    /// Build a translator, rejecting tables where two rules share an argument
    pub fn new(rules: Vec<ArgumentMappingRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        for rule in &rules {
            for argument in rule.arguments() {
                if !seen.insert(argument.clone()) {
                    return Err(Error::AmbiguousMapping {
                        argument: argument.clone(),
                    });
                }
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[ArgumentMappingRule] {
        &self.rules
    }

    fn find_rule(&self, token: &str) -> Result<Option<&ArgumentMappingRule>> {
        if token.trim().is_empty() {
            return Ok(None);
        }
        let lowered = token.to_lowercase();
        let mut matching = self.rules.iter().filter(|rule| rule.matches(&lowered));
        let first = matching.next();
        if first.is_some() && matching.next().is_some() {
            return Err(Error::AmbiguousMapping {
                argument: token.to_string(),
            });
        }
        Ok(first)
    }

    /// Translate `token` (and its `value`, if already extracted).
    ///
    /// When the matching rule expects a value and none was given, the next
    /// token of `remaining` is consumed.
    ///
    /// # Errors
    ///
    /// `MissingArgumentValue` when a value is expected but `remaining` is
    /// empty, `AmbiguousMapping` when several rules match `token`.
    pub fn map_arguments(
        &self,
        token: &str,
        value: Option<String>,
        remaining: &mut VecDeque<String>,
        out_general: &mut Vec<String>,
        out_install_parent: &mut Vec<String>,
    ) -> Result<()> {
        let Some(rule) = self.find_rule(token)? else {
            out_general.push(token.to_string());
            out_general.extend(value);
            return Ok(());
        };

        let value = match value {
            None if rule.expects_value() => {
                Some(
                    remaining
                        .pop_front()
                        .ok_or_else(|| Error::MissingArgumentValue {
                            argument: token.to_string(),
                        })?,
                )
            }
            other => other,
        };

        let mapped = rule.resolve(token, value.as_deref());
        if rule.allow_on_install_parent() {
            out_install_parent.extend(mapped.iter().cloned());
        }
        out_general.extend(mapped);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn loglevel_rule() -> ArgumentMappingRule {
        let values = HashMap::from([
            ("trace".to_string(), strings(&["--loglevel", "silly"])),
            ("Debug".to_string(), strings(&["--loglevel", "verbose"])),
        ]);
        ArgumentMappingRule::new(strings(&["--loglevel"]), Mapping::ByValue(values), true)
    }

    fn quiet_rule() -> ArgumentMappingRule {
        ArgumentMappingRule::new(
            strings(&["-q", "--quiet"]),
            Mapping::Fixed(strings(&["--loglevel", "warn"])),
            false,
        )
    }

    fn translator() -> ArgumentTranslator {
        ArgumentTranslator::new(vec![loglevel_rule(), quiet_rule()]).unwrap()
    }

    #[test]
    fn test_unmatched_token_passes_through() {
        let mut remaining = VecDeque::new();
        let (mut general, mut parent) = (Vec::new(), Vec::new());
        translator()
            .map_arguments("-dd", None, &mut remaining, &mut general, &mut parent)
            .unwrap();
        assert_eq!(general, strings(&["-dd"]));
        assert!(parent.is_empty());
    }

    #[test]
    fn test_unmatched_token_keeps_value() {
        let mut remaining = VecDeque::new();
        let (mut general, mut parent) = (Vec::new(), Vec::new());
        translator()
            .map_arguments(
                "--registry",
                Some("http://localhost".to_string()),
                &mut remaining,
                &mut general,
                &mut parent,
            )
            .unwrap();
        assert_eq!(general, strings(&["--registry", "http://localhost"]));
    }

    #[test]
    fn test_value_mapping_with_install_parent() {
        let mut remaining = VecDeque::new();
        let (mut general, mut parent) = (Vec::new(), Vec::new());
        translator()
            .map_arguments(
                "--loglevel",
                Some("trace".to_string()),
                &mut remaining,
                &mut general,
                &mut parent,
            )
            .unwrap();
        assert_eq!(general, strings(&["--loglevel", "silly"]));
        assert_eq!(parent, strings(&["--loglevel", "silly"]));
    }

    #[test]
    fn test_value_consumed_from_remaining() {
        let mut remaining = VecDeque::from(strings(&["TRACE", "install"]));
        let (mut general, mut parent) = (Vec::new(), Vec::new());
        translator()
            .map_arguments("--LogLevel", None, &mut remaining, &mut general, &mut parent)
            .unwrap();
        assert_eq!(general, strings(&["--loglevel", "silly"]));
        assert_eq!(remaining, VecDeque::from(strings(&["install"])));
    }

    #[test]
    fn test_value_keys_are_case_insensitive() {
        let mut remaining = VecDeque::new();
        let (mut general, mut parent) = (Vec::new(), Vec::new());
        translator()
            .map_arguments(
                "--loglevel",
                Some("debug".to_string()),
                &mut remaining,
                &mut general,
                &mut parent,
            )
            .unwrap();
        assert_eq!(general, strings(&["--loglevel", "verbose"]));
    }

    #[test]
    fn test_unknown_value_falls_back_to_passthrough() {
        let mut remaining = VecDeque::new();
        let (mut general, mut parent) = (Vec::new(), Vec::new());
        translator()
            .map_arguments(
                "--loglevel",
                Some("chatty".to_string()),
                &mut remaining,
                &mut general,
                &mut parent,
            )
            .unwrap();
        assert_eq!(general, strings(&["--loglevel", "chatty"]));
        assert_eq!(parent, strings(&["--loglevel", "chatty"]));
    }

    #[test]
    fn test_missing_value_is_an_error() {
        let mut remaining = VecDeque::new();
        let (mut general, mut parent) = (Vec::new(), Vec::new());
        let result =
            translator().map_arguments("--loglevel", None, &mut remaining, &mut general, &mut parent);
        assert!(matches!(result, Err(Error::MissingArgumentValue { .. })));
        assert!(general.is_empty());
    }

    #[test]
    fn test_fixed_mapping_not_on_install_parent() {
        let mut remaining = VecDeque::new();
        let (mut general, mut parent) = (Vec::new(), Vec::new());
        translator()
            .map_arguments("-Q", None, &mut remaining, &mut general, &mut parent)
            .unwrap();
        assert_eq!(general, strings(&["--loglevel", "warn"]));
        assert!(parent.is_empty());
    }

    #[test]
    fn test_overlapping_rules_rejected() {
        let other = ArgumentMappingRule::new(
            strings(&["--QUIET"]),
            Mapping::Fixed(strings(&["--silent"])),
            false,
        );
        let result = ArgumentTranslator::new(vec![quiet_rule(), other]);
        assert!(matches!(result, Err(Error::AmbiguousMapping { argument }) if argument == "--quiet"));
    }

    #[test]
    fn test_rule_deserialization() {
        let rule: ArgumentMappingRule = serde_json::from_str(
            r#"{"arguments": ["--loglevel"], "expectSubArgument": true,
                "allowArgInInstallParentCommand": true,
                "mappedArgumentValues": {"trace": ["--loglevel", "silly"]}}"#,
        )
        .unwrap();
        assert!(rule.expects_value());
        assert!(rule.allow_on_install_parent());
        assert_eq!(rule.arguments(), &strings(&["--loglevel"])[..]);
    }

    #[test]
    fn test_rule_deserialization_rejects_both_forms() {
        let result: std::result::Result<ArgumentMappingRule, _> = serde_json::from_str(
            r#"{"arguments": ["-d"], "mappedTo": ["--loglevel", "info"],
                "mappedArgumentValues": {"x": []}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rule_deserialization_rejects_missing_values_table() {
        let result: std::result::Result<ArgumentMappingRule, _> = serde_json::from_str(
            r#"{"arguments": ["--loglevel"], "expectSubArgument": true}"#,
        );
        let message = result.unwrap_err().to_string();
        assert!(message.contains("mappedArgumentValues"));
    }
}
