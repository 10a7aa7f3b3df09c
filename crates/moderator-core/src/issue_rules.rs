//! Configured title/body rules and their evaluation.
//!
//! A rule *fails* when its pattern matches (or, with `closeIfMatch: false`,
//! when it does not). Failed rules contribute a rendered message and their
//! labels to the [`EvaluationOutcome`]; the caller decides what to do with it.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::message_template::render_template;
use crate::text_normalize::normalize_for_match;

/// Substituted for `{match}` when there is no captured text to show.
pub const NO_MATCH_PLACEHOLDER: &str = "<No match>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Enumerates supported `RuleScope` values.
pub enum RuleScope {
    Title,
    Body,
    Both,
}

fn default_close_if_match() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One configured rule, in the JSON shape of the `auto-close-rules` input.
pub struct Rule {
    #[serde(rename = "type")]
    pub scope: RuleScope,
    #[serde(rename = "regex")]
    pub pattern: String,
    #[serde(default)]
    pub ignore_case: bool,
    #[serde(default = "default_close_if_match")]
    pub close_if_match: bool,
    pub message: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Per-rule verdict, kept in declaration order for logging.
pub struct RuleVerdict {
    pub index: usize,
    pub failed: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Public struct `EvaluationOutcome` used by the rule check.
pub struct EvaluationOutcome {
    pub failed_messages: Vec<String>,
    pub labels_to_apply: Vec<String>,
    pub verdicts: Vec<RuleVerdict>,
}

impl EvaluationOutcome {
    pub fn has_failures(&self) -> bool {
        !self.failed_messages.is_empty()
    }
}

fn compile_rule(index: usize, rule: &Rule) -> Result<Regex, ConfigError> {
    if rule.pattern.trim().is_empty() {
        return Err(ConfigError::EmptyPattern { index });
    }
    RegexBuilder::new(&rule.pattern)
        .case_insensitive(rule.ignore_case)
        .build()
        .map_err(|error| ConfigError::InvalidPattern {
            index,
            pattern: rule.pattern.clone(),
            message: error.to_string(),
        })
}

fn subject_texts<'a>(scope: RuleScope, title: &'a str, body: &'a str) -> Vec<&'a str> {
    match scope {
        RuleScope::Title => vec![title],
        RuleScope::Body => vec![body],
        RuleScope::Both => vec![title, body],
    }
}

/// Returns `Some(captured)` for the first subject that matches, where
/// `captured` is the first capture group when it participated.
fn first_match(pattern: &Regex, subjects: &[&str]) -> Option<Option<String>> {
    subjects.iter().find_map(|subject| {
        let normalized = normalize_for_match(subject);
        pattern.captures(&normalized).map(|captures| {
            captures
                .get(1)
                .map(|group| group.as_str().to_string())
        })
    })
}

/// Validate every rule pattern without evaluating anything.
pub fn validate_rules(rules: &[Rule]) -> Result<(), ConfigError> {
    for (index, rule) in rules.iter().enumerate() {
        compile_rule(index, rule)?;
    }
    Ok(())
}

/// Evaluate `rules` in declaration order against the issue title and body.
pub fn evaluate_rules(
    rules: &[Rule],
    title: &str,
    body: &str,
) -> Result<EvaluationOutcome, ConfigError> {
    let mut outcome = EvaluationOutcome::default();
    for (index, rule) in rules.iter().enumerate() {
        let pattern = compile_rule(index, rule)?;
        let subjects = subject_texts(rule.scope, title, body);
        let matched = first_match(&pattern, &subjects);
        let failed = matched.is_some() == rule.close_if_match;
        let captured = matched
            .flatten()
            .unwrap_or_else(|| NO_MATCH_PLACEHOLDER.to_string());
        let message = render_template(&rule.message, &[("match", captured.as_str())]);

        if failed {
            outcome.failed_messages.push(message.clone());
            for label in &rule.labels {
                if !outcome.labels_to_apply.contains(label) {
                    outcome.labels_to_apply.push(label.clone());
                }
            }
        }
        outcome.verdicts.push(RuleVerdict {
            index,
            failed,
            message,
        });
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::{evaluate_rules, validate_rules, Rule, RuleScope, NO_MATCH_PLACEHOLDER};
    use crate::error::ConfigError;

    fn rule(scope: RuleScope, pattern: &str, message: &str, labels: &[&str]) -> Rule {
        Rule {
            scope,
            pattern: pattern.to_string(),
            ignore_case: true,
            close_if_match: true,
            message: message.to_string(),
            labels: labels.iter().map(|label| label.to_string()).collect(),
        }
    }

    #[test]
    fn unit_evaluate_rules_returns_failed_messages_and_labels() {
        let rules = vec![rule(
            RuleScope::Both,
            ".*default message.*",
            "Contains default message",
            &["failed"],
        )];
        let outcome = evaluate_rules(
            &rules,
            "Title with default message",
            "Body with DEFAULT message",
        )
        .expect("evaluate");
        assert_eq!(outcome.failed_messages, vec!["Contains default message"]);
        assert_eq!(outcome.labels_to_apply, vec!["failed"]);
    }

    #[test]
    fn unit_evaluate_rules_passes_when_nothing_matches() {
        let rules = vec![rule(RuleScope::Title, "^\\[bug\\]", "Not a bug title", &["invalid"])];
        let outcome = evaluate_rules(&rules, "Feature request", "body").expect("evaluate");
        assert!(outcome.failed_messages.is_empty());
        assert!(outcome.labels_to_apply.is_empty());
        assert!(!outcome.has_failures());
        assert_eq!(outcome.verdicts.len(), 1);
        assert!(!outcome.verdicts[0].failed);
    }

    #[test]
    fn functional_evaluate_rules_inverted_rule_fails_without_match() {
        let mut inverted = rule(
            RuleScope::Title,
            ".*default message.*",
            "Does not contain template",
            &["failed"],
        );
        inverted.close_if_match = false;
        let outcome = evaluate_rules(&[inverted], "Modified title", "Body").expect("evaluate");
        assert_eq!(outcome.failed_messages, vec!["Does not contain template"]);
        assert_eq!(outcome.labels_to_apply, vec!["failed"]);
    }

    #[test]
    fn functional_evaluate_rules_substitutes_first_capture_group() {
        let rules = vec![rule(
            RuleScope::Body,
            "version (\\d+\\.\\d+)",
            "Version {match} is unsupported ({match})",
            &[],
        )];
        let outcome =
            evaluate_rules(&rules, "t", "running version 0.9 and version 1.2").expect("evaluate");
        assert_eq!(
            outcome.failed_messages,
            vec!["Version 0.9 is unsupported (0.9)"]
        );
    }

    #[test]
    fn functional_evaluate_rules_uses_placeholder_without_capture_group() {
        let rules = vec![rule(RuleScope::Title, "spam", "Matched {match}", &[])];
        let outcome = evaluate_rules(&rules, "spam spam", "").expect("evaluate");
        assert_eq!(
            outcome.failed_messages,
            vec![format!("Matched {NO_MATCH_PLACEHOLDER}")]
        );
    }

    #[test]
    fn integration_evaluate_rules_normalizes_diacritics_before_matching() {
        let mut strict = rule(RuleScope::Title, "cafe", "accented {match}", &["lang"]);
        strict.ignore_case = false;
        let outcome = evaluate_rules(&[strict], "Un café", "").expect("evaluate");
        assert_eq!(outcome.failed_messages.len(), 1);
    }

    #[test]
    fn integration_evaluate_rules_collapses_duplicate_labels_in_declaration_order() {
        let rules = vec![
            rule(RuleScope::Title, "a", "first", &["invalid", "needs-info"]),
            rule(RuleScope::Title, "b", "second", &["needs-info", "spam"]),
        ];
        let outcome = evaluate_rules(&rules, "ab", "").expect("evaluate");
        assert_eq!(outcome.failed_messages, vec!["first", "second"]);
        assert_eq!(outcome.labels_to_apply, vec!["invalid", "needs-info", "spam"]);
    }

    #[test]
    fn regression_evaluate_rules_reports_attributable_pattern_errors() {
        let rules = vec![
            rule(RuleScope::Title, "ok", "fine", &[]),
            rule(RuleScope::Title, "(unclosed", "broken", &[]),
        ];
        let error = evaluate_rules(&rules, "ok", "").expect_err("invalid pattern");
        assert!(matches!(error, ConfigError::InvalidPattern { index: 1, .. }));

        let empty = vec![rule(RuleScope::Body, "  ", "empty", &[])];
        assert_eq!(
            validate_rules(&empty),
            Err(ConfigError::EmptyPattern { index: 0 })
        );
    }

    #[test]
    fn regression_rule_deserializes_from_input_json_shape() {
        let rules: Vec<Rule> = serde_json::from_str(
            r#"[{"type":"both","regex":".*default message.*","ignoreCase":true,"message":"m","labels":["failed"]},
                {"type":"title","regex":"x","closeIfMatch":false,"message":"n"}]"#,
        )
        .expect("rules json");
        assert_eq!(rules[0].scope, RuleScope::Both);
        assert!(rules[0].ignore_case);
        assert!(rules[0].close_if_match);
        assert!(!rules[1].close_if_match);
        assert!(!rules[1].ignore_case);
        assert!(rules[1].labels.is_empty());
    }
}
