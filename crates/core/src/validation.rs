//! Declarative payload validation.
//!
//! A [`Schema`] is an ordered list of [`FieldRule`]s. Each rule names a field,
//! says whether it must be present, and carries a list of checks (predicate +
//! message). Validation reports at most one violation per field: the first
//! check that fails.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// All violations found while validating one payload (never empty).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", summarize(.violations))]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Single-violation error, for failures detected outside a schema
    /// (unparseable body, malformed identifier).
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![FieldViolation {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Whether any violation is reported for `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

#[derive(Clone)]
struct Check {
    predicate: Predicate,
    message: String,
}

/// Validation rule for one top-level field of a JSON object.
#[derive(Clone)]
pub struct FieldRule {
    name: &'static str,
    required: bool,
    checks: Vec<Check>,
}

impl core::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldRule")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("checks", &self.checks.len())
            .finish()
    }
}

impl FieldRule {
    pub fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            checks: Vec::new(),
        }
    }

    pub fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            checks: Vec::new(),
        }
    }

    /// Append a check. Checks run in insertion order.
    pub fn check<P>(mut self, message: impl Into<String>, predicate: P) -> Self
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Check {
            predicate: Arc::new(predicate),
            message: message.into(),
        });
        self
    }

    fn evaluate(&self, object: &Map<String, Value>) -> Option<FieldViolation> {
        let Some(value) = object.get(self.name) else {
            return self.required.then(|| FieldViolation {
                field: self.name.to_string(),
                message: format!("{} is required", self.name),
            });
        };

        self.checks
            .iter()
            .find(|c| !(c.predicate)(value))
            .map(|c| FieldViolation {
                field: self.name.to_string(),
                message: c.message.clone(),
            })
    }
}

/// An ordered set of field rules for a JSON object payload.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add a rule, replacing any existing rule for the same field.
    pub fn extend(mut self, rule: FieldRule) -> Self {
        match self.rules.iter_mut().find(|r| r.name == rule.name) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        self
    }

    /// Same checks, but every field becomes optional.
    pub fn partial(mut self) -> Self {
        for rule in &mut self.rules {
            rule.required = false;
        }
        self
    }

    /// Validate `payload`, which must be a JSON object.
    ///
    /// Unknown keys are ignored.
    pub fn validate(&self, payload: &Value) -> Result<(), ValidationErrors> {
        let Some(object) = payload.as_object() else {
            return Err(ValidationErrors::single(
                "body",
                "request body must be a JSON object",
            ));
        };

        let violations: Vec<FieldViolation> =
            self.rules.iter().filter_map(|r| r.evaluate(object)).collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { violations })
        }
    }
}

/// Reusable predicates for [`FieldRule::check`].
pub mod predicates {
    use serde_json::Value;

    pub fn is_string(value: &Value) -> bool {
        value.is_string()
    }

    pub fn is_number(value: &Value) -> bool {
        value.is_number()
    }

    pub fn is_array(value: &Value) -> bool {
        value.is_array()
    }

    /// Non-string values pass; pair with [`is_string`] to reject them.
    pub fn non_blank(value: &Value) -> bool {
        value.as_str().is_none_or(|s| !s.trim().is_empty())
    }

    pub fn max_chars(max: usize) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
        move |value| value.as_str().is_none_or(|s| s.chars().count() <= max)
    }

    /// ASCII digits only, with a length in `min..=max`.
    pub fn digits(min: usize, max: usize) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
        move |value| {
            value.as_str().is_some_and(|s| {
                (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
            })
        }
    }

    pub fn email(value: &Value) -> bool {
        value.as_str().is_some_and(is_email)
    }

    /// Address check equivalent to
    /// `^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$`.
    pub fn is_email(s: &str) -> bool {
        let Some((local, domain)) = s.split_once('@') else {
            return false;
        };
        if scan_words(local).is_none() {
            return false;
        }
        match scan_words(domain) {
            Some(WordScan {
                last_separator: Some('.'),
                last_word_len,
            }) => (2..=3).contains(&last_word_len),
            _ => false,
        }
    }

    struct WordScan {
        last_separator: Option<char>,
        last_word_len: usize,
    }

    /// Accepts runs of word characters (`[A-Za-z0-9_]`) joined by single
    /// `.` or `-` separators, with no leading or trailing separator.
    fn scan_words(s: &str) -> Option<WordScan> {
        let mut last_separator = None;
        let mut word_len = 0usize;

        for c in s.chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                word_len += 1;
            } else if c == '.' || c == '-' {
                if word_len == 0 {
                    return None;
                }
                last_separator = Some(c);
                word_len = 0;
            } else {
                return None;
            }
        }

        (word_len > 0).then_some(WordScan {
            last_separator,
            last_word_len: word_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::predicates::*;
    use super::*;
    use serde_json::json;

    fn person_schema() -> Schema {
        Schema::new()
            .field(
                FieldRule::required("name")
                    .check("name must be a string", is_string)
                    .check("name is too long", max_chars(5)),
            )
            .field(FieldRule::optional("age").check("age must be a number", is_number))
    }

    #[test]
    fn valid_payload_passes() {
        assert!(person_schema().validate(&json!({"name": "Ann", "age": 3})).is_ok());
    }

    #[test]
    fn missing_required_field_is_reported() {
        let err = person_schema().validate(&json!({})).unwrap_err();
        assert_eq!(
            err.violations(),
            &[FieldViolation {
                field: "name".into(),
                message: "name is required".into()
            }]
        );
    }

    #[test]
    fn first_failing_check_wins_per_field() {
        let err = person_schema()
            .validate(&json!({"name": 42, "age": "x"}))
            .unwrap_err();
        let messages: Vec<_> = err.violations().iter().map(|v| v.message.as_str()).collect();
        assert_eq!(messages, vec!["name must be a string", "age must be a number"]);
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = person_schema().validate(&json!([1, 2])).unwrap_err();
        assert!(err.has_field("body"));
    }

    #[test]
    fn partial_makes_fields_optional_but_keeps_checks() {
        let schema = person_schema().partial();
        assert!(schema.validate(&json!({})).is_ok());
        assert!(schema.validate(&json!({"name": "too long"})).is_err());
    }

    #[test]
    fn extend_replaces_rule_with_same_name() {
        let schema = person_schema().extend(FieldRule::optional("name"));
        assert!(schema.validate(&json!({})).is_ok());
        // The optional `age` rule is still in place.
        assert!(schema.validate(&json!({"age": "x"})).unwrap_err().has_field("age"));
    }

    #[test]
    fn email_rule_matches_expected_shapes() {
        for ok in ["john@example.com", "a.b-c@mail.example.co", "x_1@d.io"] {
            assert!(is_email(ok), "{ok} should be accepted");
        }
        for bad in [
            "plain",
            "@example.com",
            "john@",
            "john@example",
            "john@example.comm",
            "john..doe@example.com",
            "john@example.com.",
            "jo hn@example.com",
            "a@b@example.com",
            "john@example-com",
        ] {
            assert!(!is_email(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn digits_rule_bounds_length() {
        let rule = digits(10, 13);
        assert!(rule(&json!("0851234567")));
        assert!(rule(&json!("0851234567890")));
        assert!(!rule(&json!("085123456")));
        assert!(!rule(&json!("08512345678901")));
        assert!(!rule(&json!("08512345ab")));
        assert!(!rule(&json!(851234567890u64)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn digit_strings_in_range_always_pass(s in "[0-9]{10,13}") {
                prop_assert!(digits(10, 13)(&json!(s)));
            }

            #[test]
            fn strings_with_whitespace_are_never_emails(
                local in "[a-z]{1,8}",
                domain in "[a-z]{1,8}"
            ) {
                let candidate = format!("{local} @{domain}.com");
                prop_assert!(!is_email(&candidate));
            }

            #[test]
            fn simple_addresses_are_emails(
                local in "[a-z0-9_]{1,12}",
                domain in "[a-z0-9]{1,12}",
                tld in "[a-z]{2,3}"
            ) {
                let candidate = format!("{local}@{domain}.{tld}");
                prop_assert!(is_email(&candidate));
            }
        }
    }
}
