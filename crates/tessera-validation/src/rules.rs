//! Evaluation of single rules against single values.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tessera_types::{RuleKind, ValidationRule};
use tracing::warn;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

const ENTITIES: [(&str, &str); 6] = [
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    // last, so `&amp;lt;` decodes to `&lt;` and not `<`
    ("&amp;", "&"),
];

/// Visible text of a markup string: tags removed, common entities decoded.
pub fn strip_markup(s: &str) -> String {
    let mut text = TAG.replace_all(s, "").into_owned();
    for (entity, replacement) in ENTITIES {
        if text.contains(entity) {
            text = text.replace(entity, replacement);
        }
    }
    text
}

/// Emptiness as `required` sees it.
///
/// Null, `""`, and `[]` are empty. A string containing tags is empty when no
/// visible text remains (`<p><br></p>`). A plain whitespace string is not.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) if s.is_empty() => true,
        Value::String(s) if TAG.is_match(s) => strip_markup(s).trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Values format rules do not look at, so optional fields may stay blank.
fn is_blank_input(value: &Value) -> bool {
    matches!(value, Value::Null) || value.as_str().is_some_and(str::is_empty)
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn as_length_bound(rule: &ValidationRule) -> Option<usize> {
    rule.value.as_ref().and_then(as_number).map(|n| n.max(0.0) as usize)
}

fn measured_length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Message shown when `rule` fails and carries no `message` of its own.
pub fn default_message(rule: &ValidationRule) -> String {
    let bound = || {
        rule.value
            .as_ref()
            .and_then(as_number)
            .map(|n| n.to_string())
            .unwrap_or_default()
    };
    match rule.kind {
        RuleKind::Required => "This field is required".to_string(),
        RuleKind::Email => "Please enter a valid email address".to_string(),
        RuleKind::Url => "Please enter a valid URL".to_string(),
        RuleKind::Min => format!("Value must be at least {}", bound()),
        RuleKind::Max => format!("Value must be at most {}", bound()),
        RuleKind::MinLength => format!("Must be at least {} characters", bound()),
        RuleKind::MaxLength => format!("Must be at most {} characters", bound()),
        RuleKind::Pattern => "Invalid format".to_string(),
        RuleKind::Custom => "Invalid value".to_string(),
    }
}

/// Whether `value` satisfies `rule`.
///
/// Rules other than `required` and `custom` pass on null and `""`. Rules
/// missing their parameter (`min` without a bound, ...) pass.
pub fn passes(rule: &ValidationRule, value: &Value) -> bool {
    match rule.kind {
        RuleKind::Required => return !is_empty_value(value),
        RuleKind::Custom => return rule.predicate.as_ref().is_none_or(|p| p(value)),
        _ => {}
    }
    if is_blank_input(value) {
        return true;
    }

    match rule.kind {
        RuleKind::Email => value.as_str().is_some_and(|s| EMAIL.is_match(s)),
        RuleKind::Url => value.as_str().is_some_and(|s| url::Url::parse(s.trim()).is_ok()),
        RuleKind::Min | RuleKind::Max => {
            let Some(bound) = rule.value.as_ref().and_then(as_number) else {
                return true;
            };
            match as_number(value) {
                Some(n) if rule.kind == RuleKind::Min => n >= bound,
                Some(n) => n <= bound,
                None => false,
            }
        }
        RuleKind::MinLength | RuleKind::MaxLength => {
            let Some(bound) = as_length_bound(rule) else {
                return true;
            };
            match measured_length(value) {
                Some(len) if rule.kind == RuleKind::MinLength => len >= bound,
                Some(len) => len <= bound,
                None => false,
            }
        }
        RuleKind::Pattern => {
            let Some(source) = rule.value.as_ref().and_then(Value::as_str) else {
                return true;
            };
            let re = match Regex::new(source) {
                Ok(re) => re,
                Err(e) => {
                    warn!(pattern = source, error = %e, "invalid pattern rule");
                    return false;
                }
            };
            match value {
                Value::String(s) => re.is_match(s),
                Value::Number(n) => re.is_match(&n.to_string()),
                _ => false,
            }
        }
        RuleKind::Required | RuleKind::Custom => true,
    }
}

/// `None` on success, the failure message otherwise.
pub fn check(rule: &ValidationRule, value: &Value) -> Option<String> {
    if passes(rule, value) {
        None
    } else {
        Some(rule.message.clone().unwrap_or_else(|| default_message(rule)))
    }
}
