//! Validation rules: the fixed rule vocabulary.
//!
//! Rules are plain data so they can live inside persisted form configs. The
//! one exception is the `custom` predicate, which is host code and is never
//! serialized.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::EnumString;

/// Host-supplied predicate for `custom` rules. Returns `false` to fail.
pub type CustomPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Which check a rule performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(ascii_case_insensitive)]
pub enum RuleKind {
    Required,
    Email,
    Url,
    Min,
    Max,
    #[strum(serialize = "minLength", serialize = "min_length")]
    MinLength,
    #[strum(serialize = "maxLength", serialize = "max_length")]
    MaxLength,
    Pattern,
    Custom,
}

impl RuleKind {
    /// Parse from string (case-insensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Email => "email",
            RuleKind::Url => "url",
            RuleKind::Min => "min",
            RuleKind::Max => "max",
            RuleKind::MinLength => "minLength",
            RuleKind::MaxLength => "maxLength",
            RuleKind::Pattern => "pattern",
            RuleKind::Custom => "custom",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation rule.
///
/// `value` is the rule parameter: the bound for `min`/`max`, the length for
/// `minLength`/`maxLength`, the regex source for `pattern`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    pub predicate: Option<CustomPredicate>,
}

impl ValidationRule {
    fn with_kind(kind: RuleKind, value: Option<Value>) -> Self {
        Self {
            kind,
            field: String::new(),
            value,
            message: None,
            predicate: None,
        }
    }

    pub fn required() -> Self {
        Self::with_kind(RuleKind::Required, None)
    }

    pub fn email() -> Self {
        Self::with_kind(RuleKind::Email, None)
    }

    pub fn url() -> Self {
        Self::with_kind(RuleKind::Url, None)
    }

    pub fn min(bound: f64) -> Self {
        Self::with_kind(RuleKind::Min, Some(Value::from(bound)))
    }

    pub fn max(bound: f64) -> Self {
        Self::with_kind(RuleKind::Max, Some(Value::from(bound)))
    }

    pub fn min_length(len: usize) -> Self {
        Self::with_kind(RuleKind::MinLength, Some(Value::from(len)))
    }

    pub fn max_length(len: usize) -> Self {
        Self::with_kind(RuleKind::MaxLength, Some(Value::from(len)))
    }

    /// Regex source; compiled at validation time.
    pub fn pattern(source: impl Into<String>) -> Self {
        Self::with_kind(RuleKind::Pattern, Some(Value::String(source.into())))
    }

    pub fn custom(predicate: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Some(Arc::new(predicate)),
            ..Self::with_kind(RuleKind::Custom, None)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn for_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("kind", &self.kind)
            .field("field", &self.field)
            .field("value", &self.value)
            .field("message", &self.message)
            .field("predicate", &self.predicate.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

// Predicates compare by identity: two rules are equal only if they share the same closure.
impl PartialEq for ValidationRule {
    fn eq(&self, other: &Self) -> bool {
        let same_predicate = match (&self.predicate, &other.predicate) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        self.kind == other.kind
            && self.field == other.field
            && self.value == other.value
            && self.message == other.message
            && same_predicate
    }
}
