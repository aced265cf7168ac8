//! Form field definitions.
//!
//! A block's editing form is a list of [`FieldDefinition`]s. Repeaters carry
//! their own nested field list, which may itself contain repeaters; nesting
//! depth is unbounded.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::EnumString;

use crate::block::Attributes;
use crate::rule::ValidationRule;

/// What kind of input a field renders as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive, serialize_all = "kebab-case")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    #[strum(serialize = "rich-text", serialize = "richtext", serialize = "wysiwyg")]
    RichText,
    Number,
    Email,
    Url,
    Select,
    /// Select whose options come from a host API call.
    #[strum(serialize = "api-select", serialize = "apiselect")]
    ApiSelect,
    Checkbox,
    Image,
    Link,
    Color,
    Spacing,
    /// Repeating group: the value is an array of sub-records.
    Repeater,
    /// Host-registered custom field renderer.
    Custom,
    /// Any type this version does not know about.
    #[serde(other)]
    #[strum(disabled)]
    Unknown,
}

impl FieldType {
    /// Parse from string (case-insensitive). Unrecognized names map to `Unknown`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        <Self as FromStr>::from_str(s).unwrap_or(Self::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::RichText => "rich-text",
            FieldType::Number => "number",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Select => "select",
            FieldType::ApiSelect => "api-select",
            FieldType::Checkbox => "checkbox",
            FieldType::Image => "image",
            FieldType::Link => "link",
            FieldType::Color => "color",
            FieldType::Spacing => "spacing",
            FieldType::Repeater => "repeater",
            FieldType::Custom => "custom",
            FieldType::Unknown => "unknown",
        }
    }

    pub fn is_repeater(&self) -> bool {
        matches!(self, FieldType::Repeater)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field in a block's editing form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Key in the form data (and in `settings`/`props` once committed).
    pub key: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<ValidationRule>,
    /// Sub-fields of a repeater. Ignored for other field types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDefinition>,
    /// Renderer options (select choices, API endpoint, spacing breakpoints, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub options: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldDefinition {
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            field_type,
            label: None,
            rules: Vec::new(),
            fields: Vec::new(),
            options: Attributes::new(),
            default: None,
        }
    }

    /// A repeater over the given sub-fields.
    pub fn repeater(key: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            fields,
            ..Self::new(key, FieldType::Repeater)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attach a rule; the rule's `field` is set to this field's key.
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule.for_field(self.key.clone()));
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn is_repeater(&self) -> bool {
        self.field_type.is_repeater()
    }

    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty()
    }
}

/// The editing form attached to a block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl FormConfig {
    pub fn new(fields: Vec<FieldDefinition>) -> Self {
        Self { fields }
    }

    /// Look up a top-level field by key.
    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.key == key)
    }
}
