//! Field and form validation, including nested repeaters.

use serde_json::Value;
use tessera_types::{Attributes, FieldDefinition, FormConfig, ValidationRule};

use crate::result::ValidationResult;
use crate::rules;

static NULL: Value = Value::Null;

/// Every failure message for `value`, in rule order.
///
/// Rules do not short-circuit: a value may fail several at once.
pub fn validate_field(value: &Value, rules: &[ValidationRule]) -> Vec<String> {
    rules.iter().filter_map(|rule| rules::check(rule, value)).collect()
}

/// Validate `data` against `fields`.
///
/// Repeater values are validated item by item against the repeater's
/// sub-fields, at any nesting depth, with errors keyed `key[index].sub`.
/// A missing field is validated as null; a non-array repeater value has no
/// items; a non-object item is validated as an empty record.
pub fn validate_form(data: &Attributes, fields: &[FieldDefinition]) -> ValidationResult {
    let mut result = ValidationResult::new();
    validate_fields(data, fields, None, &mut result);
    result
}

/// [`validate_form`] over a block's form config.
pub fn validate_form_config(data: &Attributes, config: &FormConfig) -> ValidationResult {
    validate_form(data, &config.fields)
}

fn validate_fields(
    data: &Attributes,
    fields: &[FieldDefinition],
    prefix: Option<&str>,
    result: &mut ValidationResult,
) {
    let empty = Attributes::new();
    for field in fields {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{}", field.key),
            None => field.key.clone(),
        };
        let value = data.get(&field.key).unwrap_or(&NULL);

        if field.has_rules() {
            result.add_errors(path.as_str(), validate_field(value, &field.rules));
        }

        if field.is_repeater() {
            let items = value.as_array().map(Vec::as_slice).unwrap_or(&[]);
            for (index, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{index}]");
                let item_data = item.as_object().unwrap_or(&empty);
                validate_fields(item_data, &field.fields, Some(item_path.as_str()), result);
            }
        }
    }
}
