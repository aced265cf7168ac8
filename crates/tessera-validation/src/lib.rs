//! Validation of user-entered block data.
//!
//! Stateless: rules come from the block's form config, values are JSON.
//! [`validate_field`] checks one value against a rule list;
//! [`validate_form`] walks a field list, descending into repeaters so that
//! errors land on paths like `cards[2].link`.

mod engine;
mod result;
pub mod rules;

pub use engine::{validate_field, validate_form, validate_form_config};
pub use result::ValidationResult;
pub use rules::{is_empty_value, strip_markup};
