//! Shared block, field, and rule types for Tessera.
//!
//! This crate is the leaf of the editor core: block records, form field
//! definitions, and validation rules. It has **no internal tessera
//! dependencies**; every other crate builds on it.
//!
//! # Relationship Overview
//!
//! ```text
//! BlockRecord (BlockId)
//!     └── type → host block-type catalog (open-ended string key)
//!     └── settings / props / style → Attributes (ordered JSON maps)
//!     └── form_config → FieldDefinition[] (what the editing form shows)
//!     │       └── rules → ValidationRule[]
//!     │       └── fields → nested FieldDefinition[] (repeaters)
//!     └── parent → weak back-reference by BlockId, never ownership
//!     └── children → owned BlockRecord[] (only after hierarchy building)
//! ```
//!
//! # Key Types
//!
//! |---------------------|--------------------------------------------|
//! | Type                | Purpose                                    |
//! |---------------------|--------------------------------------------|
//! | [`BlockId`]         | Opaque block identifier, unique per store  |
//! | [`BlockRecord`]     | Serializable block state                   |
//! | [`BlockMetadata`]   | Timestamps + version counter               |
//! | [`FieldDefinition`] | One form field (possibly a repeater)       |
//! | [`ValidationRule`]  | One rule from the fixed rule vocabulary    |
//! |---------------------|--------------------------------------------|

pub mod block;
pub mod field;
pub mod ids;
pub mod rule;

pub use block::{Attributes, BlockMetadata, BlockRecord, BlockRecordBuilder, SPACING_PROP};
pub use field::{FieldDefinition, FieldType, FormConfig};
pub use ids::{BlockId, IdError};
pub use rule::{CustomPredicate, RuleKind, ValidationRule};

/// Current time as Unix milliseconds. Used by constructors throughout the crate.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A timestamp that is at least `floor`.
///
/// Wall clocks can repeat a millisecond (or step backwards); metadata
/// timestamps must not, so callers pass the previous value as the floor.
pub fn timestamp_at_least(floor: u64) -> u64 {
    now_millis().max(floor)
}
