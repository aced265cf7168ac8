//! Block records and metadata.
//!
//! A [`BlockRecord`] is the serializable state of one composable content unit.
//! The record itself has no behaviour beyond construction helpers; controlled
//! mutation and versioning live in `tessera-blocks::Block`.
//!
//! ## Design: open attribute maps
//!
//! `settings`, `props` and `style` are [`Attributes`], ordered JSON maps.
//! The block-type catalog is host-supplied and open-ended, so the core never
//! models per-type shapes. The one key the core reads is [`SPACING_PROP`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::FormConfig;
use crate::ids::BlockId;

/// Ordered free-form key/value mapping (insertion order is preserved).
pub type Attributes = serde_json::Map<String, Value>;

/// The `props` key holding responsive spacing data. Managed by the core and
/// stripped before props reach the rendering collaborator.
pub const SPACING_PROP: &str = "spacing";

/// Creation/update timestamps (Unix millis) and a mutation counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetadata {
    pub created_at: u64,
    pub updated_at: u64,
    /// Starts at 1; bumped by exactly one on every semantic mutation.
    pub version: u32,
}

impl BlockMetadata {
    /// Version 1, both timestamps now.
    pub fn fresh() -> Self {
        let now = crate::now_millis();
        Self {
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Version 1 with timestamps strictly greater than `floor`.
    pub fn fresh_after(floor: u64) -> Self {
        let ts = crate::timestamp_at_least(floor.saturating_add(1));
        Self {
            created_at: ts,
            updated_at: ts,
            version: 1,
        }
    }

    /// Record one mutation: `updated_at` never moves backwards, `version` + 1.
    pub fn touch(&mut self) {
        self.updated_at = crate::timestamp_at_least(self.updated_at);
        self.version = self.version.saturating_add(1);
    }
}

fn default_true() -> bool {
    true
}

/// Serializable block state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    pub id: BlockId,
    /// Key into the host's block-type catalog.
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub settings: Attributes,
    /// Passed to the block's renderer (minus [`SPACING_PROP`]).
    #[serde(default)]
    pub props: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_config: Option<FormConfig>,
    /// Owned by the rendering collaborator; opaque here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_ref: Option<Value>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BlockMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BlockRecord>,
    /// Weak back-reference to the parent block. Never an ownership edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<BlockId>,
}

impl BlockRecord {
    /// A visible, unlocked block with empty maps and fresh metadata.
    pub fn new(id: impl Into<BlockId>, block_type: impl Into<String>) -> Self {
        BlockRecordBuilder::new(id, block_type).build()
    }

    /// Check if this is a root block (no parent reference).
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Check if this block declares a parent.
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Whether `parent` points at `id`.
    pub fn is_direct_child_of(&self, id: &BlockId) -> bool {
        self.parent.as_ref() == Some(id)
    }
}

/// Builder for `BlockRecord`. The record has enough optional fields that
/// struct literals get noisy in hosts and tests.
///
/// ```
/// # use tessera_types::*;
/// let record = BlockRecordBuilder::new("hero-1", "hero")
///     .prop("title", "Welcome")
///     .setting("fullWidth", true)
///     .parent("section-1")
///     .build();
/// assert_eq!(record.block_type, "hero");
/// assert_eq!(record.parent, Some(BlockId::new("section-1")));
/// ```
pub struct BlockRecordBuilder {
    record: BlockRecord,
}

impl BlockRecordBuilder {
    /// Start building with the two required fields.
    pub fn new(id: impl Into<BlockId>, block_type: impl Into<String>) -> Self {
        Self {
            record: BlockRecord {
                id: id.into(),
                block_type: block_type.into(),
                settings: Attributes::new(),
                props: Attributes::new(),
                style: None,
                form_config: None,
                render_ref: None,
                visible: true,
                locked: false,
                metadata: Some(BlockMetadata::fresh()),
                children: Vec::new(),
                parent: None,
            },
        }
    }

    pub fn setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record.settings.insert(key.into(), value.into());
        self
    }

    pub fn settings(mut self, settings: Attributes) -> Self {
        self.record.settings = settings;
        self
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record.props.insert(key.into(), value.into());
        self
    }

    pub fn props(mut self, props: Attributes) -> Self {
        self.record.props = props;
        self
    }

    pub fn style(mut self, style: Attributes) -> Self {
        self.record.style = Some(style);
        self
    }

    pub fn form_config(mut self, form_config: FormConfig) -> Self {
        self.record.form_config = Some(form_config);
        self
    }

    pub fn render_ref(mut self, render_ref: Value) -> Self {
        self.record.render_ref = Some(render_ref);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.record.visible = visible;
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.record.locked = locked;
        self
    }

    /// Override metadata. `None` models records persisted before metadata existed.
    pub fn metadata(mut self, metadata: Option<BlockMetadata>) -> Self {
        self.record.metadata = metadata;
        self
    }

    pub fn parent(mut self, parent: impl Into<BlockId>) -> Self {
        self.record.parent = Some(parent.into());
        self
    }

    pub fn child(mut self, child: BlockRecord) -> Self {
        self.record.children.push(child);
        self
    }

    pub fn build(self) -> BlockRecord {
        self.record
    }
}
