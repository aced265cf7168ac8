//! The block entity: controlled mutation and metadata versioning.
//!
//! [`Block`] owns its record outright. Getters for maps and lists return
//! copies, so nothing outside the entity can change its state without going
//! through a mutator, and every mutator records itself in the metadata.

use serde_json::Value;
use tessera_spacing::SpacingData;
use tessera_types::{
    Attributes, BlockId, BlockMetadata, BlockRecord, FormConfig, SPACING_PROP,
};

/// A block record under controlled mutation.
///
/// Invariants:
/// - `metadata.version` goes up by exactly one per semantic mutation
/// - `metadata.updated_at` never decreases
/// - no mutator fails or panics; lock state is advisory (see [`Block::can_edit`])
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    record: BlockRecord,
}

impl Block {
    /// Take ownership of a record.
    pub fn new(record: BlockRecord) -> Self {
        Self { record }
    }

    /// Copy a caller-owned record; later changes to `record` do not reach the block.
    pub fn from_record(record: &BlockRecord) -> Self {
        Self {
            record: record.clone(),
        }
    }

    // ── Identity and flags ──────────────────────────────────────────────

    pub fn id(&self) -> &BlockId {
        &self.record.id
    }

    pub fn block_type(&self) -> &str {
        &self.record.block_type
    }

    pub fn parent(&self) -> Option<&BlockId> {
        self.record.parent.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.record.locked
    }

    pub fn is_visible(&self) -> bool {
        self.record.visible
    }

    pub fn metadata(&self) -> Option<BlockMetadata> {
        self.record.metadata
    }

    pub fn version(&self) -> Option<u32> {
        self.record.metadata.map(|m| m.version)
    }

    // ── Copy-on-read getters ────────────────────────────────────────────

    pub fn settings(&self) -> Attributes {
        self.record.settings.clone()
    }

    pub fn props(&self) -> Attributes {
        self.record.props.clone()
    }

    pub fn style(&self) -> Option<Attributes> {
        self.record.style.clone()
    }

    pub fn children(&self) -> Vec<BlockRecord> {
        self.record.children.clone()
    }

    pub fn form_config(&self) -> Option<FormConfig> {
        self.record.form_config.clone()
    }

    pub fn render_ref(&self) -> Option<Value> {
        self.record.render_ref.clone()
    }

    /// Props as the rendering collaborator sees them: everything except the
    /// spacing data, which the spacing engine turns into styles instead.
    pub fn props_for_render(&self) -> Attributes {
        self.record
            .props
            .iter()
            .filter(|(key, _)| key.as_str() != SPACING_PROP)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Responsive spacing stored under the `spacing` prop. Absent or malformed
    /// data reads as empty (every breakpoint inherits).
    pub fn spacing(&self) -> SpacingData {
        SpacingData::from_prop(self.record.props.get(SPACING_PROP))
    }

    // ── Mutators ────────────────────────────────────────────────────────

    /// Shallow-merge `partial` into `settings`.
    pub fn update_settings(&mut self, partial: Attributes) {
        self.record.settings.extend(partial);
        self.touch();
    }

    /// Shallow-merge `partial` into `props`.
    pub fn update_props(&mut self, partial: Attributes) {
        self.record.props.extend(partial);
        self.touch();
    }

    /// Shallow-merge `partial` into `style`, creating it if absent.
    pub fn update_style(&mut self, partial: Attributes) {
        self.record
            .style
            .get_or_insert_with(Attributes::new)
            .extend(partial);
        self.touch();
    }

    /// Replace the form config wholesale.
    pub fn update_form_config(&mut self, form_config: FormConfig) {
        self.record.form_config = Some(form_config);
        self.touch();
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.record.locked = locked;
        self.touch();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.record.visible = visible;
        self.touch();
    }

    /// Append a nested child. The child's `parent` is pointed at this block.
    pub fn add_child(&mut self, mut child: BlockRecord) {
        child.parent = Some(self.record.id.clone());
        self.record.children.push(child);
        self.touch();
    }

    /// Remove the first child with `id`. Returns whether one was removed; the
    /// metadata only changes when something was.
    pub fn remove_child(&mut self, id: &BlockId) -> bool {
        let Some(pos) = self.record.children.iter().position(|c| &c.id == id) else {
            return false;
        };
        self.record.children.remove(pos);
        self.touch();
        true
    }

    pub fn has_child(&self, id: &BlockId) -> bool {
        self.record.children.iter().any(|c| &c.id == id)
    }

    // ── Policy ──────────────────────────────────────────────────────────

    /// Editable only when unlocked and visible.
    pub fn can_edit(&self) -> bool {
        !self.record.locked && self.record.visible
    }

    /// Deletable whenever unlocked; visibility does not matter.
    pub fn can_delete(&self) -> bool {
        !self.record.locked
    }

    // ── Copies out ──────────────────────────────────────────────────────

    /// Independent copy under `new_id` with version 1 and timestamps strictly
    /// later than anything recorded on the source.
    pub fn clone_with_id(&self, new_id: impl Into<BlockId>) -> Block {
        let mut record = self.record.clone();
        record.id = new_id.into();
        let floor = self
            .record
            .metadata
            .map(|m| m.created_at.max(m.updated_at))
            .unwrap_or(0);
        record.metadata = Some(BlockMetadata::fresh_after(floor));
        tracing::debug!(source = %self.record.id, clone = %record.id, "cloned block");
        Block { record }
    }

    /// Snapshot for persistence.
    pub fn to_record(&self) -> BlockRecord {
        self.record.clone()
    }

    pub fn into_record(self) -> BlockRecord {
        self.record
    }

    /// Shared metadata step: initialize if absent, otherwise advance.
    fn touch(&mut self) {
        match self.record.metadata.as_mut() {
            Some(meta) => meta.touch(),
            None => self.record.metadata = Some(BlockMetadata::fresh()),
        }
    }
}

impl From<BlockRecord> for Block {
    fn from(record: BlockRecord) -> Self {
        Self::new(record)
    }
}
