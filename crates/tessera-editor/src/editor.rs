//! The editor facade.
//!
//! Everything a host does to blocks goes through [`Editor`]: license gating
//! on insert, validate-then-commit on edit, lock and visibility policy, and
//! the computed views (tree, render props, spacing styles).

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tessera_blocks::{Block, build_block_hierarchy, get_all_children};
use tessera_license::{
    HttpVerificationTransport, LicenseCallback, LicenseService, LicenseTier, Unsubscribe,
    VerificationTransport,
};
use tessera_spacing::{
    BreakpointStyles, BreakpointWatchers, DEFAULT_FIELD_NAME, SpacingData, StyleTarget,
    ViewportWatcher, compute_breakpoint_styles, generate_spacing_css, generate_spacing_css_variables,
    get_current_breakpoint,
};
use tessera_types::{Attributes, BlockId, BlockMetadata, BlockRecord, BlockRecordBuilder, SPACING_PROP};
use tessera_validation::{ValidationResult, validate_form};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::error::{EditorError, Result};
use crate::repository::BlockRepository;

pub struct Editor {
    config: EditorConfig,
    license: LicenseService,
    repository: Arc<dyn BlockRepository>,
    watchers: BreakpointWatchers,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("tier", &self.license.tier())
            .field("block_types", &self.config.block_types)
            .field("watches", &self.watchers.len())
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Validate `config` and start a license session on `transport`.
    pub fn new(
        config: EditorConfig,
        transport: Arc<dyn VerificationTransport>,
        repository: Arc<dyn BlockRepository>,
    ) -> Result<Self> {
        config.validate()?;
        let license = LicenseService::from_config(config.license.clone(), transport)?;
        info!(
            tier = %license.tier(),
            block_types = config.block_types.len(),
            "editor started"
        );
        Ok(Self {
            config,
            license,
            repository,
            watchers: BreakpointWatchers::new(),
        })
    }

    /// [`Editor::new`] verifying against the configured HTTP endpoint.
    pub fn with_http_transport(config: EditorConfig, repository: Arc<dyn BlockRepository>) -> Result<Self> {
        let transport = Arc::new(HttpVerificationTransport::new(config.verification.endpoint.clone()));
        Self::new(config, transport, repository)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn license(&self) -> &LicenseService {
        &self.license
    }

    pub fn repository(&self) -> &Arc<dyn BlockRepository> {
        &self.repository
    }

    pub fn watchers(&self) -> &BreakpointWatchers {
        &self.watchers
    }

    // ── License ─────────────────────────────────────────────────────────

    #[tracing::instrument(skip(self, key), name = "editor.verify_key")]
    pub async fn verify_key(&self, key: &str) -> LicenseTier {
        self.license.verify_key(key).await
    }

    pub fn on_license_change(&self, callback: LicenseCallback) -> Unsubscribe {
        self.license.on_license_change(callback)
    }

    /// The configured catalog, truncated to the tier's limit.
    pub fn allowed_block_types(&self) -> Vec<String> {
        self.license.get_allowed_block_types(&self.config.block_types)
    }

    // ── Insert ──────────────────────────────────────────────────────────

    /// Add a root block of `block_type` under a fresh id.
    #[tracing::instrument(skip(self, props), name = "editor.add_block")]
    pub async fn add_block(&self, block_type: &str, props: Attributes) -> Result<BlockRecord> {
        let record = BlockRecordBuilder::new(new_block_id(), block_type).props(props).build();
        self.insert_block(record).await
    }

    /// Add a block under `parent`. The parent must exist and be editable.
    #[tracing::instrument(skip(self, props), name = "editor.add_child_block")]
    pub async fn add_child_block(
        &self,
        parent: &BlockId,
        block_type: &str,
        props: Attributes,
    ) -> Result<BlockRecord> {
        let parent_block = self.block(parent).await?;
        ensure_editable(&parent_block)?;
        let record = BlockRecordBuilder::new(new_block_id(), block_type)
            .props(props)
            .parent(parent.clone())
            .build();
        self.insert_block(record).await
    }

    /// Store a host-built record (e.g. from a template carrying a form
    /// config) under the same gating as [`Editor::add_block`].
    #[tracing::instrument(skip(self, record), fields(id = %record.id, block_type = %record.block_type), name = "editor.insert_block")]
    pub async fn insert_block(&self, mut record: BlockRecord) -> Result<BlockRecord> {
        self.check_block_type(&record.block_type).await?;
        normalize_spacing(&mut record.props, &self.config);
        if record.metadata.is_none() {
            record.metadata = Some(BlockMetadata::fresh());
        }
        self.repository.create(record.clone()).await?;
        debug!("block added");
        Ok(record)
    }

    /// Reject types outside the allowed catalog, and new types once the
    /// tier's distinct-type budget is spent.
    async fn check_block_type(&self, block_type: &str) -> Result<()> {
        if !self.allowed_block_types().iter().any(|t| t == block_type) {
            return Err(EditorError::BlockTypeNotAllowed(block_type.to_string()));
        }

        let records = self.repository.get_all().await?;
        let in_use: HashSet<&str> = records.iter().map(|r| r.block_type.as_str()).collect();
        if in_use.contains(block_type) || self.license.can_add_block_type(in_use.len()) {
            return Ok(());
        }
        let limit = self
            .license
            .license()
            .block_type_limit()
            .as_count()
            .unwrap_or(in_use.len());
        Err(EditorError::BlockTypeLimitReached { limit })
    }

    // ── Edit ────────────────────────────────────────────────────────────

    /// Validate `data` merged over the current settings, then commit.
    ///
    /// Only form fields the license exposes are validated. On failure the
    /// stored block is untouched and the per-field messages come back in
    /// [`EditorError::Validation`].
    #[tracing::instrument(skip(self, data), name = "editor.update_block_settings")]
    pub async fn update_block_settings(&self, id: &BlockId, data: Attributes) -> Result<BlockRecord> {
        let mut block = self.block(id).await?;
        ensure_editable(&block)?;

        let result = self.validate_settings(&block, &data);
        if !result.is_valid {
            debug!(errors = result.error_count(), "settings rejected");
            return Err(EditorError::Validation(result));
        }

        block.update_settings(data);
        self.commit(block).await
    }

    /// Validation outcome for `data` merged over the block's settings.
    pub fn validate_settings(&self, block: &Block, data: &Attributes) -> ValidationResult {
        let Some(form_config) = block.form_config() else {
            return ValidationResult::new();
        };
        let fields = self.license.filter_fields_by_license(&form_config.fields);
        let mut merged = block.settings();
        merged.extend(data.iter().map(|(k, v)| (k.clone(), v.clone())));
        validate_form(&merged, &fields)
    }

    /// Shallow-merge props. A `spacing` entry is normalized to the
    /// configured range and step.
    #[tracing::instrument(skip(self, props), name = "editor.update_block_props")]
    pub async fn update_block_props(&self, id: &BlockId, mut props: Attributes) -> Result<BlockRecord> {
        let mut block = self.block(id).await?;
        ensure_editable(&block)?;
        normalize_spacing(&mut props, &self.config);
        block.update_props(props);
        self.commit(block).await
    }

    #[tracing::instrument(skip(self), name = "editor.set_block_visible")]
    pub async fn set_block_visible(&self, id: &BlockId, visible: bool) -> Result<BlockRecord> {
        let mut block = self.block(id).await?;
        if block.is_locked() {
            return Err(EditorError::Locked(id.clone()));
        }
        block.set_visible(visible);
        self.commit(block).await
    }

    /// Locking is always allowed; it is how a locked block gets unlocked.
    #[tracing::instrument(skip(self), name = "editor.set_block_locked")]
    pub async fn set_block_locked(&self, id: &BlockId, locked: bool) -> Result<BlockRecord> {
        let mut block = self.block(id).await?;
        block.set_locked(locked);
        self.commit(block).await
    }

    /// Delete a block and its descendants. Returns the removed ids, the
    /// block itself first.
    ///
    /// Fails without removing anything if the block or any descendant is
    /// locked.
    #[tracing::instrument(skip(self), name = "editor.delete_block")]
    pub async fn delete_block(&self, id: &BlockId) -> Result<Vec<BlockId>> {
        let records = self.repository.get_all().await?;
        let record = records
            .iter()
            .find(|r| &r.id == id)
            .ok_or_else(|| EditorError::BlockNotFound(id.clone()))?;

        let descendants = get_all_children(record, &records);
        if let Some(locked) = std::iter::once(record).chain(descendants.iter().copied()).find(|r| r.locked) {
            return Err(EditorError::Locked(locked.id.clone()));
        }

        let mut removed = Vec::with_capacity(descendants.len() + 1);
        for target in std::iter::once(record).chain(descendants) {
            if self.repository.delete(&target.id).await? {
                removed.push(target.id.clone());
            }
        }
        debug!(removed = removed.len(), "block deleted");
        Ok(removed)
    }

    async fn commit(&self, block: Block) -> Result<BlockRecord> {
        let record = block.into_record();
        self.repository.update(record.clone()).await?;
        Ok(record)
    }

    // ── Read ────────────────────────────────────────────────────────────

    pub async fn block(&self, id: &BlockId) -> Result<Block> {
        self.repository
            .get(id)
            .await?
            .map(Block::new)
            .ok_or_else(|| EditorError::BlockNotFound(id.clone()))
    }

    /// Every stored block as a forest.
    pub async fn hierarchy(&self) -> Result<Vec<BlockRecord>> {
        Ok(build_block_hierarchy(&self.repository.get_all().await?))
    }

    /// Blocks the canvas shows: licensed types only, hidden ones dropped.
    pub async fn visible_blocks(&self) -> Result<Vec<BlockRecord>> {
        let records = self.repository.get_all().await?;
        let allowed = self.allowed_block_types();
        Ok(self
            .license
            .filter_blocks_by_license(&records, &allowed)
            .into_iter()
            .filter(|r| r.visible)
            .collect())
    }

    /// Props handed to the block's renderer.
    pub async fn render_props(&self, id: &BlockId) -> Result<Attributes> {
        Ok(self.block(id).await?.props_for_render())
    }

    // ── Spacing ─────────────────────────────────────────────────────────

    /// Spacing styles for the block at viewport `width`.
    pub async fn block_styles(&self, id: &BlockId, width: u32) -> Result<BreakpointStyles> {
        let block = self.block(id).await?;
        let breakpoints = &self.config.spacing.breakpoints;
        let breakpoint = get_current_breakpoint(width, breakpoints);
        Ok(compute_breakpoint_styles(
            &block.spacing(),
            DEFAULT_FIELD_NAME,
            breakpoint,
            breakpoints,
        ))
    }

    /// Static stylesheet for the block's spacing under `selector`.
    pub async fn block_css(&self, id: &BlockId, selector: &str) -> Result<String> {
        let block = self.block(id).await?;
        Ok(generate_spacing_css(&block.spacing(), selector, &self.config.spacing.breakpoints))
    }

    pub async fn block_css_variables(&self, id: &BlockId) -> Result<IndexMap<String, String>> {
        let block = self.block(id).await?;
        Ok(generate_spacing_css_variables(
            &block.spacing(),
            DEFAULT_FIELD_NAME,
            &self.config.spacing.breakpoints,
        ))
    }

    /// Keep `target` styled for the block's spacing as the viewport moves.
    /// Returns the breakpoint applied immediately.
    pub async fn watch_block(
        &self,
        target: Arc<dyn StyleTarget>,
        id: &BlockId,
        watcher: &dyn ViewportWatcher,
    ) -> Result<String> {
        let spacing = self.block(id).await?.spacing();
        Ok(self.watchers.watch(
            target,
            spacing,
            DEFAULT_FIELD_NAME,
            self.config.spacing.breakpoints.clone(),
            watcher,
        ))
    }

    pub fn unwatch_block(&self, element: &str) -> bool {
        self.watchers.unwatch(element, DEFAULT_FIELD_NAME)
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.watchers.clear();
    }
}

fn new_block_id() -> BlockId {
    BlockId::new(Uuid::now_v7().to_string())
}

fn ensure_editable(block: &Block) -> Result<()> {
    if block.is_locked() {
        return Err(EditorError::Locked(block.id().clone()));
    }
    if !block.is_visible() {
        return Err(EditorError::Hidden(block.id().clone()));
    }
    Ok(())
}

fn normalize_spacing(props: &mut Attributes, config: &EditorConfig) {
    let Some(spacing) = props.get(SPACING_PROP).map(|v| SpacingData::from_prop(Some(v))) else {
        return;
    };
    props.insert(SPACING_PROP.to_string(), spacing.normalized(&config.spacing).to_value());
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use tessera_license::{LicenseConfig, TransportError, VerificationResponse};
    use tessera_types::{FieldDefinition, FieldType, FormConfig, ValidationRule};

    use crate::repository::MemoryBlockRepository;

    struct FixedTransport(VerificationResponse);

    #[async_trait]
    impl VerificationTransport for FixedTransport {
        async fn verify(&self, _key: &str) -> std::result::Result<VerificationResponse, TransportError> {
            Ok(self.0.clone())
        }
    }

    fn editor(license: LicenseConfig, block_types: &[&str]) -> Editor {
        let config = EditorConfig {
            license,
            block_types: block_types.iter().map(|s| s.to_string()).collect(),
            ..EditorConfig::default()
        };
        let transport = Arc::new(FixedTransport(VerificationResponse::new(true, "pro")));
        Editor::new(config, transport, Arc::new(MemoryBlockRepository::new())).unwrap()
    }

    fn props(value: serde_json::Value) -> Attributes {
        value.as_object().cloned().unwrap_or_default()
    }

    // ── Gating ──────────────────────────────────────────────────────────

    #[test]
    fn test_invalid_config_rejected() {
        let config = EditorConfig {
            license: LicenseConfig::free().with_max_block_types(-1),
            ..EditorConfig::default()
        };
        let transport = Arc::new(FixedTransport(VerificationResponse::new(false, "free")));
        let err = Editor::new(config, transport, Arc::new(MemoryBlockRepository::new())).unwrap_err();
        assert!(matches!(err, EditorError::Config(_)));
    }

    #[tokio::test]
    async fn test_free_tier_truncates_catalog() {
        let editor = editor(LicenseConfig::free().with_max_block_types(2), &["text", "image", "button"]);
        assert_eq!(editor.allowed_block_types(), vec!["text", "image"]);

        editor.add_block("text", Attributes::new()).await.unwrap();
        editor.add_block("text", Attributes::new()).await.unwrap();
        editor.add_block("image", Attributes::new()).await.unwrap();
        let err = editor.add_block("button", Attributes::new()).await.unwrap_err();
        assert!(matches!(err, EditorError::BlockTypeNotAllowed(t) if t == "button"));
    }

    #[tokio::test]
    async fn test_verification_unlocks_catalog() {
        let editor = editor(LicenseConfig::free().with_max_block_types(1), &["text", "image"]);
        assert!(editor.add_block("image", Attributes::new()).await.is_err());

        assert_eq!(editor.verify_key("k").await, LicenseTier::Pro);
        assert_eq!(editor.allowed_block_types().len(), 2);
        editor.add_block("image", Attributes::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_new_block_ids_and_metadata() {
        let editor = editor(LicenseConfig::pro("k"), &["text"]);
        let a = editor.add_block("text", Attributes::new()).await.unwrap();
        let b = editor.add_block("text", Attributes::new()).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.metadata.map(|m| m.version), Some(1));
    }

    // ── Edit ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_validate_then_commit() {
        let editor = editor(LicenseConfig::pro("k"), &["hero"]);
        let record = BlockRecordBuilder::new("hero-1", "hero")
            .setting("title", "Welcome")
            .form_config(FormConfig::new(vec![
                FieldDefinition::new("title", FieldType::Text).with_rule(ValidationRule::required()),
                FieldDefinition::new("link", FieldType::Url).with_rule(ValidationRule::url()),
            ]))
            .build();
        let id = editor.insert_block(record).await.unwrap().id;

        let err = editor
            .update_block_settings(&id, props(json!({ "link": "nope" })))
            .await
            .unwrap_err();
        let result = err.validation().unwrap();
        assert!(result.has_errors_for("link"));
        assert!(!result.has_errors_for("title"), "title kept from current settings");

        let stored = editor.block(&id).await.unwrap();
        assert_eq!(stored.version(), Some(1));
        assert!(!stored.settings().contains_key("link"));

        let updated = editor
            .update_block_settings(&id, props(json!({ "link": "https://tessera.dev" })))
            .await
            .unwrap();
        assert_eq!(updated.metadata.map(|m| m.version), Some(2));
        assert_eq!(updated.settings["link"], "https://tessera.dev");
    }

    #[tokio::test]
    async fn test_locked_and_hidden_blocks() {
        let editor = editor(LicenseConfig::pro("k"), &["text"]);
        let id = editor.add_block("text", Attributes::new()).await.unwrap().id;

        editor.set_block_visible(&id, false).await.unwrap();
        assert!(matches!(
            editor.update_block_settings(&id, Attributes::new()).await,
            Err(EditorError::Hidden(_))
        ));

        editor.set_block_locked(&id, true).await.unwrap();
        assert!(matches!(editor.delete_block(&id).await, Err(EditorError::Locked(_))));
        assert!(matches!(
            editor.set_block_visible(&id, true).await,
            Err(EditorError::Locked(_))
        ));

        editor.set_block_locked(&id, false).await.unwrap();
        assert_eq!(editor.delete_block(&id).await.unwrap(), vec![id.clone()]);
        assert!(matches!(editor.block(&id).await, Err(EditorError::BlockNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_cascades_unless_descendant_locked() {
        let editor = editor(LicenseConfig::pro("k"), &["columns", "text"]);
        let root = editor.add_block("columns", Attributes::new()).await.unwrap().id;
        let child = editor.add_child_block(&root, "text", Attributes::new()).await.unwrap().id;
        let grandchild = editor.add_child_block(&child, "text", Attributes::new()).await.unwrap().id;

        editor.set_block_locked(&grandchild, true).await.unwrap();
        assert!(matches!(
            editor.delete_block(&root).await,
            Err(EditorError::Locked(locked)) if locked == grandchild
        ));
        assert_eq!(editor.hierarchy().await.unwrap().len(), 1);

        editor.set_block_locked(&grandchild, false).await.unwrap();
        let removed = editor.delete_block(&root).await.unwrap();
        assert_eq!(removed, vec![root, child, grandchild]);
    }

    // ── Spacing ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_spacing_normalized_and_hidden_from_render() {
        let editor = editor(LicenseConfig::pro("k"), &["text"]);
        let record = editor
            .add_block(
                "text",
                props(json!({
                    "content": "hi",
                    "spacing": { "desktop": { "padding-top": 41, "margin-top": 999 } }
                })),
            )
            .await
            .unwrap();

        let spacing = Block::new(record.clone()).spacing();
        let desktop = spacing.get("desktop").unwrap();
        assert_eq!(desktop.padding_top, Some(40));
        assert_eq!(desktop.margin_top, Some(200));

        let render = editor.render_props(&record.id).await.unwrap();
        assert!(render.contains_key("content"));
        assert!(!render.contains_key(SPACING_PROP));

        let styles = editor.block_styles(&record.id, 500).await.unwrap();
        assert_eq!(styles.breakpoint, "mobile");
        assert_eq!(styles.margins.get("margin-top").map(String::as_str), Some("200px"));
    }
}
