//! License service: the single licensing entry point the editor talks to.

use std::sync::Arc;

use tessera_types::{BlockRecord, FieldDefinition};
use tracing::debug;

use crate::error::LicenseError;
use crate::features::{Feature, FeatureSet, LicenseFeatureChecker};
use crate::license::License;
use crate::observers::{LicenseCallback, Unsubscribe};
use crate::tier::{BlockTypeLimit, LicenseConfig, LicenseTier};
use crate::transport::VerificationTransport;

/// Composes a [`License`] and its [`LicenseFeatureChecker`].
#[derive(Clone, Debug)]
pub struct LicenseService {
    license: License,
    features: LicenseFeatureChecker,
}

impl LicenseService {
    pub fn new(license: License) -> Self {
        let features = LicenseFeatureChecker::new(license.clone());
        Self { license, features }
    }

    pub fn from_config(
        config: LicenseConfig,
        transport: Arc<dyn VerificationTransport>,
    ) -> Result<Self, LicenseError> {
        Ok(Self::new(License::new(config, transport)?))
    }

    pub fn license(&self) -> &License {
        &self.license
    }

    pub fn tier(&self) -> LicenseTier {
        self.license.tier()
    }

    pub async fn verify_key(&self, key: &str) -> LicenseTier {
        self.license.verify_key(key).await
    }

    pub fn can_add_block_type(&self, current_count: usize) -> bool {
        self.license.can_add_block_type(current_count)
    }

    pub fn remaining_block_type_slots(&self, current_count: usize) -> BlockTypeLimit {
        self.license.remaining_block_type_slots(current_count)
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.has_feature(feature)
    }

    pub fn features(&self) -> FeatureSet {
        self.features.features()
    }

    pub fn filter_fields_by_license(&self, fields: &[FieldDefinition]) -> Vec<FieldDefinition> {
        self.features.filter_fields_by_license(fields)
    }

    /// Block types usable under the current tier.
    ///
    /// PRO gets `all_types` unchanged. FREE gets the first `max_block_types`
    /// entries, so earlier-declared types win.
    pub fn get_allowed_block_types(&self, all_types: &[String]) -> Vec<String> {
        match self.license.block_type_limit() {
            BlockTypeLimit::Unlimited => all_types.to_vec(),
            BlockTypeLimit::Limited(max) => {
                if all_types.len() > max {
                    debug!(available = all_types.len(), max, "truncating block types to license limit");
                }
                all_types.iter().take(max).cloned().collect()
            }
        }
    }

    /// PRO keeps every block; FREE keeps blocks whose type is in `allowed_types`.
    pub fn filter_blocks_by_license(
        &self,
        blocks: &[BlockRecord],
        allowed_types: &[String],
    ) -> Vec<BlockRecord> {
        if self.license.is_pro() {
            return blocks.to_vec();
        }
        blocks
            .iter()
            .filter(|b| allowed_types.iter().any(|t| *t == b.block_type))
            .cloned()
            .collect()
    }

    /// Observe tier transitions; see [`License::on_change`].
    pub fn on_license_change(&self, callback: LicenseCallback) -> Unsubscribe {
        self.license.on_change(callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::tests::MockTransport;
    use crate::observers::LicenseChange;
    use parking_lot::Mutex;

    fn types(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn blocks() -> Vec<BlockRecord> {
        vec![
            BlockRecord::new("1", "text"),
            BlockRecord::new("2", "image"),
            BlockRecord::new("3", "button"),
            BlockRecord::new("4", "text"),
        ]
    }

    #[test]
    fn test_free_limit_scenario() {
        let service = LicenseService::from_config(
            LicenseConfig::free().with_max_block_types(2),
            MockTransport::failing(),
        )
        .unwrap();

        let allowed = service.get_allowed_block_types(&types(&["text", "image", "button"]));
        assert_eq!(allowed, types(&["text", "image"]));

        let kept = service.filter_blocks_by_license(&blocks(), &allowed);
        let ids: Vec<_> = kept.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
    }

    #[test]
    fn test_pro_passes_through() {
        let service = LicenseService::from_config(LicenseConfig::pro("k"), MockTransport::failing()).unwrap();
        let all = types(&["a", "b", "c", "d", "e", "f", "g"]);
        assert_eq!(service.get_allowed_block_types(&all), all);
        assert_eq!(service.filter_blocks_by_license(&blocks(), &[]).len(), 4);
        assert!(service.has_feature(Feature::UnlimitedBlockTypes));
    }

    #[test]
    fn test_under_limit_keeps_all() {
        let service = LicenseService::from_config(LicenseConfig::free(), MockTransport::failing()).unwrap();
        let all = types(&["text", "image"]);
        assert_eq!(service.get_allowed_block_types(&all), all);
        assert_eq!(service.remaining_block_type_slots(2), BlockTypeLimit::Limited(3));
    }

    #[test]
    fn test_invalid_config() {
        let err = LicenseService::from_config(
            LicenseConfig::free().with_max_block_types(-1),
            MockTransport::failing(),
        )
        .unwrap_err();
        assert_eq!(err, LicenseError::InvalidMaxBlockTypes(-1));
    }

    #[tokio::test]
    async fn test_upgrade_lifts_limits_and_notifies() {
        let service = LicenseService::from_config(
            LicenseConfig::free().with_max_block_types(1),
            MockTransport::answering(true, "PRO"),
        )
        .unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = service.on_license_change(Arc::new(move |c: &LicenseChange| sink.lock().push(c.current)));

        let all = types(&["text", "image"]);
        assert_eq!(service.get_allowed_block_types(&all).len(), 1);
        assert!(!service.can_add_block_type(1));

        assert_eq!(service.verify_key("key").await, LicenseTier::Pro);
        assert_eq!(service.get_allowed_block_types(&all).len(), 2);
        assert!(service.can_add_block_type(1));
        assert_eq!(*seen.lock(), vec![LicenseTier::Pro]);

        assert!(sub.unsubscribe());
        assert_eq!(service.license().observer_count(), 0);
    }
}
