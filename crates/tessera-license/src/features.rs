//! Per-tier capability tables and license-aware field filtering.

use std::str::FromStr;

use serde::Serialize;
use strum::EnumString;
use tessera_types::{FieldDefinition, FieldType};

use crate::license::License;
use crate::tier::LicenseTier;

/// A capability gated by tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, EnumString)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum Feature {
    CustomFields,
    ApiSelectFields,
    UnlimitedBlockTypes,
    AdvancedSpacing,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::CustomFields,
        Feature::ApiSelectFields,
        Feature::UnlimitedBlockTypes,
        Feature::AdvancedSpacing,
    ];

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::CustomFields => "customFields",
            Feature::ApiSelectFields => "apiSelectFields",
            Feature::UnlimitedBlockTypes => "unlimitedBlockTypes",
            Feature::AdvancedSpacing => "advancedSpacing",
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tier's capability table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    pub custom_fields: bool,
    pub api_select_fields: bool,
    pub unlimited_block_types: bool,
    pub advanced_spacing: bool,
}

impl FeatureSet {
    pub const FREE: FeatureSet = FeatureSet {
        custom_fields: false,
        api_select_fields: false,
        unlimited_block_types: false,
        advanced_spacing: false,
    };

    pub const PRO: FeatureSet = FeatureSet {
        custom_fields: true,
        api_select_fields: true,
        unlimited_block_types: true,
        advanced_spacing: true,
    };

    pub const fn for_tier(tier: LicenseTier) -> FeatureSet {
        match tier {
            LicenseTier::Free => FeatureSet::FREE,
            LicenseTier::Pro => FeatureSet::PRO,
        }
    }

    pub fn has(&self, feature: Feature) -> bool {
        match feature {
            Feature::CustomFields => self.custom_fields,
            Feature::ApiSelectFields => self.api_select_fields,
            Feature::UnlimitedBlockTypes => self.unlimited_block_types,
            Feature::AdvancedSpacing => self.advanced_spacing,
        }
    }
}

/// Option key on a spacing field that declares its own breakpoints.
pub const CUSTOM_BREAKPOINTS_OPTION: &str = "breakpoints";

/// The feature a field definition needs, if any.
pub fn required_feature(field: &FieldDefinition) -> Option<Feature> {
    match field.field_type {
        FieldType::Custom => Some(Feature::CustomFields),
        FieldType::ApiSelect => Some(Feature::ApiSelectFields),
        FieldType::Spacing if field.options.contains_key(CUSTOM_BREAKPOINTS_OPTION) => {
            Some(Feature::AdvancedSpacing)
        }
        _ => None,
    }
}

/// Answers capability questions against the license's current tier.
///
/// Holds no tier of its own, so answers track every verification.
#[derive(Clone, Debug)]
pub struct LicenseFeatureChecker {
    license: License,
}

impl LicenseFeatureChecker {
    pub fn new(license: License) -> Self {
        Self { license }
    }

    pub fn features(&self) -> FeatureSet {
        FeatureSet::for_tier(self.license.tier())
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features().has(feature)
    }

    /// Drop field definitions whose type needs a feature the tier lacks.
    /// Repeater sub-fields are filtered the same way at every depth.
    pub fn filter_fields_by_license(&self, fields: &[FieldDefinition]) -> Vec<FieldDefinition> {
        filter_fields(&self.features(), fields)
    }
}

fn filter_fields(features: &FeatureSet, fields: &[FieldDefinition]) -> Vec<FieldDefinition> {
    fields
        .iter()
        .filter(|field| required_feature(field).is_none_or(|f| features.has(f)))
        .map(|field| {
            let mut field = field.clone();
            if field.is_repeater() {
                field.fields = filter_fields(features, &field.fields);
            }
            field
        })
        .collect()
}
