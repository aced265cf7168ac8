//! Tiers, license configuration, and block-type limits.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::error::LicenseError;

/// Block-type limit of a FREE license configured without one.
pub const DEFAULT_FREE_MAX_BLOCK_TYPES: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum LicenseTier {
    #[default]
    Free,
    Pro,
}

impl LicenseTier {
    /// Case-insensitive parse (`pro`, `PRO`, `Pro`).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s.trim()).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseTier::Free => "FREE",
            LicenseTier::Pro => "PRO",
        }
    }
}

impl std::fmt::Display for LicenseTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static license configuration handed over at editor start-up.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseConfig {
    /// Initial tier; FREE when absent.
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub tier: Option<LicenseTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Explicit block-type limit. Must be positive when present.
    #[serde(default, alias = "max_block_types", skip_serializing_if = "Option::is_none")]
    pub max_block_types: Option<i64>,
}

impl LicenseConfig {
    pub fn free() -> Self {
        Self::default()
    }

    pub fn pro(key: impl Into<String>) -> Self {
        Self {
            tier: Some(LicenseTier::Pro),
            key: Some(key.into()),
            max_block_types: None,
        }
    }

    pub fn with_max_block_types(mut self, max: i64) -> Self {
        self.max_block_types = Some(max);
        self
    }

    /// The explicit limit, checked.
    pub fn explicit_max_block_types(&self) -> Result<Option<usize>, LicenseError> {
        match self.max_block_types {
            None => Ok(None),
            Some(max) if max <= 0 => Err(LicenseError::InvalidMaxBlockTypes(max)),
            Some(max) => Ok(Some(usize::try_from(max).unwrap_or(usize::MAX))),
        }
    }
}

/// How many block types may be used (or remain).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockTypeLimit {
    Unlimited,
    Limited(usize),
}

impl BlockTypeLimit {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, BlockTypeLimit::Unlimited)
    }

    /// `None` for unlimited.
    pub fn as_count(&self) -> Option<usize> {
        match self {
            BlockTypeLimit::Unlimited => None,
            BlockTypeLimit::Limited(n) => Some(*n),
        }
    }

    /// Whether `count` types fit under this limit with room for one more.
    pub fn allows(&self, count: usize) -> bool {
        match self {
            BlockTypeLimit::Unlimited => true,
            BlockTypeLimit::Limited(max) => count < *max,
        }
    }
}
