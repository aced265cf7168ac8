//! Editor configuration.
//!
//! Read from RON (the default) or TOML, chosen by file extension. Every
//! section has defaults, so an empty file is a valid configuration.
//!
//! ```ron
//! (
//!     license: (tier: Some(FREE), maxBlockTypes: Some(3)),
//!     spacing: (max: 120, step: 8),
//!     block_types: ["text", "image", "button"],
//! )
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tessera_license::{DEFAULT_VERIFICATION_ENDPOINT, LicenseConfig, LicenseError};
use tessera_spacing::{SpacingConfig, SpacingError};
use tessera_telemetry::LogConfig;
use thiserror::Error;
use tracing::debug;

/// Catalog used when the config does not list block types.
pub const DEFAULT_BLOCK_TYPES: &[&str] = &["text", "heading", "image", "button", "columns", "cards", "spacer"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid spacing config: {0}")]
    Spacing(#[from] SpacingError),

    #[error("invalid license config: {0}")]
    License(#[from] LicenseError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_endpoint() -> String {
    DEFAULT_VERIFICATION_ENDPOINT.to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

fn default_block_types() -> Vec<String> {
    DEFAULT_BLOCK_TYPES.iter().map(|s| s.to_string()).collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub license: LicenseConfig,
    pub verification: VerificationConfig,
    pub spacing: SpacingConfig,
    /// Host block-type catalog, in priority order.
    pub block_types: Vec<String>,
    pub log: LogConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            license: LicenseConfig::default(),
            verification: VerificationConfig::default(),
            spacing: SpacingConfig::default(),
            block_types: default_block_types(),
            log: LogConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Read and validate a config file. `.toml` files are TOML; anything
    /// else is RON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        let config = if is_toml {
            Self::from_toml_str(&text)?
        } else {
            Self::from_ron_str(&text)?
        };

        config.validate()?;
        debug!(path = %path.display(), block_types = config.block_types.len(), "loaded editor config");
        Ok(config)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reject configurations no runtime default can repair.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.spacing.validate()?;
        self.license.explicit_max_block_types()?;

        if self.verification.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("verification endpoint is empty".into()));
        }

        let mut seen = HashSet::new();
        for block_type in &self.block_types {
            if block_type.trim().is_empty() {
                return Err(ConfigError::Invalid("empty block type name".into()));
            }
            if !seen.insert(block_type.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate block type: {block_type}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tessera_license::LicenseTier;

    #[test]
    fn test_empty_ron_is_default() {
        let config = EditorConfig::from_ron_str("()").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.verification.endpoint, DEFAULT_VERIFICATION_ENDPOINT);
        assert_eq!(config.spacing.max, 200);
    }

    #[test]
    fn test_ron_sections() {
        let config = EditorConfig::from_ron_str(
            r#"(
                license: (tier: Some(PRO), key: Some("abc")),
                spacing: (max: 120, step: 8),
                block_types: ["text", "image"],
                log: (filter: "debug"),
            )"#,
        )
        .unwrap();
        assert_eq!(config.license.tier, Some(LicenseTier::Pro));
        assert_eq!(config.spacing.max, 120);
        assert_eq!(config.spacing.min, 0);
        assert_eq!(config.spacing.breakpoints.len(), 3);
        assert_eq!(config.block_types, vec!["text", "image"]);
        assert_eq!(config.log.filter, "debug");
    }

    #[test]
    fn test_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
block_types = ["text", "button"]

[license]
type = "FREE"
maxBlockTypes = 1

[spacing]
step = 2

[[spacing.breakpoints]]
name = "wide"

[[spacing.breakpoints]]
name = "narrow"
maxWidth = 600
"#
        )
        .unwrap();

        let config = EditorConfig::load(file.path()).unwrap();
        assert_eq!(config.license.max_block_types, Some(1));
        assert_eq!(config.spacing.step, 2);
        assert_eq!(config.spacing.breakpoints[1].max_width, Some(600));
    }

    #[test]
    fn test_ron_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.ron");
        std::fs::write(&path, r#"(block_types: ["hero"])"#).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap().block_types, vec!["hero"]);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            EditorConfig::load(dir.path().join("missing.ron")),
            Err(ConfigError::Io { .. })
        ));

        let bad = dir.path().join("bad.ron");
        std::fs::write(&bad, "(block_types: [").unwrap();
        assert!(matches!(EditorConfig::load(&bad), Err(ConfigError::Ron(_))));

        let bad_toml = dir.path().join("bad.toml");
        std::fs::write(&bad_toml, "block_types = [").unwrap();
        assert!(matches!(EditorConfig::load(&bad_toml), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_validation() {
        let mut config = EditorConfig::default();
        config.spacing.min = 50;
        config.spacing.max = 10;
        assert!(matches!(config.validate(), Err(ConfigError::Spacing(_))));

        let mut config = EditorConfig::default();
        config.license.max_block_types = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::License(_))));

        let mut config = EditorConfig::default();
        config.block_types = vec!["text".into(), "text".into()];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = EditorConfig::default();
        config.verification.endpoint = " ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
