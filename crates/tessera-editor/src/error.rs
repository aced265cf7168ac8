//! Error types for the editor facade.

use tessera_license::LicenseError;
use tessera_types::BlockId;
use tessera_validation::ValidationResult;
use thiserror::Error;

pub use crate::config::ConfigError;

/// Storage failures reported by a [`BlockRepository`](crate::BlockRepository).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("block already exists: {0}")]
    Duplicate(BlockId),

    #[error("block not found: {0}")]
    NotFound(BlockId),

    #[error("repository backend error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    License(#[from] LicenseError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("block type not allowed under the current license: {0}")]
    BlockTypeNotAllowed(String),

    #[error("block type limit reached ({limit} types)")]
    BlockTypeLimitReached { limit: usize },

    #[error("block is locked: {0}")]
    Locked(BlockId),

    #[error("block is hidden: {0}")]
    Hidden(BlockId),

    #[error("validation failed ({} errors)", .0.error_count())]
    Validation(ValidationResult),
}

impl EditorError {
    /// The failing validation, for hosts that render per-field messages.
    pub fn validation(&self) -> Option<&ValidationResult> {
        match self {
            EditorError::Validation(result) => Some(result),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
