//! Error types for licensing.

use thiserror::Error;

/// Invalid license configuration. Verification outcomes never produce these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LicenseError {
    #[error("maxBlockTypes must be positive, got {0}")]
    InvalidMaxBlockTypes(i64),
}

/// Why a verification request produced no usable answer.
///
/// [`License::verify_key`](crate::License::verify_key) turns every one of
/// these into the FREE tier; they surface only to direct transport callers.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("verification request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("verification endpoint returned HTTP {0}")]
    Status(u16),

    #[error("malformed verification response: {0}")]
    Malformed(String),
}
