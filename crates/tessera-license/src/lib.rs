//! Licensing for the Tessera editor.
//!
//! A [`License`] holds the current tier (FREE or PRO) and changes it only
//! through [`License::verify_key`]. Everything else derives from that tier:
//!
//! | Type                     | Answers                                          |
//! |--------------------------|--------------------------------------------------|
//! | [`License`]              | tier, block-type limit, remaining slots          |
//! | [`LicenseFeatureChecker`]| which gated [`Feature`]s are on, field filtering |
//! | [`LicenseService`]       | allowed block types, block filtering, observers  |
//!
//! Verification never fails from the caller's point of view: a transport
//! error or a malformed answer is a FREE answer.

mod error;
mod features;
mod license;
mod observers;
mod service;
mod tier;
mod transport;

pub use error::{LicenseError, TransportError};
pub use features::{CUSTOM_BREAKPOINTS_OPTION, Feature, FeatureSet, LicenseFeatureChecker, required_feature};
pub use license::License;
pub use observers::{LicenseCallback, LicenseChange, Unsubscribe};
pub use service::LicenseService;
pub use tier::{BlockTypeLimit, DEFAULT_FREE_MAX_BLOCK_TYPES, LicenseConfig, LicenseTier};
pub use transport::{
    DEFAULT_VERIFICATION_ENDPOINT, HttpVerificationTransport, VerificationRequest, VerificationResponse,
    VerificationTransport,
};

/// Result type for license construction.
pub type Result<T> = std::result::Result<T, LicenseError>;
