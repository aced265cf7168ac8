//! The license: tier state plus idempotent key verification.
//!
//! Verification is the only asynchronous operation in the editor core.
//! While one is in flight, further [`License::verify_key`] calls join it and
//! receive the same outcome; none of them reaches the transport. Once it
//! resolves, the guard is cleared and the next call starts afresh.
//!
//! ```text
//!   Idle ──verify_key──▶ InFlight(shared future) ──resolves──▶ Idle
//!                            ▲           │
//!                            └─ joiners ─┘
//! ```

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::LicenseError;
use crate::observers::{LicenseCallback, LicenseChange, Observers, Unsubscribe};
use crate::tier::{BlockTypeLimit, DEFAULT_FREE_MAX_BLOCK_TYPES, LicenseConfig, LicenseTier};
use crate::transport::VerificationTransport;

type PendingVerification = Shared<BoxFuture<'static, LicenseTier>>;

#[derive(Debug)]
struct LicenseState {
    tier: LicenseTier,
    key: Option<String>,
    max_block_types: Option<usize>,
    /// Whether `max_block_types` came from configuration.
    explicit_max: bool,
}

struct LicenseInner {
    state: RwLock<LicenseState>,
    in_flight: Mutex<Option<PendingVerification>>,
    transport: Arc<dyn VerificationTransport>,
    observers: Arc<Observers>,
}

/// Shared handle to the editor's license. Clones see the same state.
#[derive(Clone)]
pub struct License {
    inner: Arc<LicenseInner>,
}

impl License {
    /// Fails only on a non-positive explicit `max_block_types`.
    pub fn new(config: LicenseConfig, transport: Arc<dyn VerificationTransport>) -> Result<Self, LicenseError> {
        let explicit = config.explicit_max_block_types()?;
        let tier = config.tier.unwrap_or_default();
        let max_block_types = match (explicit, tier) {
            (Some(max), _) => Some(max),
            (None, LicenseTier::Free) => Some(DEFAULT_FREE_MAX_BLOCK_TYPES),
            (None, LicenseTier::Pro) => None,
        };

        Ok(Self {
            inner: Arc::new(LicenseInner {
                state: RwLock::new(LicenseState {
                    tier,
                    key: config.key,
                    max_block_types,
                    explicit_max: explicit.is_some(),
                }),
                in_flight: Mutex::new(None),
                transport,
                observers: Arc::new(Observers::default()),
            }),
        })
    }

    pub fn tier(&self) -> LicenseTier {
        self.inner.state.read().tier
    }

    pub fn is_pro(&self) -> bool {
        self.tier() == LicenseTier::Pro
    }

    /// Last key handed to `verify_key`, or the configured one.
    pub fn key(&self) -> Option<String> {
        self.inner.state.read().key.clone()
    }

    /// Stored limit. Ignored while PRO.
    pub fn max_block_types(&self) -> Option<usize> {
        self.inner.state.read().max_block_types
    }

    pub fn block_type_limit(&self) -> BlockTypeLimit {
        let state = self.inner.state.read();
        match state.tier {
            LicenseTier::Pro => BlockTypeLimit::Unlimited,
            LicenseTier::Free => {
                BlockTypeLimit::Limited(state.max_block_types.unwrap_or(DEFAULT_FREE_MAX_BLOCK_TYPES))
            }
        }
    }

    /// PRO always; FREE while `current_count` is under the limit.
    pub fn can_add_block_type(&self, current_count: usize) -> bool {
        self.block_type_limit().allows(current_count)
    }

    /// Unlimited for PRO; otherwise the limit minus `current_count`, floored at zero.
    pub fn remaining_block_type_slots(&self, current_count: usize) -> BlockTypeLimit {
        match self.block_type_limit() {
            BlockTypeLimit::Unlimited => BlockTypeLimit::Unlimited,
            BlockTypeLimit::Limited(max) => BlockTypeLimit::Limited(max.saturating_sub(current_count)),
        }
    }

    /// Whether a verification is currently outstanding.
    pub fn is_verifying(&self) -> bool {
        self.inner.in_flight.lock().is_some()
    }

    /// Verify `key` and return the resulting tier.
    ///
    /// Never fails: transport errors, non-2xx responses, malformed bodies, and
    /// negative answers all resolve to FREE. A call made while another is in
    /// flight joins it (its `key` is not sent) and gets the same tier.
    pub async fn verify_key(&self, key: &str) -> LicenseTier {
        let pending = {
            let mut guard = self.inner.in_flight.lock();
            match guard.as_ref() {
                Some(pending) => {
                    debug!("joining in-flight license verification");
                    pending.clone()
                }
                None => {
                    debug!("license verification started");
                    let pending = Arc::clone(&self.inner)
                        .run_verification(key.to_string())
                        .boxed()
                        .shared();
                    *guard = Some(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    /// Observe tier transitions. Observers run once per actual transition,
    /// never for a verification that leaves the tier unchanged.
    pub fn on_change(&self, callback: LicenseCallback) -> Unsubscribe {
        self.inner.observers.subscribe(callback)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.len()
    }
}

impl std::fmt::Debug for License {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("License")
            .field("tier", &state.tier)
            .field("max_block_types", &state.max_block_types)
            .field("has_key", &state.key.is_some())
            .finish_non_exhaustive()
    }
}

impl LicenseInner {
    async fn run_verification(self: Arc<Self>, key: String) -> LicenseTier {
        let tier = match self.transport.verify(&key).await {
            Ok(resp) => resp.granted_tier(),
            Err(e) => {
                warn!(error = %e, "license verification failed, falling back to FREE");
                LicenseTier::Free
            }
        };

        let change = self.apply(tier, key);
        self.in_flight.lock().take();

        if let Some(change) = change {
            info!(previous = %change.previous, current = %change.current, "license tier changed");
            self.observers.notify(&change);
        }
        tier
    }

    fn apply(&self, tier: LicenseTier, key: String) -> Option<LicenseChange> {
        let mut state = self.state.write();
        let previous = state.tier;
        state.tier = tier;
        state.key = Some(key);
        if tier == LicenseTier::Free && !state.explicit_max {
            state.max_block_types = Some(DEFAULT_FREE_MAX_BLOCK_TYPES);
        }
        (previous != tier).then_some(LicenseChange {
            previous,
            current: tier,
        })
    }
}
