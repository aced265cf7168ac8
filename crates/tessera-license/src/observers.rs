//! Tier change observers.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::error;

use crate::tier::LicenseTier;

/// A tier transition. `previous != current` always holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LicenseChange {
    pub previous: LicenseTier,
    pub current: LicenseTier,
}

pub type LicenseCallback = Arc<dyn Fn(&LicenseChange) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Observers {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(u64, LicenseCallback)>>,
}

impl Observers {
    pub(crate) fn subscribe(self: &Arc<Self>, callback: LicenseCallback) -> Unsubscribe {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks.lock().push((id, callback));
        Unsubscribe {
            observers: Arc::downgrade(self),
            id,
        }
    }

    fn remove(&self, id: u64) -> bool {
        let mut callbacks = self.callbacks.lock();
        let before = callbacks.len();
        callbacks.retain(|(cid, _)| *cid != id);
        callbacks.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// Invoke every observer. A panicking observer is logged and skipped.
    pub(crate) fn notify(&self, change: &LicenseChange) {
        // snapshot so observers may subscribe or unsubscribe re-entrantly
        let callbacks: Vec<(u64, LicenseCallback)> = self.callbacks.lock().clone();
        for (id, callback) in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(change))).is_err() {
                error!(
                    observer = id,
                    previous = %change.previous,
                    current = %change.current,
                    "license change observer panicked"
                );
            }
        }
    }
}

/// Detaches one observer.
pub struct Unsubscribe {
    observers: Weak<Observers>,
    id: u64,
}

impl Unsubscribe {
    /// Returns whether the observer was still registered.
    pub fn unsubscribe(self) -> bool {
        self.observers.upgrade().is_some_and(|o| o.remove(self.id))
    }
}

impl std::fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscribe").field("id", &self.id).finish()
    }
}
