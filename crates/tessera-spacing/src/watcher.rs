//! Viewport width watchers.
//!
//! Two strategies feed the same callback shape. [`SizeObserverWatcher`] is
//! push-based: the host forwards resize notifications into a
//! [`ViewportSignal`]. [`PollingWatcher`] is the fallback for hosts that can
//! only answer "how wide is it now?" and samples a probe on a fixed interval.
//! The choice is made once, at start-up, by [`select_viewport_watcher`].
//!
//! Every subscription spawns a tokio task. Called outside a runtime,
//! `subscribe` logs a warning and returns an inactive [`WatchHandle`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Called with the new viewport width in pixels.
pub type ResizeCallback = Arc<dyn Fn(u32) + Send + Sync>;

/// Reads the current viewport width.
pub type WidthProbe = Arc<dyn Fn() -> u32 + Send + Sync>;

/// Sampling period of the polling fallback.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatcherKind {
    SizeObserver,
    Polling,
}

/// Source of viewport width changes.
pub trait ViewportWatcher: Send + Sync {
    fn kind(&self) -> WatcherKind;

    /// Width right now, without waiting for a change.
    fn current_width(&self) -> u32;

    /// Invoke `callback` on every width change until the handle is disposed
    /// or dropped. The current width is not replayed. Without a tokio
    /// runtime the handle is inactive and the callback never runs.
    fn subscribe(&self, callback: ResizeCallback) -> WatchHandle;
}

/// Disposer for one subscription. Dropping it disposes too.
#[derive(Debug)]
pub struct WatchHandle {
    task: Option<AbortHandle>,
}

impl WatchHandle {
    fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => Self {
                task: Some(runtime.spawn(future).abort_handle()),
            },
            Err(err) => {
                warn!(%err, "no tokio runtime; viewport subscription is inactive");
                Self { task: None }
            }
        }
    }

    /// Stop delivering notifications. Idempotent.
    pub fn dispose(mut self) {
        self.abort();
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Push channel for viewport widths, written by the host's resize hook.
#[derive(Clone, Debug)]
pub struct ViewportSignal {
    tx: Arc<watch::Sender<u32>>,
}

impl ViewportSignal {
    pub fn new(width: u32) -> Self {
        let (tx, _rx) = watch::channel(width);
        Self { tx: Arc::new(tx) }
    }

    /// Publish a width. Subscribers are only woken if it differs from the
    /// last published one.
    pub fn set_width(&self, width: u32) {
        self.tx.send_if_modified(|current| {
            if *current == width {
                false
            } else {
                *current = width;
                true
            }
        });
    }

    pub fn width(&self) -> u32 {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<u32> {
        self.tx.subscribe()
    }
}

/// Push-based watcher over a [`ViewportSignal`].
#[derive(Clone, Debug)]
pub struct SizeObserverWatcher {
    signal: ViewportSignal,
}

impl SizeObserverWatcher {
    pub fn new(signal: ViewportSignal) -> Self {
        Self { signal }
    }
}

impl ViewportWatcher for SizeObserverWatcher {
    fn kind(&self) -> WatcherKind {
        WatcherKind::SizeObserver
    }

    fn current_width(&self) -> u32 {
        self.signal.width()
    }

    fn subscribe(&self, callback: ResizeCallback) -> WatchHandle {
        let mut rx = self.signal.subscribe();
        rx.borrow_and_update();
        WatchHandle::spawn(async move {
            while rx.changed().await.is_ok() {
                let width = *rx.borrow_and_update();
                callback(width);
            }
        })
    }
}

/// Fallback watcher sampling a [`WidthProbe`] every `interval`.
#[derive(Clone)]
pub struct PollingWatcher {
    probe: WidthProbe,
    interval: Duration,
}

impl PollingWatcher {
    pub fn new(probe: WidthProbe) -> Self {
        Self::with_interval(probe, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(probe: WidthProbe, interval: Duration) -> Self {
        Self { probe, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl std::fmt::Debug for PollingWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingWatcher")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl ViewportWatcher for PollingWatcher {
    fn kind(&self) -> WatcherKind {
        WatcherKind::Polling
    }

    fn current_width(&self) -> u32 {
        (self.probe)()
    }

    fn subscribe(&self, callback: ResizeCallback) -> WatchHandle {
        let probe = Arc::clone(&self.probe);
        let period = self.interval;
        let mut last = probe();
        WatchHandle::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let width = probe();
                if width != last {
                    last = width;
                    callback(width);
                }
            }
        })
    }
}

/// Prefer the push signal when the host provides one; otherwise poll.
pub fn select_viewport_watcher(
    signal: Option<&ViewportSignal>,
    probe: WidthProbe,
) -> Arc<dyn ViewportWatcher> {
    match signal {
        Some(signal) => {
            debug!("viewport watcher: size observer");
            Arc::new(SizeObserverWatcher::new(signal.clone()))
        }
        None => {
            debug!(interval_ms = DEFAULT_POLL_INTERVAL.as_millis() as u64, "viewport watcher: polling");
            Arc::new(PollingWatcher::new(probe))
        }
    }
}
