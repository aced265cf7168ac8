//! Applying spacing to rendered elements and keeping it in step with the
//! viewport.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::breakpoint::get_current_breakpoint;
use crate::css::{BreakpointStyles, compute_breakpoint_styles};
use crate::types::{Breakpoint, SpacingData, SpacingType, default_breakpoints};
use crate::watcher::{ViewportWatcher, WatchHandle};

/// A rendered element spacing can be written to.
///
/// `None` removes the property.
pub trait StyleTarget: Send + Sync {
    /// Stable identity of the element, used to key watch registrations.
    fn key(&self) -> String;

    fn set_inline_style(&self, property: &str, value: Option<&str>);

    fn set_custom_property(&self, name: &str, value: Option<&str>);
}

/// Write the resolved styles for `breakpoint` onto `target`.
///
/// Margins become inline styles; paddings become `--{field}-padding-*`
/// custom properties. Every one of the four properties is written, so values
/// set at a previous breakpoint but absent here are removed.
pub fn apply_breakpoint_styles(
    target: &dyn StyleTarget,
    spacing: &SpacingData,
    field_name: &str,
    breakpoint: &str,
    breakpoints: &[Breakpoint],
) -> BreakpointStyles {
    let styles = compute_breakpoint_styles(spacing, field_name, breakpoint, breakpoints);
    for spacing_type in SpacingType::ALL {
        if spacing_type.is_margin() {
            let value = styles.margins.get(spacing_type.as_str()).map(String::as_str);
            target.set_inline_style(spacing_type.as_str(), value);
        } else {
            let name = format!("--{field_name}-{spacing_type}");
            let value = styles.padding_vars.get(&name).map(String::as_str);
            target.set_custom_property(&name, value);
        }
    }
    styles
}

/// A live breakpoint subscription. Dropping it disposes the subscription.
#[derive(Debug)]
pub struct BreakpointWatch {
    handle: WatchHandle,
    current: Arc<Mutex<String>>,
}

impl BreakpointWatch {
    /// Breakpoint whose styles are currently applied.
    pub fn current_breakpoint(&self) -> String {
        self.current.lock().clone()
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_active()
    }

    pub fn dispose(self) {
        self.handle.dispose();
    }
}

/// Apply styles for the current width now, then re-apply whenever the
/// viewport crosses into a different breakpoint.
///
/// Width changes inside the same breakpoint do nothing. An empty breakpoint
/// list uses [`default_breakpoints`].
///
/// Outside a tokio runtime the initial styles are still applied, but the
/// returned watch is inactive and never re-applies.
pub fn watch_breakpoint_changes(
    target: Arc<dyn StyleTarget>,
    spacing: SpacingData,
    field_name: impl Into<String>,
    breakpoints: Vec<Breakpoint>,
    watcher: &dyn ViewportWatcher,
) -> BreakpointWatch {
    let field_name = field_name.into();
    let breakpoints = if breakpoints.is_empty() {
        default_breakpoints()
    } else {
        breakpoints
    };

    let initial = get_current_breakpoint(watcher.current_width(), &breakpoints).to_string();
    apply_breakpoint_styles(target.as_ref(), &spacing, &field_name, &initial, &breakpoints);
    debug!(element = %target.key(), field = %field_name, breakpoint = %initial, "spacing watch started");

    let current = Arc::new(Mutex::new(initial));
    let shared = Arc::clone(&current);
    let handle = watcher.subscribe(Arc::new(move |width: u32| {
        let name = get_current_breakpoint(width, &breakpoints);
        {
            let mut current = shared.lock();
            if *current == name {
                return;
            }
            *current = name.to_string();
        }
        debug!(element = %target.key(), width, breakpoint = name, "breakpoint changed");
        apply_breakpoint_styles(target.as_ref(), &spacing, &field_name, name, &breakpoints);
    }));

    BreakpointWatch { handle, current }
}

/// Registry of live watches keyed by (element, field).
///
/// Watching the same element and field again disposes the earlier watch.
#[derive(Debug, Default)]
pub struct BreakpointWatchers {
    watches: Mutex<HashMap<(String, String), BreakpointWatch>>,
}

impl BreakpointWatchers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching; returns the breakpoint applied immediately.
    pub fn watch(
        &self,
        target: Arc<dyn StyleTarget>,
        spacing: SpacingData,
        field_name: &str,
        breakpoints: Vec<Breakpoint>,
        watcher: &dyn ViewportWatcher,
    ) -> String {
        let key = (target.key(), field_name.to_string());
        let mut watches = self.watches.lock();
        // the old watch must stop before the new one writes its styles
        if let Some(previous) = watches.remove(&key) {
            previous.dispose();
        }
        let watch = watch_breakpoint_changes(target, spacing, field_name, breakpoints, watcher);
        let applied = watch.current_breakpoint();
        watches.insert(key, watch);
        applied
    }

    /// Dispose one watch. Returns whether it existed.
    pub fn unwatch(&self, element: &str, field_name: &str) -> bool {
        let removed = self
            .watches
            .lock()
            .remove(&(element.to_string(), field_name.to_string()));
        match removed {
            Some(watch) => {
                watch.dispose();
                true
            }
            None => false,
        }
    }

    pub fn current_breakpoint(&self, element: &str, field_name: &str) -> Option<String> {
        self.watches
            .lock()
            .get(&(element.to_string(), field_name.to_string()))
            .map(BreakpointWatch::current_breakpoint)
    }

    pub fn len(&self) -> usize {
        self.watches.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.lock().is_empty()
    }

    /// Dispose everything.
    pub fn clear(&self) {
        let drained: Vec<_> = self.watches.lock().drain().map(|(_, w)| w).collect();
        for watch in drained {
            watch.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SpacingValues;
    use crate::watcher::{SizeObserverWatcher, ViewportSignal};
    use indexmap::IndexMap;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingElement {
        inline: Mutex<IndexMap<String, String>>,
        vars: Mutex<IndexMap<String, String>>,
        writes: Mutex<usize>,
    }

    impl RecordingElement {
        fn inline(&self, prop: &str) -> Option<String> {
            self.inline.lock().get(prop).cloned()
        }

        fn var(&self, name: &str) -> Option<String> {
            self.vars.lock().get(name).cloned()
        }

        fn applies(&self) -> usize {
            *self.writes.lock() / SpacingType::ALL.len()
        }
    }

    fn write(map: &Mutex<IndexMap<String, String>>, key: &str, value: Option<&str>) {
        let mut map = map.lock();
        match value {
            Some(v) => {
                map.insert(key.to_string(), v.to_string());
            }
            None => {
                map.shift_remove(key);
            }
        }
    }

    impl StyleTarget for RecordingElement {
        fn key(&self) -> String {
            "block-1".into()
        }

        fn set_inline_style(&self, property: &str, value: Option<&str>) {
            *self.writes.lock() += 1;
            write(&self.inline, property, value);
        }

        fn set_custom_property(&self, name: &str, value: Option<&str>) {
            *self.writes.lock() += 1;
            write(&self.vars, name, value);
        }
    }

    fn spacing() -> SpacingData {
        SpacingData::new()
            .with(
                "desktop",
                SpacingValues::default()
                    .with(SpacingType::MarginTop, 40)
                    .with(SpacingType::PaddingTop, 32),
            )
            .with(
                "mobile",
                SpacingValues::default()
                    .with(SpacingType::MarginTop, 8)
                    .with(SpacingType::MarginBottom, 4),
            )
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    // ── Apply ───────────────────────────────────────────────────────────

    #[test]
    fn test_apply_splits_margins_and_paddings() {
        let el = RecordingElement::default();
        apply_breakpoint_styles(&el, &spacing(), "hero", "desktop", &[]);
        assert_eq!(el.inline("margin-top").as_deref(), Some("40px"));
        assert_eq!(el.inline("margin-bottom"), None);
        assert_eq!(el.var("--hero-padding-top").as_deref(), Some("32px"));
        assert_eq!(el.inline("padding-top"), None);
    }

    #[test]
    fn test_apply_removes_stale_values() {
        let el = RecordingElement::default();
        let data = SpacingData::new().with(
            "mobile",
            SpacingValues::default().with(SpacingType::MarginBottom, 4),
        );
        el.set_inline_style("margin-top", Some("99px"));
        apply_breakpoint_styles(&el, &data, "hero", "mobile", &[]);
        assert_eq!(el.inline("margin-top"), None);
        assert_eq!(el.inline("margin-bottom").as_deref(), Some("4px"));
    }

    // ── Watch ───────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_watch_applies_immediately_and_on_crossing() {
        let signal = ViewportSignal::new(1400);
        let watcher = SizeObserverWatcher::new(signal.clone());
        let el = Arc::new(RecordingElement::default());

        let watch = watch_breakpoint_changes(el.clone(), spacing(), "hero", Vec::new(), &watcher);
        assert_eq!(watch.current_breakpoint(), "desktop");
        assert_eq!(el.inline("margin-top").as_deref(), Some("40px"));
        assert_eq!(el.applies(), 1);

        // still desktop
        signal.set_width(1300);
        settle().await;
        assert_eq!(el.applies(), 1);

        signal.set_width(500);
        settle().await;
        assert_eq!(watch.current_breakpoint(), "mobile");
        assert_eq!(el.inline("margin-top").as_deref(), Some("8px"));
        assert_eq!(el.inline("margin-bottom").as_deref(), Some("4px"));
        // padding inherited from desktop
        assert_eq!(el.var("--hero-padding-top").as_deref(), Some("32px"));
        assert_eq!(el.applies(), 2);

        // tablet has no entries of its own and inherits desktop
        signal.set_width(900);
        settle().await;
        assert_eq!(watch.current_breakpoint(), "tablet");
        assert_eq!(el.inline("margin-top").as_deref(), Some("40px"));
        assert_eq!(el.inline("margin-bottom"), None);
        assert_eq!(el.applies(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disposed_watch_stops_applying() {
        let signal = ViewportSignal::new(1400);
        let watcher = SizeObserverWatcher::new(signal.clone());
        let el = Arc::new(RecordingElement::default());

        let watch = watch_breakpoint_changes(el.clone(), spacing(), "hero", Vec::new(), &watcher);
        watch.dispose();
        signal.set_width(300);
        settle().await;
        assert_eq!(el.applies(), 1);
        assert_eq!(el.inline("margin-top").as_deref(), Some("40px"));
    }

    // ── Registry ────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_rewatch_replaces_previous() {
        let signal = ViewportSignal::new(600);
        let watcher = SizeObserverWatcher::new(signal.clone());
        let el = Arc::new(RecordingElement::default());
        let watchers = BreakpointWatchers::new();

        assert_eq!(watchers.watch(el.clone(), spacing(), "hero", Vec::new(), &watcher), "mobile");
        assert_eq!(watchers.watch(el.clone(), spacing(), "hero", Vec::new(), &watcher), "mobile");
        assert_eq!(watchers.len(), 1);
        assert_eq!(el.applies(), 2);

        signal.set_width(1500);
        settle().await;
        // only the surviving watch reacts
        assert_eq!(el.applies(), 3);
        assert_eq!(watchers.current_breakpoint("block-1", "hero").as_deref(), Some("desktop"));

        assert!(watchers.unwatch("block-1", "hero"));
        assert!(!watchers.unwatch("block-1", "hero"));
        assert!(watchers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rewatch_with_new_spacing_writes_only_new_values() {
        let signal = ViewportSignal::new(1400);
        let watcher = SizeObserverWatcher::new(signal.clone());
        let el = Arc::new(RecordingElement::default());
        let watchers = BreakpointWatchers::new();
        let replacement = SpacingData::new().with(
            "desktop",
            SpacingValues::default().with(SpacingType::MarginTop, 12),
        );

        watchers.watch(el.clone(), spacing(), "hero", Vec::new(), &watcher);
        assert_eq!(el.inline("margin-top").as_deref(), Some("40px"));
        watchers.watch(el.clone(), replacement, "hero", Vec::new(), &watcher);
        assert_eq!(el.inline("margin-top").as_deref(), Some("12px"));
        assert_eq!(el.var("--hero-padding-top"), None);
        assert_eq!(el.applies(), 2);

        // mobile inherits the replacement's desktop values, not the old mobile ones
        signal.set_width(500);
        settle().await;
        assert_eq!(el.applies(), 3);
        assert_eq!(el.inline("margin-top").as_deref(), Some("12px"));
        assert_eq!(el.inline("margin-bottom"), None);
        assert_eq!(watchers.current_breakpoint("block-1", "hero").as_deref(), Some("mobile"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_disposes_all() {
        let signal = ViewportSignal::new(1400);
        let watcher = SizeObserverWatcher::new(signal.clone());
        let el = Arc::new(RecordingElement::default());
        let watchers = BreakpointWatchers::new();
        watchers.watch(el.clone(), spacing(), "hero", Vec::new(), &watcher);
        watchers.watch(el.clone(), spacing(), "banner", Vec::new(), &watcher);
        assert_eq!(watchers.len(), 2);

        watchers.clear();
        signal.set_width(300);
        settle().await;
        assert_eq!(el.applies(), 2);
    }

    // ── No runtime ──────────────────────────────────────────────────────

    #[test]
    fn test_watch_outside_runtime_applies_once() {
        let signal = ViewportSignal::new(500);
        let watcher = SizeObserverWatcher::new(signal.clone());
        let el = Arc::new(RecordingElement::default());

        let watch = watch_breakpoint_changes(el.clone(), spacing(), "hero", Vec::new(), &watcher);
        assert_eq!(watch.current_breakpoint(), "mobile");
        assert_eq!(el.inline("margin-top").as_deref(), Some("8px"));
        assert!(!watch.is_active());

        let watchers = BreakpointWatchers::new();
        assert_eq!(watchers.watch(el.clone(), spacing(), "hero", Vec::new(), &watcher), "mobile");
        assert_eq!(watchers.len(), 1);
        assert_eq!(el.applies(), 2);
    }
}
