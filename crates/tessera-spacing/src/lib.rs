//! Responsive spacing for Tessera blocks.
//!
//! Spacing is stored per breakpoint: a block may say "40px top padding on
//! desktop, 16px on mobile" and leave everything else unset. Unset means
//! *inherit from the next larger breakpoint*, never zero.
//!
//! # Pipeline
//!
//! ```text
//! SpacingData (block props)
//!     │
//!     ├── generate_spacing_css_variables → {"--spacing-margin-top-mobile": "8px", ...}
//!     ├── generate_spacing_css           → base rules + @media (max-width) blocks
//!     │
//!     └── watch_breakpoint_changes
//!             ViewportWatcher (size observer | polling fallback)
//!                 └── width → get_current_breakpoint → changed? → apply styles
//!                                                           margins  → inline style
//!                                                           paddings → custom properties
//! ```

mod breakpoint;
mod css;
mod error;
mod live;
mod types;
mod watcher;

pub use breakpoint::{get_current_breakpoint, resolve_spacing, sort_breakpoints, unbounded_breakpoint};
pub use css::{
    BreakpointStyles, compute_breakpoint_styles, css_variable_name, generate_spacing_css,
    generate_spacing_css_variables,
};
pub use error::SpacingError;
pub use live::{BreakpointWatch, BreakpointWatchers, StyleTarget, apply_breakpoint_styles, watch_breakpoint_changes};
pub use types::{
    Breakpoint, DEFAULT_BREAKPOINT, DEFAULT_FIELD_NAME, SpacingConfig, SpacingData, SpacingType,
    SpacingValues, default_breakpoints,
};
pub use watcher::{
    DEFAULT_POLL_INTERVAL, PollingWatcher, ResizeCallback, SizeObserverWatcher, ViewportSignal,
    ViewportWatcher, WatchHandle, WatcherKind, WidthProbe, select_viewport_watcher,
};

/// Result type for spacing configuration checks.
pub type Result<T> = std::result::Result<T, SpacingError>;
