//! Error types for spacing configuration.

use thiserror::Error;

/// Invalid static spacing configuration. Runtime data never produces these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpacingError {
    /// `min` is larger than `max`.
    #[error("spacing range is empty: min {min} > max {max}")]
    InvalidRange { min: i32, max: i32 },

    /// `step` must be positive.
    #[error("spacing step must be positive, got {0}")]
    InvalidStep(i32),

    /// A breakpoint set needs exactly one breakpoint without `maxWidth`.
    #[error("expected exactly one unbounded breakpoint, found {0}")]
    UnboundedBreakpoints(usize),

    /// Two breakpoints share a name.
    #[error("duplicate breakpoint name: {0}")]
    DuplicateBreakpoint(String),
}
