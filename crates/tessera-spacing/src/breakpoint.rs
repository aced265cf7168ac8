//! Breakpoint resolution and spacing inheritance.

use std::cmp::Ordering;

use crate::types::{Breakpoint, DEFAULT_BREAKPOINT, SpacingData, SpacingValues};

/// Ascending by `max_width`; the unbounded breakpoint sorts last. Stable, so
/// equal widths keep their declared order.
pub fn sort_breakpoints(breakpoints: &[Breakpoint]) -> Vec<&Breakpoint> {
    let mut sorted: Vec<&Breakpoint> = breakpoints.iter().collect();
    sorted.sort_by(|a, b| match (a.max_width, b.max_width) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    sorted
}

/// The breakpoint without `max_width`, if the set has one.
pub fn unbounded_breakpoint(breakpoints: &[Breakpoint]) -> Option<&Breakpoint> {
    breakpoints.iter().find(|b| b.is_unbounded())
}

/// Name of the breakpoint covering `width`: the narrowest range whose
/// `max_width >= width`, else the unbounded one.
///
/// An empty set resolves to [`DEFAULT_BREAKPOINT`]; a set with no unbounded
/// entry resolves widths past its widest range to that widest range.
pub fn get_current_breakpoint(width: u32, breakpoints: &[Breakpoint]) -> &str {
    let sorted = sort_breakpoints(breakpoints);
    if let Some(bp) = sorted
        .iter()
        .copied()
        .find(|b| b.max_width.is_some_and(|max| max >= width))
    {
        return &bp.name;
    }
    match unbounded_breakpoint(breakpoints).or_else(|| sorted.last().copied()) {
        Some(bp) => &bp.name,
        None => DEFAULT_BREAKPOINT,
    }
}

/// Effective values at `breakpoint`: its own entries, with unset ones
/// inherited from each larger breakpoint in turn.
///
/// A breakpoint name not in the set resolves to its own entries only.
pub fn resolve_spacing(
    spacing: &SpacingData,
    breakpoint: &str,
    breakpoints: &[Breakpoint],
) -> SpacingValues {
    let own = spacing.get(breakpoint).copied().unwrap_or_default();
    let sorted = sort_breakpoints(breakpoints);
    let Some(pos) = sorted.iter().position(|b| b.name == breakpoint) else {
        return own;
    };
    sorted[pos + 1..].iter().fold(own, |acc, larger| match spacing.get(&larger.name) {
        Some(values) => acc.or(values),
        None => acc,
    })
}
