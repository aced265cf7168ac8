//! CSS generation: custom-property maps, literal stylesheets, and the
//! per-breakpoint style split used by live watching.

use std::borrow::Cow;
use std::fmt::Write;

use indexmap::IndexMap;

use crate::breakpoint::{resolve_spacing, sort_breakpoints};
use crate::types::{Breakpoint, SpacingData, SpacingType, default_breakpoints};

/// An empty breakpoint list means "use the defaults".
fn effective_breakpoints(breakpoints: &[Breakpoint]) -> Cow<'_, [Breakpoint]> {
    if breakpoints.is_empty() {
        Cow::Owned(default_breakpoints())
    } else {
        Cow::Borrowed(breakpoints)
    }
}

/// `--{field}-{type}` for the unbounded breakpoint, `--{field}-{type}-{breakpoint}` otherwise.
pub fn css_variable_name(field_name: &str, spacing_type: SpacingType, breakpoint: &Breakpoint) -> String {
    if breakpoint.is_unbounded() {
        format!("--{field_name}-{spacing_type}")
    } else {
        format!("--{field_name}-{spacing_type}-{}", breakpoint.name)
    }
}

/// One custom property per set value per breakpoint, valued `{n}px`.
///
/// Unset values are omitted entirely; zero is a real value and is emitted.
/// Entries for breakpoints not in the set are ignored.
pub fn generate_spacing_css_variables(
    spacing: &SpacingData,
    field_name: &str,
    breakpoints: &[Breakpoint],
) -> IndexMap<String, String> {
    let breakpoints = effective_breakpoints(breakpoints);
    let mut vars = IndexMap::new();
    for bp in breakpoints.iter() {
        let Some(values) = spacing.get(&bp.name) else {
            continue;
        };
        for (spacing_type, px) in values.iter() {
            vars.insert(css_variable_name(field_name, spacing_type, bp), format!("{px}px"));
        }
    }
    vars
}

/// Literal CSS for `selector`.
///
/// The unbounded breakpoint's rule comes first, then bounded breakpoints from
/// widest to narrowest, each wrapped in `@media (max-width: …)` so narrower
/// queries win the cascade. Breakpoints whose values are all zero or unset
/// are skipped.
pub fn generate_spacing_css(spacing: &SpacingData, selector: &str, breakpoints: &[Breakpoint]) -> String {
    let breakpoints = effective_breakpoints(breakpoints);
    let mut css = String::new();

    for bp in sort_breakpoints(&breakpoints).into_iter().rev() {
        let Some(values) = spacing.get(&bp.name) else {
            continue;
        };
        if values.is_blank() {
            continue;
        }
        let indent = if bp.is_unbounded() { "" } else { "  " };
        if let Some(max_width) = bp.max_width {
            let _ = writeln!(css, "@media (max-width: {max_width}px) {{");
        }
        let _ = writeln!(css, "{indent}{selector} {{");
        for (spacing_type, px) in values.iter() {
            let _ = writeln!(css, "{indent}  {spacing_type}: {px}px;");
        }
        let _ = writeln!(css, "{indent}}}");
        if !bp.is_unbounded() {
            let _ = writeln!(css, "}}");
        }
    }
    css
}

/// Styles for one resolved breakpoint, split the way the rendering layer
/// consumes them: margins go on the element inline, paddings become custom
/// properties the block's own markup reads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BreakpointStyles {
    pub breakpoint: String,
    /// `margin-top` → `16px`
    pub margins: IndexMap<String, String>,
    /// `--{field}-padding-top` → `24px`
    pub padding_vars: IndexMap<String, String>,
}

/// Resolve `breakpoint` (with inheritance from larger breakpoints) and split
/// the result into inline margins and padding custom properties.
pub fn compute_breakpoint_styles(
    spacing: &SpacingData,
    field_name: &str,
    breakpoint: &str,
    breakpoints: &[Breakpoint],
) -> BreakpointStyles {
    let breakpoints = effective_breakpoints(breakpoints);
    let values = resolve_spacing(spacing, breakpoint, &breakpoints);

    let mut styles = BreakpointStyles {
        breakpoint: breakpoint.to_string(),
        ..BreakpointStyles::default()
    };
    for (spacing_type, px) in values.iter() {
        if spacing_type.is_margin() {
            styles
                .margins
                .insert(spacing_type.as_str().to_string(), format!("{px}px"));
        } else {
            styles
                .padding_vars
                .insert(format!("--{field_name}-{spacing_type}"), format!("{px}px"));
        }
    }
    styles
}
