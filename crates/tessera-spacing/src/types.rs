//! Spacing data model: spacing types, per-breakpoint values, breakpoints,
//! and the spacing field configuration.

use std::collections::HashSet;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::EnumString;

use crate::error::SpacingError;

/// Name used when a breakpoint list is empty or has no unbounded entry.
pub const DEFAULT_BREAKPOINT: &str = "desktop";

/// Field name used for CSS variables when the host does not pick one.
pub const DEFAULT_FIELD_NAME: &str = "spacing";

/// One of the four directional spacing properties tracked per breakpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SpacingType {
    PaddingTop,
    PaddingBottom,
    MarginTop,
    MarginBottom,
}

impl SpacingType {
    /// Canonical emission order.
    pub const ALL: [SpacingType; 4] = [
        SpacingType::PaddingTop,
        SpacingType::PaddingBottom,
        SpacingType::MarginTop,
        SpacingType::MarginBottom,
    ];

    /// Parse a CSS property name (`padding-top`, ...).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// CSS property name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpacingType::PaddingTop => "padding-top",
            SpacingType::PaddingBottom => "padding-bottom",
            SpacingType::MarginTop => "margin-top",
            SpacingType::MarginBottom => "margin-bottom",
        }
    }

    pub fn is_margin(&self) -> bool {
        matches!(self, SpacingType::MarginTop | SpacingType::MarginBottom)
    }

    pub fn is_padding(&self) -> bool {
        !self.is_margin()
    }
}

impl std::fmt::Display for SpacingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel values for one breakpoint. `None` means unset (inherit), not zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacingValues {
    #[serde(rename = "padding-top", default, skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<i32>,
    #[serde(rename = "padding-bottom", default, skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<i32>,
    #[serde(rename = "margin-top", default, skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<i32>,
    #[serde(rename = "margin-bottom", default, skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<i32>,
}

impl SpacingValues {
    pub fn get(&self, spacing_type: SpacingType) -> Option<i32> {
        match spacing_type {
            SpacingType::PaddingTop => self.padding_top,
            SpacingType::PaddingBottom => self.padding_bottom,
            SpacingType::MarginTop => self.margin_top,
            SpacingType::MarginBottom => self.margin_bottom,
        }
    }

    pub fn set(&mut self, spacing_type: SpacingType, value: Option<i32>) {
        let slot = match spacing_type {
            SpacingType::PaddingTop => &mut self.padding_top,
            SpacingType::PaddingBottom => &mut self.padding_bottom,
            SpacingType::MarginTop => &mut self.margin_top,
            SpacingType::MarginBottom => &mut self.margin_bottom,
        };
        *slot = value;
    }

    /// Builder-style setter.
    pub fn with(mut self, spacing_type: SpacingType, value: i32) -> Self {
        self.set(spacing_type, Some(value));
        self
    }

    /// Present values in [`SpacingType::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (SpacingType, i32)> + '_ {
        SpacingType::ALL
            .into_iter()
            .filter_map(|t| self.get(t).map(|v| (t, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// True when nothing is set or everything set is zero.
    pub fn is_blank(&self) -> bool {
        self.iter().all(|(_, v)| v == 0)
    }

    /// Fill unset entries from `fallback`.
    pub fn or(self, fallback: &SpacingValues) -> SpacingValues {
        let mut merged = self;
        for t in SpacingType::ALL {
            if merged.get(t).is_none() {
                merged.set(t, fallback.get(t));
            }
        }
        merged
    }

    /// Lenient read of one breakpoint object: unknown keys are ignored,
    /// numbers may be floats (rounded) or numeric strings, `null` is unset.
    fn from_json(value: &Value) -> SpacingValues {
        let mut values = SpacingValues::default();
        let Some(map) = value.as_object() else {
            return values;
        };
        for (key, raw) in map {
            let Some(spacing_type) = SpacingType::from_str(key) else {
                continue;
            };
            values.set(spacing_type, pixel_value(raw));
        }
        values
    }
}

fn pixel_value(raw: &Value) -> Option<i32> {
    let n = match raw {
        Value::Number(n) => n.as_i64().map(|i| i as f64).or_else(|| n.as_f64())?,
        Value::String(s) => s.trim().trim_end_matches("px").trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }
    Some(n.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32)
}

/// Spacing for one block field: breakpoint name → values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpacingData(IndexMap<String, SpacingValues>);

impl SpacingData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the `spacing` prop of a block. Absent or non-object data is empty.
    pub fn from_prop(value: Option<&Value>) -> SpacingData {
        let Some(Value::Object(map)) = value else {
            return SpacingData::default();
        };
        SpacingData(
            map.iter()
                .map(|(name, values)| (name.clone(), SpacingValues::from_json(values)))
                .collect(),
        )
    }

    pub fn get(&self, breakpoint: &str) -> Option<&SpacingValues> {
        self.0.get(breakpoint)
    }

    pub fn insert(&mut self, breakpoint: impl Into<String>, values: SpacingValues) {
        self.0.insert(breakpoint.into(), values);
    }

    /// Set (or unset with `None`) one value.
    pub fn set(&mut self, breakpoint: &str, spacing_type: SpacingType, value: Option<i32>) {
        self.0
            .entry(breakpoint.to_string())
            .or_default()
            .set(spacing_type, value);
    }

    /// Builder-style insert.
    pub fn with(mut self, breakpoint: impl Into<String>, values: SpacingValues) -> Self {
        self.insert(breakpoint, values);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(SpacingValues::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpacingValues)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy with every value clamped and snapped per `config`.
    pub fn normalized(&self, config: &SpacingConfig) -> SpacingData {
        let mut out = self.clone();
        for values in out.0.values_mut() {
            for t in SpacingType::ALL {
                if let Some(v) = values.get(t) {
                    values.set(t, Some(config.normalize(v)));
                }
            }
        }
        out
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A named viewport-width range. `max_width: None` is the unbounded (largest) range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Breakpoint {
    pub fn unbounded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_width: None,
            label: None,
        }
    }

    pub fn up_to(name: impl Into<String>, max_width: u32) -> Self {
        Self {
            name: name.into(),
            max_width: Some(max_width),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_width.is_none()
    }
}

/// Desktop (unbounded), tablet (≤1199px), mobile (≤767px).
pub fn default_breakpoints() -> Vec<Breakpoint> {
    vec![
        Breakpoint::unbounded("desktop").with_label("Desktop"),
        Breakpoint::up_to("tablet", 1199).with_label("Tablet"),
        Breakpoint::up_to("mobile", 767).with_label("Mobile"),
    ]
}

fn default_min() -> i32 {
    0
}

fn default_max() -> i32 {
    200
}

fn default_step() -> i32 {
    4
}

/// Spacing field configuration `{min, max, step, breakpoints}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacingConfig {
    #[serde(default = "default_min")]
    pub min: i32,
    #[serde(default = "default_max")]
    pub max: i32,
    #[serde(default = "default_step")]
    pub step: i32,
    #[serde(default = "default_breakpoints")]
    pub breakpoints: Vec<Breakpoint>,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            min: default_min(),
            max: default_max(),
            step: default_step(),
            breakpoints: default_breakpoints(),
        }
    }
}

impl SpacingConfig {
    /// Clamp into `[min, max]`, then snap to the nearest step above `min`.
    pub fn normalize(&self, value: i32) -> i32 {
        let clamped = value.clamp(self.min, self.max.max(self.min));
        if self.step <= 1 {
            return clamped;
        }
        let offset = (clamped - self.min) as f64 / self.step as f64;
        let snapped = self.min + offset.round() as i32 * self.step;
        snapped.min(self.max)
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Reject configurations no runtime default can repair.
    pub fn validate(&self) -> Result<(), SpacingError> {
        if self.min > self.max {
            return Err(SpacingError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        if self.step <= 0 {
            return Err(SpacingError::InvalidStep(self.step));
        }
        validate_breakpoints(&self.breakpoints)
    }
}

/// Exactly one unbounded breakpoint and no duplicate names.
pub(crate) fn validate_breakpoints(breakpoints: &[Breakpoint]) -> Result<(), SpacingError> {
    let unbounded = breakpoints.iter().filter(|b| b.is_unbounded()).count();
    if unbounded != 1 {
        return Err(SpacingError::UnboundedBreakpoints(unbounded));
    }
    let mut seen = HashSet::new();
    for bp in breakpoints {
        if !seen.insert(bp.name.as_str()) {
            return Err(SpacingError::DuplicateBreakpoint(bp.name.clone()));
        }
    }
    Ok(())
}
