//! Validation outcome: field path → messages.

use indexmap::IndexMap;
use serde::Serialize;

/// Outcome of validating a form.
///
/// Paths are field keys, with repeater items addressed as
/// `cards[2].link`. Paths appear in the order they were validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: IndexMap<String, Vec<String>>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: IndexMap::new(),
        }
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record messages for `path`. An empty list changes nothing.
    pub fn add_errors(&mut self, path: impl Into<String>, messages: Vec<String>) {
        if messages.is_empty() {
            return;
        }
        self.is_valid = false;
        self.errors.entry(path.into()).or_default().extend(messages);
    }

    pub fn errors_for(&self, path: &str) -> &[String] {
        self.errors.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first_error(&self, path: &str) -> Option<&str> {
        self.errors_for(path).first().map(String::as_str)
    }

    pub fn has_errors_for(&self, path: &str) -> bool {
        !self.errors_for(path).is_empty()
    }

    /// Total number of messages across all paths.
    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Fold `other` into this result.
    pub fn merge(&mut self, other: ValidationResult) {
        for (path, messages) in other.errors {
            self.add_errors(path, messages);
        }
    }
}
