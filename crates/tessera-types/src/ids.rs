//! Block identifiers.
//!
//! Block ids are opaque to the core: the host (or its repository) picks them,
//! the core only compares them. They serialize as bare strings so persisted
//! records stay readable by non-Rust tooling.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an id from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("block id must not be empty")]
    Empty,
}

/// Opaque block identifier, unique within a store.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Wrap an id chosen by the host. No validation beyond what the host guarantees.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse from untrusted input, rejecting blank ids.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for BlockId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BlockId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
