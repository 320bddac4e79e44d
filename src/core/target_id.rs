//! Target identification - WHICH build-graph variant.
//!
//! A TargetId is the stable identifier the external build system assigns to
//! one configuration/platform variant of a buildable unit. Ordering is
//! lexical, which the generator relies on for deterministic output.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A stable identifier for one BuildTarget.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Create a new target ID.
    pub fn new(id: impl Into<String>) -> Self {
        TargetId(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(s: &str) -> Self {
        TargetId::new(s)
    }
}

impl From<String> for TargetId {
    fn from(s: String) -> Self {
        TargetId(s)
    }
}

impl Borrow<str> for TargetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
