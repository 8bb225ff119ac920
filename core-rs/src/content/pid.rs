//! Object identifiers for nodes in the content tree

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of the canonical content root
pub const CONTENT_ROOT_ID: &str = "collections";

/// Opaque identifier of one node in the content tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(String);

impl Pid {
    pub fn new(id: impl Into<String>) -> Self {
        Pid(id.into())
    }

    /// Mint a fresh identifier for a new object
    pub fn generate() -> Self {
        Pid(Uuid::new_v4().to_string())
    }

    pub fn content_root() -> Self {
        Pid(CONTENT_ROOT_ID.to_string())
    }

    pub fn is_content_root(&self) -> bool {
        self.0 == CONTENT_ROOT_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Pid {
    fn from(id: &str) -> Self {
        Pid::new(id)
    }
}

impl From<String> for Pid {
    fn from(id: String) -> Self {
        Pid(id)
    }
}
