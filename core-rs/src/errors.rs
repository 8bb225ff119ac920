//! Error types for the ACL core

use std::sync::Arc;

use thiserror::Error;

use crate::content::Pid;
use crate::rbac::Permission;

#[derive(Error, Debug)]
pub enum AclError {
    /// The resolved ancestor path does not start at the content root.
    #[error("Orphaned object {pid}: path begins at {first} instead of the content root")]
    OrphanedPath { pid: Pid, first: Pid },

    /// Denial raised by `assert_has_access`, carrying the caller's message.
    #[error("{message}")]
    AccessRestriction {
        message: String,
        pid: Pid,
        permission: Permission,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage error: {0}")]
    Storage(Arc<StoreError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl AclError {
    /// True for the expected negative outcome of an access assertion.
    pub fn is_access_restriction(&self) -> bool {
        matches!(self, AclError::AccessRestriction { .. })
    }
}

/// Failures raised by the storage collaborators.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Object not found: {0}")]
    NotFound(Pid),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for AclError {
    fn from(err: StoreError) -> Self {
        AclError::Storage(Arc::new(err))
    }
}

impl From<Arc<StoreError>> for AclError {
    fn from(err: Arc<StoreError>) -> Self {
        AclError::Storage(err)
    }
}

pub type Result<T> = std::result::Result<T, AclError>;
