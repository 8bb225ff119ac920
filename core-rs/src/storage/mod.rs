// storage/mod.rs - Storage collaborators supplying raw ACL facts

pub mod memory;

pub use memory::MemoryRepository;

use serde::{Deserialize, Serialize};

use crate::content::Pid;
use crate::errors::StoreError;
use crate::rbac::Role;

/// Namespace of every ACL predicate
pub const ACL_NAMESPACE: &str = "http://repository.local/definitions/acl#";

/// Local name of the embargo predicate
pub const EMBARGO_UNTIL: &str = "embargoUntil";

/// Local name of the deletion marker predicate
pub const MARKED_FOR_DELETION: &str = "markedForDeletion";

/// One already-extracted statement attached directly to an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclStatement {
    pub predicate: String,
    pub value: String,
}

impl AclStatement {
    pub fn new(predicate: impl Into<String>, value: impl Into<String>) -> Self {
        AclStatement {
            predicate: predicate.into(),
            value: value.into(),
        }
    }

    /// `principal` holds `role` on the object
    pub fn role(role: Role, principal: impl Into<String>) -> Self {
        AclStatement::new(acl_predicate(role.name()), principal)
    }

    pub fn embargo_until(value: impl Into<String>) -> Self {
        AclStatement::new(acl_predicate(EMBARGO_UNTIL), value)
    }

    pub fn marked_for_deletion(marked: bool) -> Self {
        AclStatement::new(acl_predicate(MARKED_FOR_DELETION), marked.to_string())
    }

    /// Local name of the predicate if it is in the ACL namespace
    pub fn acl_local_name(&self) -> Option<&str> {
        self.predicate.strip_prefix(ACL_NAMESPACE)
    }
}

/// Full predicate URI for an ACL local name
pub fn acl_predicate(local_name: &str) -> String {
    format!("{}{}", ACL_NAMESPACE, local_name)
}

/// Everything the storage layer knows about one object's own ACLs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAclFacts {
    pub statements: Vec<AclStatement>,
    pub is_tombstone: bool,
}

/// Loads the ACL statements attached directly to an object.
///
/// Implementations own any retry or timeout policy; failures are passed
/// through to the caller unchanged.
pub trait AclLoader: Send + Sync {
    fn load_acl_facts(&self, pid: &Pid) -> std::result::Result<RawAclFacts, StoreError>;
}
