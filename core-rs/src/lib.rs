//! # ACL Core - Repository Authorization
//!
//! Decides whether a set of principals may exercise a permission on an
//! object in a hierarchical content repository, and reports the roles in
//! effect on an object for administrative tooling.
//!
//! ## Content Tree
//!
//! ```text
//! collections (content root, depth 0)
//!   └── administrative unit (depth 1)
//!         └── collection (depth 2)
//!               └── folder / work / file (depth 3+)
//! ```
//!
//! ## Key Rules
//!
//! - Staff roles count only where assigned on the unit or collection
//! - Patron roles start at the collection and may only narrow below it
//! - Embargoed or deleted tiers cut off patron access beneath them
//! - Configured global roles grant everywhere and are checked first
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use acl_core::{AccessConfig, AccessControlService, AgentPrincipals, MemoryRepository, Permission, Pid};
//!
//! # fn main() -> acl_core::errors::Result<()> {
//! let repo = Arc::new(MemoryRepository::load("repository.yaml")?);
//! let config = AccessConfig::load("access.yaml")?;
//! let acl = AccessControlService::new(&config, repo.clone(), repo)?;
//!
//! let allowed = acl.has_access(&Pid::new("file1"), &AgentPrincipals::anonymous(), Permission::ViewMetadata)?;
//! # let _ = allowed;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod content;
pub mod errors;
pub mod logging;
pub mod rbac;
pub mod storage;

pub use cache::{ObjectAclFactory, ObjectAclFacts, ParsedEmbargo};
pub use config::{AccessConfig, CacheConfig};
pub use content::{ContentPath, PathResolver, Pid, CONTENT_ROOT_ID};
pub use errors::{AclError, StoreError};
pub use rbac::{
    AccessControlService, AgentPrincipals, GlobalPermissionEvaluator, InheritedAclFactory,
    InheritedPermissionEvaluator, Permission, PrincipalRoles, Role, RoleAssignment,
};
pub use storage::{AclLoader, MemoryRepository, RawAclFacts};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
