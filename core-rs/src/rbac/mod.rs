//! RBAC (Role-Based Access Control) module
//!
//! Permissions and roles, principal classification, and the evaluators that
//! decide access: global role overrides, inheritance along the content tree,
//! and the `AccessControlService` façade that combines them.

pub mod access_control;
pub mod global;
pub mod inherited;
pub mod inherited_acl;
pub mod permission;
pub mod principal;
pub mod role;

pub use access_control::AccessControlService;
pub use global::GlobalPermissionEvaluator;
pub use inherited::InheritedPermissionEvaluator;
pub use inherited_acl::{InheritedAclFactory, PatronRoles, PrincipalRoles};
pub use permission::{Permission, PATRON_PERMISSIONS};
pub use principal::{
    AgentPrincipals, AUTHENTICATED_PRINC, IP_PRINC_NAMESPACE, PATRON_NAMESPACE, PUBLIC_PRINC,
};
pub use role::{Role, RoleAssignment, RoleKind, PATRON_ROLE_CHAIN};
