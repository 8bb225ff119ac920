//! Roles and the static role/permission tables
//!
//! A role is a plain tagged value. The permissions each role carries live in
//! tables built once, on first use, and never mutated afterwards:
//!
//! ```text
//! patron: none ⊂ canViewMetadata ⊂ canViewAccessCopies ⊂ canViewOriginals
//! staff:  canAccess ⊂ canDescribe ⊂ canProcess ⊂ canManage ⊂ unitOwner ⊂ administrator
//!         canAccess ⊂ canIngest
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::content::Pid;
use crate::errors::AclError;
use crate::rbac::Permission;

/// Which inheritance rules a role follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Staff,
    Patron,
}

/// A named bundle of permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    // Patron roles
    None,
    CanViewMetadata,
    CanViewAccessCopies,
    CanViewOriginals,
    // Staff roles
    CanAccess,
    CanIngest,
    CanDescribe,
    CanProcess,
    CanManage,
    UnitOwner,
    Administrator,
}

/// Patron roles, lowest first. Each grants everything the previous one does.
pub const PATRON_ROLE_CHAIN: [Role; 4] = [
    Role::None,
    Role::CanViewMetadata,
    Role::CanViewAccessCopies,
    Role::CanViewOriginals,
];

impl Role {
    pub const ALL: [Role; 11] = [
        Role::None,
        Role::CanViewMetadata,
        Role::CanViewAccessCopies,
        Role::CanViewOriginals,
        Role::CanAccess,
        Role::CanIngest,
        Role::CanDescribe,
        Role::CanProcess,
        Role::CanManage,
        Role::UnitOwner,
        Role::Administrator,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Role::None => "none",
            Role::CanViewMetadata => "canViewMetadata",
            Role::CanViewAccessCopies => "canViewAccessCopies",
            Role::CanViewOriginals => "canViewOriginals",
            Role::CanAccess => "canAccess",
            Role::CanIngest => "canIngest",
            Role::CanDescribe => "canDescribe",
            Role::CanProcess => "canProcess",
            Role::CanManage => "canManage",
            Role::UnitOwner => "unitOwner",
            Role::Administrator => "administrator",
        }
    }

    pub fn kind(&self) -> RoleKind {
        if PATRON_ROLE_CHAIN.contains(self) {
            RoleKind::Patron
        } else {
            RoleKind::Staff
        }
    }

    pub fn is_patron_role(&self) -> bool {
        self.kind() == RoleKind::Patron
    }

    pub fn is_staff_role(&self) -> bool {
        self.kind() == RoleKind::Staff
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.name() == s)
            .ok_or_else(|| AclError::InvalidConfig(format!("Unknown role: {}", s)))
    }
}

/// A role held by a principal, materialized with the object it was assigned on
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub principal: String,
    pub role: Role,
    pub assigned_to: Pid,
}

impl RoleAssignment {
    pub fn new(principal: impl Into<String>, role: Role, assigned_to: Pid) -> Self {
        RoleAssignment {
            principal: principal.into(),
            role,
            assigned_to,
        }
    }
}

static ROLE_PERMISSIONS: Lazy<HashMap<Role, HashSet<Permission>>> = Lazy::new(|| {
    use Permission::*;

    let metadata = vec![ViewMetadata];
    let access_copies = [metadata.clone(), vec![ViewAccessCopies]].concat();
    let originals = [access_copies.clone(), vec![ViewOriginal]].concat();

    let can_access = [originals.clone(), vec![ViewHidden]].concat();
    let can_ingest = [can_access.clone(), vec![Ingest]].concat();
    let can_describe = [can_access.clone(), vec![EditDescription, BulkUpdateDescription]].concat();
    let can_process = [
        can_describe.clone(),
        vec![Ingest, Move, ChangePatronAccess, EditResourceType],
    ]
    .concat();
    let can_manage = [can_process.clone(), vec![MarkForDeletion, RunEnhancements]].concat();
    let unit_owner = [
        can_manage.clone(),
        vec![CreateCollection, AssignStaffRoles, Destroy, MarkForDeletionUnit],
    ]
    .concat();

    let table: Vec<(Role, Vec<Permission>)> = vec![
        (Role::None, vec![]),
        (Role::CanViewMetadata, metadata),
        (Role::CanViewAccessCopies, access_copies),
        (Role::CanViewOriginals, originals),
        (Role::CanAccess, can_access),
        (Role::CanIngest, can_ingest),
        (Role::CanDescribe, can_describe),
        (Role::CanProcess, can_process),
        (Role::CanManage, can_manage),
        (Role::UnitOwner, unit_owner),
        (Role::Administrator, Permission::ALL.to_vec()),
    ];

    table
        .into_iter()
        .map(|(role, perms)| (role, perms.into_iter().collect()))
        .collect()
});

static PERMISSION_ROLES: Lazy<HashMap<Permission, HashSet<Role>>> = Lazy::new(|| {
    let mut reverse: HashMap<Permission, HashSet<Role>> = HashMap::new();
    for (role, perms) in ROLE_PERMISSIONS.iter() {
        for permission in perms {
            reverse.entry(*permission).or_default().insert(*role);
        }
    }
    reverse
});

static NO_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(HashSet::new);
static NO_ROLES: Lazy<HashSet<Role>> = Lazy::new(HashSet::new);

/// Permissions carried by `role`
pub fn permissions_for(role: Role) -> &'static HashSet<Permission> {
    ROLE_PERMISSIONS.get(&role).unwrap_or(&NO_PERMISSIONS)
}

/// Roles whose permission set contains `permission`
pub fn roles_granting(permission: Permission) -> &'static HashSet<Role> {
    PERMISSION_ROLES.get(&permission).unwrap_or(&NO_ROLES)
}

pub fn role_grants(role: Role, permission: Permission) -> bool {
    permissions_for(role).contains(&permission)
}

/// Position of a patron role in the patron chain, `None` for staff roles
pub fn patron_rank(role: Role) -> Option<usize> {
    PATRON_ROLE_CHAIN.iter().position(|r| *r == role)
}

/// Highest patron role among `roles`, ignoring staff roles
pub fn highest_patron_role<'a>(roles: impl IntoIterator<Item = &'a Role>) -> Option<Role> {
    roles
        .into_iter()
        .filter_map(|r| patron_rank(*r).map(|rank| (rank, *r)))
        .max_by_key(|(rank, _)| *rank)
        .map(|(_, r)| r)
}

/// The more restrictive of two patron roles
pub fn lowest_patron_role(a: Role, b: Role) -> Role {
    match (patron_rank(a), patron_rank(b)) {
        (Some(ra), Some(rb)) if rb < ra => b,
        (Some(_), _) => a,
        (None, _) => b,
    }
}
