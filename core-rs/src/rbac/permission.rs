//! Fine-grained capabilities checked against the access-control model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AclError;

/// A capability requested by an agent on an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    ViewHidden,
    ViewMetadata,
    ViewAccessCopies,
    ViewOriginal,
    Ingest,
    EditDescription,
    BulkUpdateDescription,
    EditResourceType,
    Move,
    MarkForDeletion,
    MarkForDeletionUnit,
    Destroy,
    DestroyUnit,
    ChangePatronAccess,
    RunEnhancements,
    CreateCollection,
    CreateAdminUnit,
    AssignStaffRoles,
    Reindex,
}

/// Permissions that patron roles can grant
pub const PATRON_PERMISSIONS: [Permission; 3] = [
    Permission::ViewMetadata,
    Permission::ViewAccessCopies,
    Permission::ViewOriginal,
];

impl Permission {
    pub const ALL: [Permission; 19] = [
        Permission::ViewHidden,
        Permission::ViewMetadata,
        Permission::ViewAccessCopies,
        Permission::ViewOriginal,
        Permission::Ingest,
        Permission::EditDescription,
        Permission::BulkUpdateDescription,
        Permission::EditResourceType,
        Permission::Move,
        Permission::MarkForDeletion,
        Permission::MarkForDeletionUnit,
        Permission::Destroy,
        Permission::DestroyUnit,
        Permission::ChangePatronAccess,
        Permission::RunEnhancements,
        Permission::CreateCollection,
        Permission::CreateAdminUnit,
        Permission::AssignStaffRoles,
        Permission::Reindex,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Permission::ViewHidden => "viewHidden",
            Permission::ViewMetadata => "viewMetadata",
            Permission::ViewAccessCopies => "viewAccessCopies",
            Permission::ViewOriginal => "viewOriginal",
            Permission::Ingest => "ingest",
            Permission::EditDescription => "editDescription",
            Permission::BulkUpdateDescription => "bulkUpdateDescription",
            Permission::EditResourceType => "editResourceType",
            Permission::Move => "move",
            Permission::MarkForDeletion => "markForDeletion",
            Permission::MarkForDeletionUnit => "markForDeletionUnit",
            Permission::Destroy => "destroy",
            Permission::DestroyUnit => "destroyUnit",
            Permission::ChangePatronAccess => "changePatronAccess",
            Permission::RunEnhancements => "runEnhancements",
            Permission::CreateCollection => "createCollection",
            Permission::CreateAdminUnit => "createAdminUnit",
            Permission::AssignStaffRoles => "assignStaffRoles",
            Permission::Reindex => "reindex",
        }
    }

    /// True if patron roles can grant this permission
    pub fn is_patron_permission(&self) -> bool {
        PATRON_PERMISSIONS.contains(self)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Permission {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| AclError::InvalidConfig(format!("Unknown permission: {}", s)))
    }
}
