//! Inheritance-aware permission evaluation
//!
//! Staff and patron roles inherit differently:
//!
//! - Staff roles are honoured only where they are assigned on the unit or
//!   collection tier. Any staff role deeper in the tree is ignored.
//! - Patron roles start at the collection tier and flow down. A deeper tier
//!   can narrow a principal by reassigning it a role that lacks the
//!   permission, never widen it. Deleted tiers, and embargoed tiers for
//!   anything beyond metadata, deny outright.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::cache::{ObjectAclFactory, ObjectAclFacts};
use crate::content::{ContentPath, PathResolver, Pid};
use crate::errors::Result;
use crate::rbac::role::{role_grants, roles_granting};
use crate::rbac::{AgentPrincipals, Permission};

/// Decides a single permission for an agent on one object
pub struct InheritedPermissionEvaluator {
    path_resolver: Arc<dyn PathResolver>,
    object_acls: Arc<ObjectAclFactory>,
}

impl InheritedPermissionEvaluator {
    pub fn new(path_resolver: Arc<dyn PathResolver>, object_acls: Arc<ObjectAclFactory>) -> Self {
        InheritedPermissionEvaluator {
            path_resolver,
            object_acls,
        }
    }

    /// True if `principals` hold `permission` on `target` through inherited roles.
    ///
    /// # Errors
    /// `OrphanedPath` if the target is not under the content root; storage
    /// failures are passed through.
    #[instrument(skip(self, principals), fields(principals = %principals))]
    pub fn has_permission(
        &self,
        target: &Pid,
        principals: &AgentPrincipals,
        permission: Permission,
    ) -> Result<bool> {
        let path = ContentPath::resolve(self.path_resolver.as_ref(), target)?;

        let staff = principals.staff_principals();
        if !staff.is_empty() && self.has_staff_permission(&path, &staff, permission)? {
            return Ok(true);
        }

        if !permission.is_patron_permission() {
            return Ok(false);
        }

        // Units carry no patron restriction, whoever is asking.
        if path.ends_at_unit() {
            return Ok(true);
        }

        let patrons = principals.patron_principals();
        if patrons.is_empty() {
            return Ok(false);
        }
        self.has_patron_permission(&path, &patrons, permission, Utc::now())
    }

    fn has_staff_permission(
        &self,
        path: &ContentPath,
        staff: &BTreeSet<&str>,
        permission: Permission,
    ) -> Result<bool> {
        let granting = roles_granting(permission);

        for (depth, pid) in path.staff_tiers() {
            let facts = self.object_acls.get_facts(pid)?;
            for principal in staff {
                let holds = facts
                    .roles_for(principal)
                    .map(|roles| roles.iter().any(|r| r.is_staff_role() && granting.contains(r)))
                    .unwrap_or(false);
                if holds {
                    debug!(pid = %pid, depth, principal = %principal, "Granted by staff role");
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    fn has_patron_permission(
        &self,
        path: &ContentPath,
        patrons: &BTreeSet<&str>,
        permission: Permission,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut active: Option<BTreeSet<String>> = None;

        for (depth, pid) in path.patron_tiers() {
            let facts = self.object_acls.get_facts(pid)?;

            if facts.is_deleted() {
                debug!(pid = %pid, depth, "Denied: tier is marked for deletion");
                return Ok(false);
            }
            if permission != Permission::ViewMetadata && facts.is_embargoed_at(now) {
                debug!(pid = %pid, depth, "Denied: tier is embargoed");
                return Ok(false);
            }

            let seeded = match active.take() {
                Some(previous) => previous,
                None => seed_patrons(patrons, &facts),
            };
            let narrowed = narrow_patrons(&seeded, &facts, permission);
            if narrowed.is_empty() {
                debug!(pid = %pid, depth, "Denied: no patron principal retains access");
                return Ok(false);
            }
            active = Some(narrowed);
        }

        // A path with no patron tiers stops at the content root.
        Ok(active.is_some())
    }
}

/// Patron principals of the caller that hold any patron role on the collection
pub fn seed_patrons(patrons: &BTreeSet<&str>, collection: &ObjectAclFacts) -> BTreeSet<String> {
    patrons
        .iter()
        .filter(|p| collection.has_patron_role(p))
        .map(|p| p.to_string())
        .collect()
}

/// Principals still active after one tier.
///
/// A principal reassigned at this tier stays only if one of its new patron
/// roles grants `permission`; a principal not reassigned keeps what it
/// inherited.
pub fn narrow_patrons(
    active: &BTreeSet<String>,
    tier: &ObjectAclFacts,
    permission: Permission,
) -> BTreeSet<String> {
    active
        .iter()
        .filter(|principal| {
            let reassigned: Vec<_> = tier
                .roles_for(principal)
                .map(|roles| roles.iter().filter(|r| r.is_patron_role()).collect())
                .unwrap_or_default();
            reassigned.is_empty() || reassigned.iter().any(|r| role_grants(**r, permission))
        })
        .cloned()
        .collect()
}
