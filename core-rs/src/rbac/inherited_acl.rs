//! Effective role accumulation for administrative views
//!
//! Walks the same path as the permission evaluator but, instead of answering
//! one permission, collects every role in effect on the target. Staff roles
//! of staff principals are the union of what the unit and collection assign.
//! Patron roles of patron principals are seeded at the collection and
//! narrowed on the way down: a reassignment can only lower a principal's
//! role, an active embargo caps it at `canViewMetadata`, and a deleted tier
//! clears every patron role.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::cache::{ObjectAclFactory, ObjectAclFacts};
use crate::content::{ContentPath, PathResolver, Pid, COLLECTION_DEPTH};
use crate::errors::Result;
use crate::rbac::principal::{is_patron_principal, is_staff_principal, PUBLIC_PRINC};
use crate::rbac::role::{highest_patron_role, lowest_patron_role};
use crate::rbac::{Role, RoleAssignment};

/// Principal to the set of roles it holds on an object
pub type PrincipalRoles = HashMap<String, HashSet<Role>>;

/// Effective patron role per principal, keyed by principal
pub type PatronRoles = BTreeMap<String, RoleAssignment>;

/// Accumulates the roles that apply to an object through inheritance
pub struct InheritedAclFactory {
    path_resolver: Arc<dyn PathResolver>,
    object_acls: Arc<ObjectAclFactory>,
}

impl InheritedAclFactory {
    pub fn new(path_resolver: Arc<dyn PathResolver>, object_acls: Arc<ObjectAclFactory>) -> Self {
        InheritedAclFactory {
            path_resolver,
            object_acls,
        }
    }

    /// Every principal's roles in effect on `target`
    #[instrument(skip(self))]
    pub fn get_principal_roles(&self, target: &Pid) -> Result<PrincipalRoles> {
        let path = self.resolve(target)?;
        let mut result: PrincipalRoles = HashMap::new();

        for (_, pid) in path.staff_tiers() {
            let facts = self.object_acls.get_facts(pid)?;
            for (principal, roles) in facts.principal_roles() {
                if is_staff_principal(principal) {
                    result
                        .entry(principal.clone())
                        .or_default()
                        .extend(roles.iter().copied().filter(Role::is_staff_role));
                }
            }
        }
        result.retain(|_, roles| !roles.is_empty());

        if path.ends_at_unit() {
            // Units carry an assumed default rather than a stored one.
            result
                .entry(PUBLIC_PRINC.to_string())
                .or_default()
                .insert(Role::CanViewOriginals);
            return Ok(result);
        }

        let patrons = self.effective_patron_roles(&path, Utc::now())?;

        for (principal, assignment) in patrons {
            result.entry(principal).or_default().insert(assignment.role);
        }

        debug!(pid = %target, principals = result.len(), "Accumulated principal roles");
        Ok(result)
    }

    /// Staff roles in effect on `target`, each with the tier that assigned it
    pub fn get_staff_role_assignments(&self, target: &Pid) -> Result<Vec<RoleAssignment>> {
        let path = self.resolve(target)?;
        let mut assignments = Vec::new();

        for (_, pid) in path.staff_tiers() {
            let facts = self.object_acls.get_facts(pid)?;
            assignments.extend(
                facts
                    .staff_role_assignments()
                    .into_iter()
                    .filter(|a| is_staff_principal(&a.principal)),
            );
        }

        Ok(assignments)
    }

    /// Effective patron role of each patron principal that retains access
    pub fn get_patron_role_assignments(&self, target: &Pid) -> Result<Vec<RoleAssignment>> {
        let path = self.resolve(target)?;
        if path.ends_at_unit() {
            return Ok(vec![RoleAssignment::new(
                PUBLIC_PRINC,
                Role::CanViewOriginals,
                target.clone(),
            )]);
        }

        let patrons = self.effective_patron_roles(&path, Utc::now())?;
        Ok(patrons.into_values().collect())
    }

    /// True if any tier from the collection down to `target` is marked for
    /// deletion or tombstoned
    pub fn is_marked_for_deletion(&self, target: &Pid) -> Result<bool> {
        let path = self.resolve(target)?;
        for (_, pid) in path.patron_tiers() {
            if self.object_acls.get_facts(pid)?.is_deleted() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Latest still-active embargo from the collection down to `target`
    pub fn get_embargo_until(&self, target: &Pid) -> Result<Option<DateTime<Utc>>> {
        let path = self.resolve(target)?;
        let now = Utc::now();
        let mut latest: Option<DateTime<Utc>> = None;

        for (_, pid) in path.patron_tiers() {
            let facts = self.object_acls.get_facts(pid)?;
            if let Some(until) = facts.embargo_until().filter(|until| now < *until) {
                latest = Some(latest.map_or(until, |l| l.max(until)));
            }
        }

        Ok(latest)
    }

    fn resolve(&self, target: &Pid) -> Result<ContentPath> {
        ContentPath::resolve(self.path_resolver.as_ref(), target)
    }

    fn effective_patron_roles(&self, path: &ContentPath, now: DateTime<Utc>) -> Result<PatronRoles> {
        let mut patrons = PatronRoles::new();

        for (depth, pid) in path.patron_tiers() {
            let facts = self.object_acls.get_facts(pid)?;
            patrons = next_patron_tier(&patrons, &facts, depth == COLLECTION_DEPTH, now);
            if patrons.is_empty() {
                break;
            }
        }

        Ok(patrons)
    }
}

/// Effective patron roles after one tier, as a pure function of the
/// previous tier's result and this tier's facts.
pub fn next_patron_tier(
    previous: &PatronRoles,
    tier: &ObjectAclFacts,
    is_collection: bool,
    now: DateTime<Utc>,
) -> PatronRoles {
    if tier.is_deleted() {
        return PatronRoles::new();
    }

    let mut next: PatronRoles = if is_collection {
        tier.principal_roles()
            .iter()
            .filter(|(principal, _)| is_patron_principal(principal))
            .filter_map(|(principal, roles)| {
                highest_patron_role(roles).map(|role| {
                    (
                        principal.clone(),
                        RoleAssignment::new(principal.clone(), role, tier.pid().clone()),
                    )
                })
            })
            .collect()
    } else {
        previous
            .iter()
            .map(|(principal, current)| {
                let reassigned = tier.roles_for(principal).and_then(|roles| highest_patron_role(roles));
                let assignment = match reassigned {
                    Some(role) if lowest_patron_role(current.role, role) != current.role => {
                        RoleAssignment::new(principal.clone(), role, tier.pid().clone())
                    }
                    _ => current.clone(),
                };
                (principal.clone(), assignment)
            })
            .collect()
    };

    if tier.is_embargoed_at(now) {
        for assignment in next.values_mut() {
            if lowest_patron_role(assignment.role, Role::CanViewMetadata) != assignment.role {
                assignment.role = Role::CanViewMetadata;
                assignment.assigned_to = tier.pid().clone();
            }
        }
    }

    next.retain(|_, assignment| assignment.role != Role::None);
    next
}
