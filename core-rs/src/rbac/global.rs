//! Global role overrides
//!
//! Statically configured principals hold a staff role everywhere in the
//! repository. The principal → permission table is expanded once at
//! construction and only read afterwards.

use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::config::AccessConfig;
use crate::errors::{AclError, Result};
use crate::rbac::role::permissions_for;
use crate::rbac::{AgentPrincipals, Permission, Role};

/// Parse one global role entry, rejecting unknown and patron roles
pub fn parse_global_role(principal: &str, role_name: &str) -> Result<Role> {
    let role: Role = role_name.parse().map_err(|_| {
        AclError::InvalidConfig(format!(
            "Unknown global role '{}' for principal '{}'",
            role_name, principal
        ))
    })?;

    if role.is_patron_role() {
        return Err(AclError::InvalidConfig(format!(
            "Patron role '{}' cannot be assigned globally (principal '{}')",
            role_name, principal
        )));
    }

    Ok(role)
}

/// Evaluates configured global roles; no tree traversal, no I/O
#[derive(Debug, Clone, Default)]
pub struct GlobalPermissionEvaluator {
    principal_roles: HashMap<String, Role>,
    principal_permissions: HashMap<String, HashSet<Permission>>,
}

impl GlobalPermissionEvaluator {
    /// Build from `(principal, role name)` entries.
    ///
    /// # Errors
    /// `InvalidConfig` for an unknown role, a patron role, or a principal
    /// listed more than once.
    pub fn new<I, P, R>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, R)>,
        P: AsRef<str>,
        R: AsRef<str>,
    {
        let mut principal_roles = HashMap::new();
        for (principal, role_name) in entries {
            let principal = principal.as_ref();
            let role = parse_global_role(principal, role_name.as_ref())?;
            if principal_roles.insert(principal.to_string(), role).is_some() {
                return Err(AclError::InvalidConfig(format!(
                    "Principal '{}' is assigned more than one global role",
                    principal
                )));
            }
        }

        let principal_permissions = principal_roles
            .iter()
            .map(|(principal, role)| (principal.clone(), permissions_for(*role).clone()))
            .collect();

        Ok(GlobalPermissionEvaluator {
            principal_roles,
            principal_permissions,
        })
    }

    pub fn from_config(config: &AccessConfig) -> Result<Self> {
        Self::new(&config.global_roles)
    }

    /// True if any of the agent's principals holds `permission` globally
    pub fn has_global_permission(&self, principals: &AgentPrincipals, permission: Permission) -> bool {
        let granted = principals.iter().find(|principal| {
            self.principal_permissions
                .get(*principal)
                .map(|perms| perms.contains(&permission))
                .unwrap_or(false)
        });

        if let Some(principal) = granted {
            debug!(principal = %principal, permission = %permission, "Granted by global role");
            return true;
        }
        false
    }

    pub fn global_role(&self, principal: &str) -> Option<Role> {
        self.principal_roles.get(principal).copied()
    }

    /// Global roles held by any of the agent's principals
    pub fn global_roles_for(&self, principals: &AgentPrincipals) -> BTreeMap<String, Role> {
        principals
            .iter()
            .filter_map(|p| self.global_role(p).map(|role| (p.to_string(), role)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.principal_roles.is_empty()
    }
}
