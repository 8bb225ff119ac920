//! Access control entry point
//!
//! Callers ask one question: may these principals exercise this permission
//! on this object? Global roles are consulted first and can only add access;
//! the inherited evaluator answers everything else.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::cache::ObjectAclFactory;
use crate::config::AccessConfig;
use crate::content::{PathResolver, Pid};
use crate::errors::{AclError, Result};
use crate::rbac::{
    AgentPrincipals, GlobalPermissionEvaluator, InheritedAclFactory, InheritedPermissionEvaluator,
    Permission, PrincipalRoles, RoleAssignment,
};
use crate::storage::AclLoader;

/// Façade over the global and inherited evaluators
pub struct AccessControlService {
    global: GlobalPermissionEvaluator,
    inherited: InheritedPermissionEvaluator,
    inherited_acls: InheritedAclFactory,
    object_acls: Arc<ObjectAclFactory>,
}

impl AccessControlService {
    /// Wire the evaluators around one shared ACL cache.
    ///
    /// # Errors
    /// `InvalidConfig` if the global role table or cache settings are rejected.
    pub fn new(
        config: &AccessConfig,
        path_resolver: Arc<dyn PathResolver>,
        acl_loader: Arc<dyn AclLoader>,
    ) -> Result<Self> {
        config.validate()?;

        let global = GlobalPermissionEvaluator::from_config(config)?;
        let object_acls = Arc::new(ObjectAclFactory::new(acl_loader, &config.cache));
        let inherited = InheritedPermissionEvaluator::new(path_resolver.clone(), object_acls.clone());
        let inherited_acls = InheritedAclFactory::new(path_resolver, object_acls.clone());

        Ok(AccessControlService {
            global,
            inherited,
            inherited_acls,
            object_acls,
        })
    }

    /// True if `principals` may exercise `permission` on `target`
    #[instrument(skip(self, principals), fields(principals = %principals))]
    pub fn has_access(
        &self,
        target: &Pid,
        principals: &AgentPrincipals,
        permission: Permission,
    ) -> Result<bool> {
        if self.global.has_global_permission(principals, permission) {
            return Ok(true);
        }

        let granted = self.inherited.has_permission(target, principals, permission)?;
        if !granted {
            debug!(pid = %target, permission = %permission, "Access denied");
        }
        Ok(granted)
    }

    /// Succeeds if access is granted, otherwise fails with an
    /// `AccessRestriction` carrying `message`.
    pub fn assert_has_access(
        &self,
        message: &str,
        target: &Pid,
        principals: &AgentPrincipals,
        permission: Permission,
    ) -> Result<()> {
        if self.has_access(target, principals, permission)? {
            return Ok(());
        }

        Err(AclError::AccessRestriction {
            message: message.to_string(),
            pid: target.clone(),
            permission,
        })
    }

    pub fn get_principal_roles(&self, target: &Pid) -> Result<PrincipalRoles> {
        self.inherited_acls.get_principal_roles(target)
    }

    pub fn get_staff_role_assignments(&self, target: &Pid) -> Result<Vec<RoleAssignment>> {
        self.inherited_acls.get_staff_role_assignments(target)
    }

    pub fn get_patron_role_assignments(&self, target: &Pid) -> Result<Vec<RoleAssignment>> {
        self.inherited_acls.get_patron_role_assignments(target)
    }

    pub fn is_marked_for_deletion(&self, target: &Pid) -> Result<bool> {
        self.inherited_acls.is_marked_for_deletion(target)
    }

    pub fn get_embargo_until(&self, target: &Pid) -> Result<Option<DateTime<Utc>>> {
        self.inherited_acls.get_embargo_until(target)
    }

    pub fn global_permissions(&self) -> &GlobalPermissionEvaluator {
        &self.global
    }

    /// Drop cached facts for `pid` after its ACL was edited
    pub fn invalidate_object(&self, pid: &Pid) {
        self.object_acls.invalidate(pid);
    }

    pub fn invalidate_all(&self) {
        self.object_acls.invalidate_all();
    }
}
