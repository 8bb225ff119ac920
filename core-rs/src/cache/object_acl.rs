//! Cache of the ACL facts attached directly to each object
//!
//! Entries are whole immutable values. A refresh (TTL expiry or explicit
//! invalidation) replaces the entry; nothing is updated in place.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use moka::sync::Cache;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{CacheConfig, MAX_CACHE_TTL_SECONDS};
use crate::content::Pid;
use crate::errors::{AclError, Result, StoreError};
use crate::rbac::{Role, RoleAssignment};
use crate::storage::{AclLoader, RawAclFacts, EMBARGO_UNTIL, MARKED_FOR_DELETION};

/// Outcome of reading a raw embargo value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEmbargo {
    Until(DateTime<Utc>),
    Absent,
    Malformed(String),
}

impl ParsedEmbargo {
    /// Accepts RFC 3339 datetimes, zone-less datetimes (read as UTC) and
    /// plain `YYYY-MM-DD` dates (midnight UTC).
    pub fn parse(value: Option<&str>) -> Self {
        let raw = match value.map(str::trim) {
            None => return ParsedEmbargo::Absent,
            Some("") => return ParsedEmbargo::Absent,
            Some(raw) => raw,
        };

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return ParsedEmbargo::Until(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return ParsedEmbargo::Until(Utc.from_utc_datetime(&naive));
        }
        if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return ParsedEmbargo::Until(Utc.from_utc_datetime(&naive));
        }

        ParsedEmbargo::Malformed(raw.to_string())
    }
}

/// ACL facts attached directly to one object (no inheritance)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectAclFacts {
    pid: Pid,
    principal_roles: HashMap<String, HashSet<Role>>,
    embargo_until: Option<DateTime<Utc>>,
    marked_for_deletion: bool,
    is_tombstone: bool,
}

impl ObjectAclFacts {
    /// Interpret raw statements. Only ACL-namespaced predicates are read;
    /// a malformed embargo is logged and treated as absent.
    pub fn from_raw(pid: Pid, raw: RawAclFacts) -> Self {
        let mut principal_roles: HashMap<String, HashSet<Role>> = HashMap::new();
        let mut embargo_until: Option<DateTime<Utc>> = None;
        let mut marked_for_deletion = false;

        for statement in &raw.statements {
            let local_name = match statement.acl_local_name() {
                Some(name) => name,
                None => continue,
            };

            match local_name {
                EMBARGO_UNTIL => match ParsedEmbargo::parse(Some(&statement.value)) {
                    ParsedEmbargo::Until(until) => {
                        embargo_until = Some(embargo_until.map_or(until, |e| e.max(until)));
                    }
                    ParsedEmbargo::Absent => {}
                    ParsedEmbargo::Malformed(value) => {
                        warn!(pid = %pid, value = %value, "Ignoring malformed embargo value");
                    }
                },
                MARKED_FOR_DELETION => {
                    marked_for_deletion |= statement.value.trim().eq_ignore_ascii_case("true");
                }
                name => match name.parse::<Role>() {
                    Ok(role) => {
                        principal_roles
                            .entry(statement.value.clone())
                            .or_default()
                            .insert(role);
                    }
                    Err(_) => {
                        debug!(pid = %pid, predicate = %statement.predicate, "Ignoring unknown ACL predicate");
                    }
                },
            }
        }

        ObjectAclFacts {
            pid,
            principal_roles,
            embargo_until,
            marked_for_deletion,
            is_tombstone: raw.is_tombstone,
        }
    }

    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    pub fn principal_roles(&self) -> &HashMap<String, HashSet<Role>> {
        &self.principal_roles
    }

    pub fn roles_for(&self, principal: &str) -> Option<&HashSet<Role>> {
        self.principal_roles.get(principal)
    }

    /// True if `principal` holds any patron role directly on this object
    pub fn has_patron_role(&self, principal: &str) -> bool {
        self.roles_for(principal)
            .map(|roles| roles.iter().any(Role::is_patron_role))
            .unwrap_or(false)
    }

    pub fn embargo_until(&self) -> Option<DateTime<Utc>> {
        self.embargo_until
    }

    pub fn is_embargoed_at(&self, now: DateTime<Utc>) -> bool {
        self.embargo_until.map(|until| now < until).unwrap_or(false)
    }

    pub fn is_marked_for_deletion(&self) -> bool {
        self.marked_for_deletion
    }

    pub fn is_tombstone(&self) -> bool {
        self.is_tombstone
    }

    /// Deleted for patron purposes: marked for deletion or tombstoned
    pub fn is_deleted(&self) -> bool {
        self.marked_for_deletion || self.is_tombstone
    }

    pub fn staff_role_assignments(&self) -> Vec<RoleAssignment> {
        self.assignments(Role::is_staff_role)
    }

    pub fn patron_role_assignments(&self) -> Vec<RoleAssignment> {
        self.assignments(Role::is_patron_role)
    }

    fn assignments(&self, keep: fn(&Role) -> bool) -> Vec<RoleAssignment> {
        let mut assignments: Vec<RoleAssignment> = self
            .principal_roles
            .iter()
            .flat_map(|(principal, roles)| {
                roles
                    .iter()
                    .filter(|r| keep(r))
                    .map(move |role| RoleAssignment::new(principal.clone(), *role, self.pid.clone()))
            })
            .collect();
        assignments.sort();
        assignments
    }
}

/// Loads and caches [`ObjectAclFacts`] by object id.
///
/// Concurrent lookups of the same uncached id share one load; lookups of
/// different ids load independently.
pub struct ObjectAclFactory {
    loader: Arc<dyn AclLoader>,
    cache: Cache<Pid, Arc<ObjectAclFacts>>,
}

impl ObjectAclFactory {
    pub fn new(loader: Arc<dyn AclLoader>, config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_size)
            .time_to_live(Duration::from_secs(config.ttl_seconds.min(MAX_CACHE_TTL_SECONDS)))
            .build();
        ObjectAclFactory { loader, cache }
    }

    /// Facts for `pid`, loading them on a cache miss
    pub fn get_facts(&self, pid: &Pid) -> Result<Arc<ObjectAclFacts>> {
        self.cache
            .try_get_with(pid.clone(), || {
                debug!(pid = %pid, "Loading ACL facts");
                let raw = self.loader.load_acl_facts(pid)?;
                Ok::<_, StoreError>(Arc::new(ObjectAclFacts::from_raw(pid.clone(), raw)))
            })
            .map_err(AclError::Storage)
    }

    /// Drop the cached entry for `pid`; the next lookup reloads it.
    pub fn invalidate(&self, pid: &Pid) {
        debug!(pid = %pid, "Invalidating cached ACL facts");
        self.cache.invalidate(pid);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn get_principal_roles(&self, pid: &Pid) -> Result<HashMap<String, HashSet<Role>>> {
        Ok(self.get_facts(pid)?.principal_roles().clone())
    }

    pub fn get_embargo_until(&self, pid: &Pid) -> Result<Option<DateTime<Utc>>> {
        Ok(self.get_facts(pid)?.embargo_until())
    }

    pub fn is_marked_for_deletion(&self, pid: &Pid) -> Result<bool> {
        Ok(self.get_facts(pid)?.is_deleted())
    }
}
