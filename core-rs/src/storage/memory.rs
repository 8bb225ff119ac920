//! In-memory content tree implementing both storage collaborators
//!
//! Used for embedding and tests. Trees can be built programmatically or
//! loaded from a YAML/JSON fixture:
//!
//! ```yaml
//! objects:
//!   - id: u1
//!     parent: collections
//!     roles:
//!       grp1: [canManage]
//!   - id: c1
//!     parent: u1
//!     roles:
//!       everyone: [canViewAccessCopies]
//!   - id: file1
//!     parent: c1
//!     embargoUntil: "2099-01-01"
//!     markedForDeletion: false
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::content::{PathResolver, Pid};
use crate::errors::{AclError, Result, StoreError};
use crate::rbac::Role;
use crate::storage::{acl_predicate, AclLoader, AclStatement, RawAclFacts};

#[derive(Debug, Clone, Default)]
struct StoredObject {
    parent: Option<Pid>,
    statements: Vec<AclStatement>,
    is_tombstone: bool,
}

/// Fixture file layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryFixture {
    pub objects: Vec<ObjectFixture>,
}

/// One object in a fixture file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectFixture {
    pub id: Pid,
    pub parent: Pid,
    /// Principal to role names. Names are stored verbatim so unknown roles
    /// reach the ACL factory the way a real store would hand them over.
    #[serde(default)]
    pub roles: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embargo_until: Option<String>,
    #[serde(default)]
    pub marked_for_deletion: bool,
    #[serde(default)]
    pub tombstone: bool,
    /// Extra raw statements, ACL-namespaced or not
    #[serde(default)]
    pub statements: Vec<AclStatement>,
}

/// Content tree held in memory
#[derive(Debug)]
pub struct MemoryRepository {
    objects: RwLock<HashMap<Pid, StoredObject>>,
    load_counts: Mutex<HashMap<Pid, usize>>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    /// Empty repository containing only the content root
    pub fn new() -> Self {
        let mut objects = HashMap::new();
        objects.insert(Pid::content_root(), StoredObject::default());
        MemoryRepository {
            objects: RwLock::new(objects),
            load_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Load a fixture file; `.json` files are parsed as JSON, anything else as YAML
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AclError::FileNotFound(path.to_string_lossy().to_string()));
        }

        let content = fs::read_to_string(path)?;
        let fixture: RepositoryFixture = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        Self::from_fixture(fixture)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let fixture: RepositoryFixture = serde_yaml::from_str(content)?;
        Self::from_fixture(fixture)
    }

    pub fn from_fixture(fixture: RepositoryFixture) -> Result<Self> {
        let repo = MemoryRepository::new();
        for object in fixture.objects {
            repo.add_object(object.id.clone(), object.parent.clone())?;

            for (principal, roles) in &object.roles {
                for role in roles {
                    repo.add_statement(&object.id, AclStatement::new(acl_predicate(role), principal.clone()))?;
                }
            }
            if let Some(embargo) = &object.embargo_until {
                repo.set_embargo(&object.id, embargo)?;
            }
            if object.marked_for_deletion {
                repo.mark_for_deletion(&object.id, true)?;
            }
            if object.tombstone {
                repo.set_tombstone(&object.id, true)?;
            }
            for statement in object.statements {
                repo.add_statement(&object.id, statement)?;
            }
        }
        Ok(repo)
    }

    /// Register `pid` under `parent`. The parent need not exist yet, which
    /// also allows orphaned objects to be modelled.
    pub fn add_object(&self, pid: Pid, parent: Pid) -> std::result::Result<(), StoreError> {
        if pid.is_content_root() {
            return Err(StoreError::Backend("content root cannot be re-parented".to_string()));
        }
        let mut objects = self.write()?;
        objects.entry(pid).or_default().parent = Some(parent);
        Ok(())
    }

    /// Create a new administrative unit under the content root
    pub fn add_unit(&self) -> std::result::Result<Pid, StoreError> {
        self.add_child(&Pid::content_root())
    }

    /// Create a new object under an existing `parent`
    pub fn add_child(&self, parent: &Pid) -> std::result::Result<Pid, StoreError> {
        if !self.read()?.contains_key(parent) {
            return Err(StoreError::NotFound(parent.clone()));
        }
        let pid = Pid::generate();
        self.add_object(pid.clone(), parent.clone())?;
        Ok(pid)
    }

    pub fn assign_role(&self, pid: &Pid, principal: &str, role: Role) -> std::result::Result<(), StoreError> {
        self.add_statement(pid, AclStatement::role(role, principal))
    }

    /// Remove every role assignment for `principal` on `pid`
    pub fn revoke_roles(&self, pid: &Pid, principal: &str) -> std::result::Result<(), StoreError> {
        self.with_object(pid, |object| {
            object.statements.retain(|s| {
                let is_role = s
                    .acl_local_name()
                    .map(|name| name.parse::<Role>().is_ok())
                    .unwrap_or(false);
                !(is_role && s.value == principal)
            });
        })
    }

    /// Set the raw embargo value, replacing any existing one
    pub fn set_embargo(&self, pid: &Pid, value: &str) -> std::result::Result<(), StoreError> {
        let statement = AclStatement::embargo_until(value);
        self.with_object(pid, |object| {
            object.statements.retain(|s| s.predicate != statement.predicate);
            object.statements.push(statement);
        })
    }

    pub fn clear_embargo(&self, pid: &Pid) -> std::result::Result<(), StoreError> {
        let predicate = AclStatement::embargo_until("").predicate;
        self.with_object(pid, |object| object.statements.retain(|s| s.predicate != predicate))
    }

    pub fn mark_for_deletion(&self, pid: &Pid, marked: bool) -> std::result::Result<(), StoreError> {
        let statement = AclStatement::marked_for_deletion(marked);
        self.with_object(pid, |object| {
            object.statements.retain(|s| s.predicate != statement.predicate);
            object.statements.push(statement);
        })
    }

    pub fn set_tombstone(&self, pid: &Pid, tombstone: bool) -> std::result::Result<(), StoreError> {
        self.with_object(pid, |object| object.is_tombstone = tombstone)
    }

    pub fn add_statement(&self, pid: &Pid, statement: AclStatement) -> std::result::Result<(), StoreError> {
        self.with_object(pid, |object| object.statements.push(statement))
    }

    /// Number of ACL loads served for `pid`
    pub fn load_count(&self, pid: &Pid) -> usize {
        self.load_counts
            .lock()
            .map(|counts| counts.get(pid).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Number of ACL loads served across all objects
    pub fn total_loads(&self) -> usize {
        self.load_counts
            .lock()
            .map(|counts| counts.values().sum())
            .unwrap_or(0)
    }

    fn with_object<F>(&self, pid: &Pid, apply: F) -> std::result::Result<(), StoreError>
    where
        F: FnOnce(&mut StoredObject),
    {
        let mut objects = self.write()?;
        let object = objects
            .get_mut(pid)
            .ok_or_else(|| StoreError::NotFound(pid.clone()))?;
        apply(object);
        Ok(())
    }

    fn read(&self) -> std::result::Result<RwLockReadGuard<'_, HashMap<Pid, StoredObject>>, StoreError> {
        self.objects
            .read()
            .map_err(|_| StoreError::Backend("repository lock poisoned".to_string()))
    }

    fn write(&self) -> std::result::Result<RwLockWriteGuard<'_, HashMap<Pid, StoredObject>>, StoreError> {
        self.objects
            .write()
            .map_err(|_| StoreError::Backend("repository lock poisoned".to_string()))
    }
}

impl PathResolver for MemoryRepository {
    fn ancestors(&self, pid: &Pid) -> std::result::Result<Vec<Pid>, StoreError> {
        let objects = self.read()?;
        let mut current = objects
            .get(pid)
            .ok_or_else(|| StoreError::NotFound(pid.clone()))?
            .parent
            .clone();

        let mut ancestors = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(pid.clone());

        while let Some(ancestor) = current {
            if !seen.insert(ancestor.clone()) {
                return Err(StoreError::Backend(format!("cycle in ancestry of {}", pid)));
            }
            // A missing ancestor ends the walk; the path is then orphaned.
            current = objects.get(&ancestor).and_then(|o| o.parent.clone());
            ancestors.push(ancestor);
        }

        ancestors.reverse();
        Ok(ancestors)
    }
}

impl AclLoader for MemoryRepository {
    fn load_acl_facts(&self, pid: &Pid) -> std::result::Result<RawAclFacts, StoreError> {
        let facts = {
            let objects = self.read()?;
            let object = objects
                .get(pid)
                .ok_or_else(|| StoreError::NotFound(pid.clone()))?;
            RawAclFacts {
                statements: object.statements.clone(),
                is_tombstone: object.is_tombstone,
            }
        };

        if let Ok(mut counts) = self.load_counts.lock() {
            *counts.entry(pid.clone()).or_insert(0) += 1;
        }
        Ok(facts)
    }
}
