// Authorization Contract Tests
//
// These tests pin the access rules of the content tree:
// root -> u1 -> c1 -> f1 -> file1
//
// Each test names the rule it holds and what breaks if it fails.

use acl_core::rbac::PATRON_PERMISSIONS;
use acl_core::{AccessConfig, AccessControlService, AgentPrincipals, MemoryRepository, Permission, Pid, Role};
use std::sync::Arc;

struct Tree {
    repo: Arc<MemoryRepository>,
    acl: AccessControlService,
    unit: Pid,
    collection: Pid,
    folder: Pid,
    file: Pid,
}

fn tree_with_config(config: &AccessConfig) -> Tree {
    let repo = Arc::new(MemoryRepository::new());
    let unit = Pid::new("u1");
    let collection = Pid::new("c1");
    let folder = Pid::new("f1");
    let file = Pid::new("file1");
    repo.add_object(unit.clone(), Pid::content_root()).unwrap();
    repo.add_object(collection.clone(), unit.clone()).unwrap();
    repo.add_object(folder.clone(), collection.clone()).unwrap();
    repo.add_object(file.clone(), folder.clone()).unwrap();

    let acl = AccessControlService::new(config, repo.clone(), repo.clone()).unwrap();
    Tree {
        repo,
        acl,
        unit,
        collection,
        folder,
        file,
    }
}

fn tree() -> Tree {
    tree_with_config(&AccessConfig::default())
}

fn public() -> AgentPrincipals {
    AgentPrincipals::anonymous()
}

/// RULE: no assigned role anywhere on the path means no patron permission
/// BREAKS: unrestricted objects would leak to the public
#[test]
fn no_role_default_denies_patrons() {
    let t = tree();
    let agents = [
        public(),
        AgentPrincipals::new(["everyone", "authenticated"]),
        AgentPrincipals::new(["ip:10.0.0.0/8"]),
        AgentPrincipals::new(["grp1"]),
    ];

    for pid in [&t.collection, &t.folder, &t.file] {
        for agent in &agents {
            for permission in PATRON_PERMISSIONS {
                assert!(
                    !t.acl.has_access(pid, agent, permission).unwrap(),
                    "{pid} granted {permission} to {agent}"
                );
            }
        }
    }
}

/// RULE: a path ending at a unit carries no patron restriction
/// BREAKS: unit landing pages become invisible to the public
#[test]
fn unit_default_grants_originals() {
    let t = tree();
    let agents = [
        public(),
        AgentPrincipals::new(["authenticated"]),
        AgentPrincipals::new(["grp1"]),
        AgentPrincipals::default(),
    ];
    for agent in &agents {
        for permission in PATRON_PERMISSIONS {
            assert!(
                t.acl.has_access(&t.unit, agent, permission).unwrap(),
                "{agent} denied {permission} on unit"
            );
        }
    }
}

/// RULE: a collection grant flows to every descendant that does not reassign it
/// BREAKS: every folder and file would need its own patron assignment
#[test]
fn inheritance_persists_to_descendants() {
    let t = tree();
    t.repo.assign_role(&t.collection, "everyone", Role::CanViewAccessCopies).unwrap();

    for pid in [&t.collection, &t.folder, &t.file] {
        assert!(t.acl.has_access(pid, &public(), Permission::ViewAccessCopies).unwrap());
        assert!(!t.acl.has_access(pid, &public(), Permission::ViewOriginal).unwrap());
    }
}

/// RULE: a deeper reassignment narrows but never widens
/// BREAKS: a file could expose originals its collection withholds
#[test]
fn reassignment_never_widens() {
    let t = tree();
    t.repo.assign_role(&t.collection, "everyone", Role::CanViewMetadata).unwrap();
    t.repo.assign_role(&t.file, "everyone", Role::CanViewOriginals).unwrap();

    assert!(!t.acl.has_access(&t.file, &public(), Permission::ViewOriginal).unwrap());
    assert!(t.acl.has_access(&t.file, &public(), Permission::ViewMetadata).unwrap());
}

/// RULE: an active embargo leaves patrons metadata only; an expired one is inert
/// BREAKS: embargoed content downloadable before its release date
#[test]
fn embargo_gates_content() {
    let t = tree();
    t.repo.assign_role(&t.collection, "everyone", Role::CanViewAccessCopies).unwrap();
    t.repo.set_embargo(&t.file, "2999-01-01T00:00:00Z").unwrap();

    assert!(t.acl.has_access(&t.file, &public(), Permission::ViewMetadata).unwrap());
    assert!(!t.acl.has_access(&t.file, &public(), Permission::ViewAccessCopies).unwrap());

    t.repo.set_embargo(&t.file, "2000-01-01T00:00:00Z").unwrap();
    t.acl.invalidate_object(&t.file);
    assert!(t.acl.has_access(&t.file, &public(), Permission::ViewAccessCopies).unwrap());
}

/// RULE: an embargo on an ancestor cannot be undone below it
/// BREAKS: a deeper role assignment would leak embargoed content
#[test]
fn ancestor_embargo_not_overridable() {
    let t = tree();
    t.repo.assign_role(&t.collection, "everyone", Role::CanViewOriginals).unwrap();
    t.repo.set_embargo(&t.folder, "2999-01-01").unwrap();
    t.repo.assign_role(&t.file, "everyone", Role::CanViewOriginals).unwrap();

    assert!(!t.acl.has_access(&t.file, &public(), Permission::ViewOriginal).unwrap());
    assert!(t.acl.has_access(&t.file, &public(), Permission::ViewMetadata).unwrap());
}

/// RULE: a node marked for deletion closes itself and its descendants to patrons
/// BREAKS: trashed content stays publicly visible
#[test]
fn deletion_gates_descendants() {
    let t = tree();
    t.repo.assign_role(&t.collection, "everyone", Role::CanViewOriginals).unwrap();
    t.repo.assign_role(&t.collection, "authenticated", Role::CanViewOriginals).unwrap();
    t.repo.mark_for_deletion(&t.folder, true).unwrap();

    let patrons = AgentPrincipals::new(["everyone", "authenticated"]);
    for pid in [&t.folder, &t.file] {
        for permission in PATRON_PERMISSIONS {
            assert!(!t.acl.has_access(pid, &patrons, permission).unwrap());
        }
    }
    assert!(t.acl.has_access(&t.collection, &patrons, Permission::ViewOriginal).unwrap());
}

/// RULE: staff roles count only on the unit and collection tiers
/// BREAKS: staff rights could be granted on a single file
#[test]
fn staff_depth_cutoff() {
    let t = tree();
    let grp1 = AgentPrincipals::new(["grp1"]);

    t.repo.assign_role(&t.file, "grp1", Role::CanManage).unwrap();
    for permission in Permission::ALL {
        assert!(!t.acl.has_access(&t.file, &grp1, permission).unwrap(), "{permission}");
    }

    t.repo.assign_role(&t.collection, "grp1", Role::CanManage).unwrap();
    t.acl.invalidate_object(&t.collection);
    assert!(t.acl.has_access(&t.file, &grp1, Permission::Move).unwrap());
    assert!(t.acl.has_access(&t.file, &grp1, Permission::ViewOriginal).unwrap());
}

/// RULE: a global administrator is granted everything, everywhere
/// BREAKS: operators locked out of deleted or embargoed material
#[test]
fn global_override_precedence() {
    let config = AccessConfig::from_yaml_str("globalRoles:\n  sysadmin: administrator\n").unwrap();
    let t = tree_with_config(&config);
    t.repo.mark_for_deletion(&t.folder, true).unwrap();
    t.repo.set_embargo(&t.collection, "2999-01-01").unwrap();

    let sysadmin = AgentPrincipals::new(["sysadmin"]);
    for pid in [Pid::content_root(), t.unit.clone(), t.collection.clone(), t.folder.clone(), t.file.clone()] {
        for permission in Permission::ALL {
            assert!(t.acl.has_access(&pid, &sysadmin, permission).unwrap());
        }
    }
}
