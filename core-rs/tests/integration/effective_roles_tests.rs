//! Integration tests for effective role reporting
//!
//! Checks the accumulated role view used by administrative tooling and that
//! it agrees with the permission evaluator for every patron permission.

use acl_core::rbac::role::role_grants;
use acl_core::rbac::PATRON_PERMISSIONS;
use acl_core::{
    AccessConfig, AccessControlService, AgentPrincipals, MemoryRepository, Pid, PrincipalRoles, Role,
    RoleAssignment,
};
use std::collections::HashSet;
use std::sync::Arc;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/core-rs/tests/fixtures/repository.yaml");

const OBJECTS: [&str; 17] = [
    "collections",
    "u-library",
    "c-open",
    "f-open",
    "file-open",
    "f-restricted",
    "file-restricted",
    "f-embargoed",
    "file-embargoed",
    "f-deleted",
    "file-deleted",
    "w-interns",
    "c-private",
    "file-private",
    "c-expired",
    "c-tombstone",
    "c-malformed",
];

fn service() -> AccessControlService {
    let repo = Arc::new(MemoryRepository::load(FIXTURE).unwrap());
    AccessControlService::new(&AccessConfig::default(), repo.clone(), repo).unwrap()
}

fn roles(list: &[Role]) -> HashSet<Role> {
    list.iter().copied().collect()
}

fn roles_of(acl: &AccessControlService, pid: &str) -> PrincipalRoles {
    acl.get_principal_roles(&Pid::new(pid)).unwrap()
}

#[test]
fn test_unit_roles_include_public_default() {
    let acl = service();
    let result = roles_of(&acl, "u-library");

    assert_eq!(result.len(), 3);
    assert_eq!(result["everyone"], roles(&[Role::CanViewOriginals]));
    assert_eq!(result["library-managers"], roles(&[Role::CanManage]));
    assert_eq!(result["unit-owners"], roles(&[Role::UnitOwner]));
}

#[test]
fn test_restricted_file_roles() {
    let acl = service();
    let result = roles_of(&acl, "file-restricted");

    assert_eq!(result["everyone"], roles(&[Role::CanViewMetadata]));
    assert_eq!(result["authenticated"], roles(&[Role::CanViewAccessCopies]));
    assert_eq!(result["catalogers"], roles(&[Role::CanDescribe]));
    assert_eq!(result["library-managers"], roles(&[Role::CanManage]));
    assert_eq!(result["unit-owners"], roles(&[Role::UnitOwner]));
    assert_eq!(result.len(), 5);
}

#[test]
fn test_embargoed_and_deleted_roles() {
    let acl = service();

    let embargoed = roles_of(&acl, "file-embargoed");
    assert_eq!(embargoed["everyone"], roles(&[Role::CanViewMetadata]));
    assert_eq!(embargoed["authenticated"], roles(&[Role::CanViewMetadata]));

    let deleted = roles_of(&acl, "file-deleted");
    assert!(!deleted.contains_key("everyone"));
    assert!(!deleted.contains_key("authenticated"));
    assert_eq!(deleted["catalogers"], roles(&[Role::CanDescribe]));

    assert!(acl.is_marked_for_deletion(&Pid::new("file-deleted")).unwrap());
    assert!(acl.is_marked_for_deletion(&Pid::new("c-tombstone")).unwrap());
    assert!(!acl.is_marked_for_deletion(&Pid::new("file-open")).unwrap());

    let until = acl.get_embargo_until(&Pid::new("file-embargoed")).unwrap().unwrap();
    assert_eq!(until.format("%Y-%m-%d").to_string(), "2999-01-01");
    assert_eq!(acl.get_embargo_until(&Pid::new("c-expired")).unwrap(), None);
}

#[test]
fn test_staff_below_collection_not_reported() {
    let acl = service();
    let result = roles_of(&acl, "w-interns");
    assert!(!result.contains_key("interns"));

    let staff = acl.get_staff_role_assignments(&Pid::new("w-interns")).unwrap();
    assert_eq!(
        staff,
        vec![
            RoleAssignment::new("library-managers", Role::CanManage, Pid::new("u-library")),
            RoleAssignment::new("unit-owners", Role::UnitOwner, Pid::new("u-library")),
            RoleAssignment::new("catalogers", Role::CanDescribe, Pid::new("c-open")),
        ]
    );
}

#[test]
fn test_patron_assignments_name_deciding_tier() {
    let acl = service();
    let patrons = acl.get_patron_role_assignments(&Pid::new("file-restricted")).unwrap();
    assert_eq!(
        patrons,
        vec![
            RoleAssignment::new("authenticated", Role::CanViewAccessCopies, Pid::new("file-restricted")),
            RoleAssignment::new("everyone", Role::CanViewMetadata, Pid::new("f-restricted")),
        ]
    );

    assert!(acl.get_patron_role_assignments(&Pid::new("file-private")).unwrap().is_empty());
}

#[test]
fn test_roles_agree_with_permission_checks() {
    let acl = service();
    let agents = [vec!["everyone"], vec!["everyone", "authenticated"]];

    for pid in OBJECTS {
        let effective = roles_of(&acl, pid);
        for agent in &agents {
            let principals = AgentPrincipals::new(agent.iter().copied());
            for permission in PATRON_PERMISSIONS {
                let by_roles = agent.iter().any(|principal| {
                    effective
                        .get(*principal)
                        .map(|held| {
                            held.iter()
                                .any(|role| role.is_patron_role() && role_grants(*role, permission))
                        })
                        .unwrap_or(false)
                });
                let by_check = acl.has_access(&Pid::new(pid), &principals, permission).unwrap();
                assert_eq!(by_roles, by_check, "{pid} {permission} {principals}");
            }
        }
    }
}
