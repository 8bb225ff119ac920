// ACL Cache Contract Tests
//
// Object ACL facts are loaded once per TTL window and reloaded exactly once
// after an explicit invalidation.

use acl_core::{AccessConfig, AccessControlService, AgentPrincipals, MemoryRepository, Permission, Pid, Role};
use std::sync::Arc;

fn setup() -> (Arc<MemoryRepository>, AccessControlService, Pid) {
    let repo = Arc::new(MemoryRepository::new());
    let unit = repo.add_unit().unwrap();
    let collection = repo.add_child(&unit).unwrap();
    let file = repo.add_child(&collection).unwrap();
    repo.assign_role(&collection, "everyone", Role::CanViewAccessCopies).unwrap();

    let acl = AccessControlService::new(&AccessConfig::default(), repo.clone(), repo.clone()).unwrap();
    (repo, acl, file)
}

/// RULE: repeated checks within the TTL do not reload ACL facts
/// BREAKS: every request would hit storage once per ancestor
#[test]
fn repeated_checks_are_idempotent() {
    let (repo, acl, file) = setup();
    let anonymous = AgentPrincipals::anonymous();

    let first = acl.has_access(&file, &anonymous, Permission::ViewAccessCopies).unwrap();
    let loads = repo.total_loads();
    let second = acl.has_access(&file, &anonymous, Permission::ViewAccessCopies).unwrap();

    assert!(first);
    assert_eq!(first, second);
    assert_eq!(repo.total_loads(), loads);
    assert_eq!(repo.load_count(&file), 1);
}

/// RULE: invalidating an object causes exactly one fresh load of it
/// BREAKS: ACL edits invisible until TTL expiry, or reloaded on every call
#[test]
fn invalidation_reloads_once() {
    let (repo, acl, file) = setup();
    let anonymous = AgentPrincipals::anonymous();

    acl.has_access(&file, &anonymous, Permission::ViewAccessCopies).unwrap();
    repo.assign_role(&file, "everyone", Role::CanViewMetadata).unwrap();
    acl.invalidate_object(&file);

    assert!(!acl.has_access(&file, &anonymous, Permission::ViewAccessCopies).unwrap());
    assert!(acl.has_access(&file, &anonymous, Permission::ViewMetadata).unwrap());
    assert_eq!(repo.load_count(&file), 2);
}

/// RULE: concurrent misses on one object share a single load
/// BREAKS: a cold cache would stampede the storage backend
#[test]
fn concurrent_misses_single_flight() {
    let (repo, acl, file) = setup();
    let anonymous = AgentPrincipals::anonymous();

    std::thread::scope(|s| {
        for _ in 0..16 {
            s.spawn(|| {
                assert!(acl.has_access(&file, &anonymous, Permission::ViewMetadata).unwrap());
            });
        }
    });

    assert_eq!(repo.load_count(&file), 1);
}
