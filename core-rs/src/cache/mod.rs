//! Cache module for per-object ACL facts
//!
//! Holds the only shared mutable state in the authorization core: a
//! size- and TTL-bounded cache of the ACL facts attached to each object.

pub mod object_acl;

pub use object_acl::{ObjectAclFactory, ObjectAclFacts, ParsedEmbargo};
