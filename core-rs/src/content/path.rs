//! Root-first paths through the content tree
//!
//! Tier depths are counted from the content root, which sits at depth 0.
//! Every depth threshold used by the evaluators comes from the constants
//! below.

use crate::content::Pid;
use crate::errors::{AclError, Result, StoreError};

/// Depth of the content root in any path
pub const CONTENT_ROOT_DEPTH: usize = 0;

/// Depth of administrative units
pub const UNIT_DEPTH: usize = 1;

/// Depth of collections. Staff roles are only honoured down to this tier.
pub const COLLECTION_DEPTH: usize = 2;

/// Resolves the ancestors of an object.
pub trait PathResolver: Send + Sync {
    /// Ancestors of `pid`, root first, excluding `pid` itself.
    ///
    /// Returns an empty list for the content root.
    fn ancestors(&self, pid: &Pid) -> std::result::Result<Vec<Pid>, StoreError>;
}

/// Path from the content root to a target object, target included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPath {
    nodes: Vec<Pid>,
}

impl ContentPath {
    /// Resolve the path to `target`.
    ///
    /// # Errors
    /// `AclError::OrphanedPath` if the ancestors do not begin at the content
    /// root, or `AclError::Storage` if the resolver fails.
    pub fn resolve(resolver: &dyn PathResolver, target: &Pid) -> Result<Self> {
        if target.is_content_root() {
            return Ok(ContentPath {
                nodes: vec![target.clone()],
            });
        }

        let mut nodes = resolver.ancestors(target)?;
        match nodes.first() {
            Some(first) if first.is_content_root() => {}
            Some(first) => {
                return Err(AclError::OrphanedPath {
                    pid: target.clone(),
                    first: first.clone(),
                })
            }
            None => {
                return Err(AclError::OrphanedPath {
                    pid: target.clone(),
                    first: target.clone(),
                })
            }
        }

        nodes.push(target.clone());
        Ok(ContentPath { nodes })
    }

    pub fn target(&self) -> &Pid {
        // Never empty: resolve always pushes the target.
        &self.nodes[self.nodes.len() - 1]
    }

    /// Depth of the target object
    pub fn depth(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Node at the given depth, if the path reaches it
    pub fn at_depth(&self, depth: usize) -> Option<&Pid> {
        self.nodes.get(depth)
    }

    pub fn nodes(&self) -> &[Pid] {
        &self.nodes
    }

    /// Tiers on which staff roles are honoured (unit and collection), top-down.
    pub fn staff_tiers(&self) -> impl Iterator<Item = (usize, &Pid)> {
        self.nodes
            .iter()
            .enumerate()
            .skip(UNIT_DEPTH)
            .take(COLLECTION_DEPTH - UNIT_DEPTH + 1)
    }

    /// Tiers from the collection down to the target, top-down. Empty when the
    /// path stops above the collection tier.
    pub fn patron_tiers(&self) -> impl Iterator<Item = (usize, &Pid)> {
        self.nodes.iter().enumerate().skip(COLLECTION_DEPTH)
    }

    /// True when the target is an administrative unit
    pub fn ends_at_unit(&self) -> bool {
        self.depth() == UNIT_DEPTH
    }
}
