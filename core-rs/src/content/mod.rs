//! Content tree addressing
//!
//! Object identifiers and root-first paths through the content tree
//! (content root → administrative unit → collection → folders/works → files).

pub mod path;
pub mod pid;

pub use path::{ContentPath, PathResolver, COLLECTION_DEPTH, CONTENT_ROOT_DEPTH, UNIT_DEPTH};
pub use pid::{Pid, CONTENT_ROOT_ID};
