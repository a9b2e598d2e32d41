//! Simulated file system tree.
//!
//! - `Tree`: arena of file and directory nodes
//! - `path`: resolution of absolute and relative path strings

pub mod path;
mod tree;

pub use indextree::NodeId;
pub use path::{resolve, resolve_parent, validate_name, SEPARATOR};
pub use tree::{Entry, NodeData, NodeHandle, NodeKind, Tree, ROOT_PATH};
