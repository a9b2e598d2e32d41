//! Path resolution over the node tree.

use indextree::NodeId;

use super::tree::Tree;
use crate::error::{SimError, SimResult};

pub const SEPARATOR: char = '/';

/// Resolve `path` to an existing node.
///
/// Absolute paths start at the root, relative ones at `cwd`. `.` stays put,
/// `..` moves to the parent (the root is its own parent). Empty components are
/// skipped, so the empty path resolves to `cwd`. A trailing separator
/// requires the target to be a directory.
pub fn resolve(tree: &Tree, cwd: NodeId, path: &str) -> SimResult<NodeId> {
    let mut current = if path.starts_with(SEPARATOR) {
        tree.root()
    } else {
        cwd
    };

    for component in path.split(SEPARATOR).filter(|c| !c.is_empty()) {
        current = step(tree, current, component, path)?;
    }
    if path.ends_with(SEPARATOR) && !tree.is_dir(current) {
        return Err(SimError::NotADirectory(path.to_string()));
    }
    Ok(current)
}

/// Resolve every component but the last, returning the containing directory
/// and the final name. The final name is validated but not looked up.
pub fn resolve_parent(tree: &Tree, cwd: NodeId, path: &str) -> SimResult<(NodeId, String)> {
    let (dir_part, name) = split_parent(path);
    validate_name(name)?;

    let dir = resolve(tree, cwd, dir_part)?;
    if !tree.is_dir(dir) {
        return Err(SimError::NotADirectory(dir_part.to_string()));
    }
    Ok((dir, name.to_string()))
}

/// Split a path into its directory part and final component.
///
/// Trailing separators are ignored: `a/b/` splits like `a/b`.
pub fn split_parent(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(0) => ("/", &trimmed[1..]),
        Some(pos) => (&trimmed[..pos], &trimmed[pos + 1..]),
        None if path.starts_with(SEPARATOR) => ("/", ""),
        None => ("", trimmed),
    }
}

/// Check that `name` can be used as a node name.
pub fn validate_name(name: &str) -> SimResult<()> {
    let forbidden = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(SEPARATOR)
        || name.chars().any(char::is_control);
    if forbidden {
        return Err(SimError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn step(tree: &Tree, current: NodeId, component: &str, path: &str) -> SimResult<NodeId> {
    if !tree.is_dir(current) {
        return Err(SimError::NotADirectory(tree.path_of(current)));
    }
    match component {
        "." => Ok(current),
        ".." => Ok(tree.parent(current).unwrap_or(current)),
        name => tree
            .child(current, name)
            .ok_or_else(|| SimError::NotFound(path.to_string())),
    }
}
