//! Arena-backed node tree.
//!
//! Nodes live in an [`indextree::Arena`] and are addressed by [`NodeId`].
//! Each node is owned by exactly one parent directory; the parent link is
//! navigational only.

use chrono::{DateTime, Local};
use indextree::{Arena, NodeId};
use serde::Serialize;

use crate::error::{SimError, SimResult};

/// Path of the root directory.
pub const ROOT_PATH: &str = "/";

/// Node kind as reported in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
        }
    }
}

/// Payload of a node: file content or a directory marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    File { content: String },
    Directory,
}

impl NodeData {
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::File => Self::File {
                content: String::new(),
            },
            NodeKind::Directory => Self::Directory,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::File { .. } => NodeKind::File,
            Self::Directory => NodeKind::Directory,
        }
    }
}

/// Stable reference to a node that survives arena slot reuse.
///
/// A bare [`NodeId`] may name a different node once its slot is recycled; the
/// serial tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle {
    id: NodeId,
    serial: u64,
}

impl NodeHandle {
    pub fn id(&self) -> NodeId {
        self.id
    }
}

/// A file or directory entry stored in the arena.
#[derive(Debug, Clone)]
pub struct Entry {
    serial: u64,
    pub name: String,
    pub data: NodeData,
    pub owner: String,
    pub created: DateTime<Local>,
    pub modified: DateTime<Local>,
}

impl Entry {
    fn new(serial: u64, name: &str, data: NodeData, owner: &str) -> Self {
        let now = Local::now();
        Self {
            serial,
            name: name.to_string(),
            data,
            owner: owner.to_string(),
            created: now,
            modified: now,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.data, NodeData::Directory)
    }

    /// Content length in bytes; `None` for directories.
    pub fn size(&self) -> Option<usize> {
        match &self.data {
            NodeData::File { content } => Some(content.len()),
            NodeData::Directory => None,
        }
    }
}

/// The simulated directory tree.
pub struct Tree {
    arena: Arena<Entry>,
    root: NodeId,
    next_serial: u64,
}

impl Tree {
    /// Create a tree holding only the root directory.
    pub fn new(owner: &str) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(Entry::new(0, ROOT_PATH, NodeData::Directory, owner));
        Self {
            arena,
            root,
            next_serial: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Handle for the root, which is never removed.
    pub fn root_handle(&self) -> NodeHandle {
        NodeHandle {
            id: self.root,
            serial: 0,
        }
    }

    /// Handle for a live node.
    pub fn handle(&self, id: NodeId) -> Option<NodeHandle> {
        self.entry(id).map(|entry| NodeHandle {
            id,
            serial: entry.serial,
        })
    }

    /// The node a handle refers to, if it has not been removed since.
    pub fn lookup(&self, handle: NodeHandle) -> Option<NodeId> {
        self.entry(handle.id)
            .filter(|entry| entry.serial == handle.serial)
            .map(|_| handle.id)
    }

    /// Look up a live node.
    pub fn entry(&self, id: NodeId) -> Option<&Entry> {
        self.arena
            .get(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get())
    }

    fn entry_mut(&mut self, id: NodeId) -> Option<&mut Entry> {
        self.arena
            .get_mut(id)
            .filter(|node| !node.is_removed())
            .map(|node| node.get_mut())
    }

    pub fn is_dir(&self, id: NodeId) -> bool {
        self.entry(id).is_some_and(Entry::is_dir)
    }

    pub fn name(&self, id: NodeId) -> &str {
        self.entry(id).map(|e| e.name.as_str()).unwrap_or_default()
    }

    /// Parent of a node; `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).and_then(|node| node.parent())
    }

    /// Find a child of `dir` by name.
    pub fn child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        dir.children(&self.arena)
            .find(|&child| self.arena[child].get().name == name)
    }

    /// Children of `dir`, sorted by name.
    pub fn children(&self, dir: NodeId) -> Vec<NodeId> {
        let mut children: Vec<NodeId> = dir.children(&self.arena).collect();
        children.sort_by(|a, b| self.arena[*a].get().name.cmp(&self.arena[*b].get().name));
        children
    }

    pub fn has_children(&self, dir: NodeId) -> bool {
        dir.children(&self.arena).next().is_some()
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.root.descendants(&self.arena).count()
    }

    /// Create a new node under `parent`.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        name: &str,
        data: NodeData,
        owner: &str,
    ) -> SimResult<NodeId> {
        if !self.is_dir(parent) {
            return Err(SimError::NotADirectory(self.path_of(parent)));
        }
        if self.child(parent, name).is_some() {
            return Err(SimError::DuplicateName(name.to_string()));
        }

        let serial = self.next_serial;
        self.next_serial += 1;
        let id = self.arena.new_node(Entry::new(serial, name, data, owner));
        parent
            .checked_append(id, &mut self.arena)
            .map_err(|_| SimError::InvalidOperation(format!("Cannot attach '{}'", name)))?;
        self.touch_modified(parent);
        Ok(id)
    }

    /// Remove a file or an empty directory from `parent`.
    pub fn remove_child(&mut self, parent: NodeId, name: &str) -> SimResult<()> {
        let id = self
            .child(parent, name)
            .ok_or_else(|| SimError::NotFound(name.to_string()))?;
        if self.has_children(id) {
            return Err(SimError::NotEmpty(name.to_string()));
        }

        id.remove(&mut self.arena);
        self.touch_modified(parent);
        Ok(())
    }

    /// True if `candidate` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, candidate: NodeId, ancestor: NodeId) -> bool {
        candidate
            .ancestors(&self.arena)
            .skip(1)
            .any(|id| id == ancestor)
    }

    /// Detach `id` from its parent and attach it under `new_parent` as `new_name`.
    ///
    /// Callers check the destination slot and cycles first; this only refuses
    /// what would corrupt the tree.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId, new_name: &str) -> SimResult<()> {
        if id == self.root {
            return Err(SimError::InvalidOperation(
                "Cannot move the root directory".to_string(),
            ));
        }
        if new_parent == id || self.is_descendant_of(new_parent, id) {
            return Err(SimError::CyclicMove {
                source_path: self.path_of(id),
                destination: self.path_of(new_parent),
            });
        }
        if self.child(new_parent, new_name).is_some() {
            return Err(SimError::DuplicateName(new_name.to_string()));
        }

        let old_parent = self.parent(id);
        id.detach(&mut self.arena);
        new_parent
            .checked_append(id, &mut self.arena)
            .map_err(|_| SimError::InvalidOperation(format!("Cannot attach '{}'", new_name)))?;
        if let Some(entry) = self.entry_mut(id) {
            entry.name = new_name.to_string();
        }
        if let Some(old_parent) = old_parent {
            self.touch_modified(old_parent);
        }
        self.touch_modified(new_parent);
        Ok(())
    }

    /// Absolute path of a node.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names: Vec<&str> = id
            .ancestors(&self.arena)
            .filter(|&a| a != self.root)
            .map(|a| self.arena[a].get().name.as_str())
            .collect();
        if names.is_empty() {
            return ROOT_PATH.to_string();
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    /// File content; `None` for directories or removed nodes.
    pub fn content(&self, id: NodeId) -> Option<&str> {
        match &self.entry(id)?.data {
            NodeData::File { content } => Some(content.as_str()),
            NodeData::Directory => None,
        }
    }

    /// Replace file content.
    pub fn set_content(&mut self, id: NodeId, text: &str) -> SimResult<()> {
        self.update_content(id, |content| {
            content.clear();
            content.push_str(text);
        })
    }

    /// Append to file content.
    pub fn append_content(&mut self, id: NodeId, text: &str) -> SimResult<()> {
        self.update_content(id, |content| content.push_str(text))
    }

    fn update_content(&mut self, id: NodeId, f: impl FnOnce(&mut String)) -> SimResult<()> {
        let path = self.path_of(id);
        let entry = self
            .entry_mut(id)
            .ok_or_else(|| SimError::NotFound(path.clone()))?;
        match &mut entry.data {
            NodeData::File { content } => {
                f(content);
                entry.modified = Local::now();
                Ok(())
            }
            NodeData::Directory => Err(SimError::NotAFile(path)),
        }
    }

    fn touch_modified(&mut self, id: NodeId) {
        if let Some(entry) = self.entry_mut(id) {
            entry.modified = Local::now();
        }
    }
}
