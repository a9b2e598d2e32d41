//! File system engine: command semantics on top of the tree and resolver.
//!
//! Every operation validates its preconditions before touching the tree, so a
//! failed call leaves the tree unchanged. Operations that create, change,
//! delete, or read file content require a logged-in session.

use chrono::{DateTime, Local};
use indextree::NodeId;
use serde::Serialize;

use crate::error::{SimError, SimResult};
use crate::fs::{resolve, resolve_parent, NodeData, NodeKind, Tree};
use crate::session::Session;

/// Owner recorded on nodes not created by a user.
pub const SYSTEM_OWNER: &str = "system";

/// Listing entry for `ls` and `stat`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryInfo {
    pub name: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    pub owner: String,
    pub created: DateTime<Local>,
    pub modified: DateTime<Local>,
}

/// Whether `write` created a new file or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
}

/// The shared simulated file system.
pub struct FileSystem {
    tree: Tree,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem {
    /// Create a file system holding an empty root directory.
    pub fn new() -> Self {
        Self {
            tree: Tree::new(SYSTEM_OWNER),
        }
    }

    /// Start a new logged-out session at the root.
    pub fn new_session(&self) -> Session {
        Session::new(self.tree.root_handle())
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Absolute path of the session's working directory.
    pub fn pwd(&self, session: &Session) -> String {
        self.tree.path_of(self.cwd(session))
    }

    /// List a directory (the working directory by default), sorted by name.
    /// A file path lists just that file.
    pub fn ls(&self, session: &Session, path: Option<&str>) -> SimResult<Vec<EntryInfo>> {
        let target = resolve(&self.tree, self.cwd(session), path.unwrap_or(""))?;
        if !self.tree.is_dir(target) {
            return Ok(vec![self.info(target)?]);
        }
        self.tree
            .children(target)
            .into_iter()
            .map(|child| self.info(child))
            .collect()
    }

    /// Metadata of a single node.
    pub fn stat(&self, session: &Session, path: &str) -> SimResult<EntryInfo> {
        let target = resolve(&self.tree, self.cwd(session), path)?;
        self.info(target)
    }

    /// Change the working directory. Returns the new absolute path.
    pub fn cd(&self, session: &mut Session, path: &str) -> SimResult<String> {
        let target = resolve(&self.tree, self.cwd(session), path)?;
        if !self.tree.is_dir(target) {
            return Err(SimError::NotADirectory(path.to_string()));
        }
        let handle = self
            .tree
            .handle(target)
            .ok_or_else(|| SimError::NotFound(path.to_string()))?;
        session.set_cwd(handle);
        let new_path = self.tree.path_of(target);
        tracing::debug!(path = %new_path, "cd");
        Ok(new_path)
    }

    /// Create an empty directory.
    pub fn mkdir(&mut self, session: &Session, path: &str) -> SimResult<()> {
        self.create(session, path, NodeData::Directory)
    }

    /// Create an empty file.
    pub fn touch(&mut self, session: &Session, path: &str) -> SimResult<()> {
        self.create(session, path, NodeData::empty(NodeKind::File))
    }

    /// Replace the content of a file, creating the file if it does not exist.
    pub fn write(&mut self, session: &Session, path: &str, content: &str) -> SimResult<WriteOutcome> {
        let owner = session.require_user()?;
        let (dir, name) = resolve_parent(&self.tree, self.cwd(session), path)?;

        match self.tree.child(dir, &name) {
            Some(id) if self.tree.is_dir(id) => Err(SimError::NotAFile(path.to_string())),
            Some(id) => {
                self.tree.set_content(id, content)?;
                tracing::debug!(path, bytes = content.len(), "write");
                Ok(WriteOutcome::Updated)
            }
            None => {
                let data = NodeData::File {
                    content: content.to_string(),
                };
                self.tree.create_child(dir, &name, data, owner)?;
                tracing::debug!(path, bytes = content.len(), "write (created)");
                Ok(WriteOutcome::Created)
            }
        }
    }

    /// Append to an existing file.
    pub fn append(&mut self, session: &Session, path: &str, content: &str) -> SimResult<()> {
        session.require_user()?;
        let id = self.existing_file(session, path)?;
        self.tree.append_content(id, content)?;
        tracing::debug!(path, bytes = content.len(), "append");
        Ok(())
    }

    /// Read a file's content.
    pub fn read(&self, session: &Session, path: &str) -> SimResult<String> {
        session.require_user()?;
        let id = self.existing_file(session, path)?;
        Ok(self.tree.content(id).unwrap_or_default().to_string())
    }

    /// Delete a file or an empty directory.
    pub fn rm(&mut self, session: &Session, path: &str) -> SimResult<()> {
        session.require_user()?;
        let id = resolve(&self.tree, self.cwd(session), path)?;
        let parent = self.tree.parent(id).ok_or_else(|| {
            SimError::InvalidOperation("Cannot remove the root directory".to_string())
        })?;
        let cwd = self.cwd(session);
        if id == cwd || self.tree.is_descendant_of(cwd, id) {
            return Err(SimError::InvalidOperation(format!(
                "Cannot remove '{}': it is the current directory",
                path
            )));
        }

        let name = self.tree.name(id).to_string();
        self.tree.remove_child(parent, &name).map_err(|e| match e {
            SimError::NotEmpty(_) => SimError::NotEmpty(path.to_string()),
            other => other,
        })?;
        tracing::debug!(path, "rm");
        Ok(())
    }

    /// Move a file or directory.
    ///
    /// An existing directory destination receives the node under its current
    /// name; any other destination is taken as the new path of the node.
    pub fn mv(&mut self, session: &Session, source: &str, destination: &str) -> SimResult<()> {
        session.require_user()?;
        let cwd = self.cwd(session);
        let id = resolve(&self.tree, cwd, source)?;
        if id == self.tree.root() {
            return Err(SimError::InvalidOperation(
                "Cannot move the root directory".to_string(),
            ));
        }

        let cyclic = || SimError::CyclicMove {
            source_path: source.to_string(),
            destination: destination.to_string(),
        };
        if resolve(&self.tree, cwd, destination).is_ok_and(|target| target == id) {
            return Err(cyclic());
        }
        let (dir, name) = self.destination_slot(session, id, destination)?;
        if dir == id || self.tree.is_descendant_of(dir, id) {
            return Err(cyclic());
        }
        if self.tree.child(dir, &name).is_some() {
            return Err(SimError::DuplicateName(name));
        }

        self.tree.reparent(id, dir, &name)?;
        tracing::debug!(source, destination, "mv");
        Ok(())
    }

    /// Copy a file. Directories are not copied.
    pub fn cp(&mut self, session: &Session, source: &str, destination: &str) -> SimResult<()> {
        let owner = session.require_user()?;
        let id = resolve(&self.tree, self.cwd(session), source)?;
        let content = self
            .tree
            .content(id)
            .ok_or_else(|| SimError::NotAFile(source.to_string()))?
            .to_string();

        let (dir, name) = self.destination_slot(session, id, destination)?;
        self.tree
            .create_child(dir, &name, NodeData::File { content }, owner)?;
        tracing::debug!(source, destination, "cp");
        Ok(())
    }

    /// The session's working directory. A directory removed by another
    /// session no longer resolves; the session falls back to the root.
    fn cwd(&self, session: &Session) -> NodeId {
        self.tree.lookup(session.cwd()).unwrap_or_else(|| {
            tracing::warn!("working directory was removed, using root");
            self.tree.root()
        })
    }

    fn create(&mut self, session: &Session, path: &str, data: NodeData) -> SimResult<()> {
        let owner = session.require_user()?;
        let (dir, name) = resolve_parent(&self.tree, self.cwd(session), path)?;
        let kind = data.kind();
        self.tree.create_child(dir, &name, data, owner)?;
        tracing::debug!(path, kind = kind.as_str(), "created");
        Ok(())
    }

    fn existing_file(&self, session: &Session, path: &str) -> SimResult<NodeId> {
        let id = resolve(&self.tree, self.cwd(session), path)?;
        if self.tree.is_dir(id) {
            return Err(SimError::NotAFile(path.to_string()));
        }
        Ok(id)
    }

    /// Where `mv`/`cp` put `source`: into an existing directory under the
    /// source name, or at a new path. An existing file is an occupied slot.
    fn destination_slot(
        &self,
        session: &Session,
        source: NodeId,
        destination: &str,
    ) -> SimResult<(NodeId, String)> {
        match resolve(&self.tree, self.cwd(session), destination) {
            Ok(dir) if self.tree.is_dir(dir) => Ok((dir, self.tree.name(source).to_string())),
            Ok(_) => Err(SimError::DuplicateName(destination.to_string())),
            Err(SimError::NotFound(_)) => resolve_parent(&self.tree, self.cwd(session), destination),
            Err(e) => Err(e),
        }
    }

    fn info(&self, id: NodeId) -> SimResult<EntryInfo> {
        let entry = self
            .tree
            .entry(id)
            .ok_or_else(|| SimError::NotFound(self.tree.path_of(id)))?;
        Ok(EntryInfo {
            name: entry.name.clone(),
            kind: entry.kind(),
            size: entry.size(),
            owner: entry.owner.clone(),
            created: entry.created,
            modified: entry.modified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::UserRegistry;

    fn logged_in() -> (FileSystem, Session) {
        let fs = FileSystem::new();
        let mut users = UserRegistry::new();
        users.create_user("alice", "Liddell").unwrap();
        let mut session = fs.new_session();
        users.login(&mut session, "alice").unwrap();
        (fs, session)
    }

    fn names(fs: &FileSystem, session: &Session) -> Vec<String> {
        fs.ls(session, None)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect()
    }

    #[test]
    fn test_mkdir_duplicate_name() {
        let (mut fs, session) = logged_in();
        fs.mkdir(&session, "foo").unwrap();
        assert!(matches!(
            fs.mkdir(&session, "foo"),
            Err(SimError::DuplicateName(_))
        ));
        assert!(matches!(
            fs.touch(&session, "foo"),
            Err(SimError::DuplicateName(_))
        ));
        assert_eq!(names(&fs, &session), vec!["foo"]);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let (mut fs, session) = logged_in();
        assert!(matches!(fs.mkdir(&session, ".."), Err(SimError::InvalidName(_))));
        assert!(matches!(fs.touch(&session, "/"), Err(SimError::InvalidName(_))));
    }

    #[test]
    fn test_cd_and_pwd() {
        let (mut fs, mut session) = logged_in();
        fs.mkdir(&session, "a").unwrap();
        fs.mkdir(&session, "a/b").unwrap();

        assert_eq!(fs.cd(&mut session, "a/b").unwrap(), "/a/b");
        assert_eq!(fs.pwd(&session), "/a/b");
        assert_eq!(fs.cd(&mut session, "..").unwrap(), "/a");
        assert_eq!(fs.cd(&mut session, "/").unwrap(), "/");

        // `..` at the root stays put
        fs.cd(&mut session, "..").unwrap();
        assert_eq!(fs.pwd(&session), "/");
    }

    #[test]
    fn test_cd_into_file_fails() {
        let (mut fs, mut session) = logged_in();
        fs.touch(&session, "a.txt").unwrap();
        assert!(matches!(
            fs.cd(&mut session, "a.txt"),
            Err(SimError::NotADirectory(_))
        ));
        assert_eq!(fs.pwd(&session), "/");
    }

    #[test]
    fn test_write_read_round_trip() {
        let (mut fs, session) = logged_in();
        fs.touch(&session, "a.txt").unwrap();
        assert_eq!(
            fs.write(&session, "a.txt", "hello").unwrap(),
            WriteOutcome::Updated
        );
        assert_eq!(fs.read(&session, "a.txt").unwrap(), "hello");
    }

    #[test]
    fn test_write_creates_missing_file() {
        let (mut fs, session) = logged_in();
        assert_eq!(
            fs.write(&session, "new.txt", "fresh content").unwrap(),
            WriteOutcome::Created
        );
        assert_eq!(fs.read(&session, "new.txt").unwrap(), "fresh content");

        let info = fs.stat(&session, "new.txt").unwrap();
        assert_eq!(info.owner, "alice");
        assert_eq!(info.size, Some(13));
    }

    #[test]
    fn test_write_and_read_directory_fail() {
        let (mut fs, session) = logged_in();
        fs.mkdir(&session, "docs").unwrap();
        assert!(matches!(
            fs.write(&session, "docs", "x"),
            Err(SimError::NotAFile(_))
        ));
        assert!(matches!(fs.read(&session, "docs"), Err(SimError::NotAFile(_))));
        assert!(matches!(
            fs.read(&session, "missing"),
            Err(SimError::NotFound(_))
        ));
    }

    #[test]
    fn test_append() {
        let (mut fs, session) = logged_in();
        fs.write(&session, "log", "one").unwrap();
        fs.append(&session, "log", "two").unwrap();
        assert_eq!(fs.read(&session, "log").unwrap(), "onetwo");

        assert!(matches!(
            fs.append(&session, "missing", "x"),
            Err(SimError::NotFound(_))
        ));
    }

    #[test]
    fn test_rm_non_empty_directory() {
        let (mut fs, session) = logged_in();
        fs.mkdir(&session, "d").unwrap();
        fs.touch(&session, "d/only").unwrap();

        assert!(matches!(fs.rm(&session, "d"), Err(SimError::NotEmpty(_))));
        fs.rm(&session, "d/only").unwrap();
        fs.rm(&session, "d").unwrap();
        assert!(names(&fs, &session).is_empty());
        assert!(matches!(fs.rm(&session, "d"), Err(SimError::NotFound(_))));
    }

    #[test]
    fn test_rm_root_and_cwd_rejected() {
        let (mut fs, mut session) = logged_in();
        assert!(matches!(
            fs.rm(&session, "/"),
            Err(SimError::InvalidOperation(_))
        ));

        fs.mkdir(&session, "here").unwrap();
        fs.cd(&mut session, "here").unwrap();
        assert!(matches!(
            fs.rm(&session, "."),
            Err(SimError::InvalidOperation(_))
        ));
        assert!(matches!(
            fs.rm(&session, "/here"),
            Err(SimError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_mv_preserves_content() {
        let (mut fs, session) = logged_in();
        fs.write(&session, "a.txt", "X").unwrap();
        fs.mkdir(&session, "sub").unwrap();

        fs.mv(&session, "a.txt", "sub").unwrap();
        assert_eq!(fs.read(&session, "sub/a.txt").unwrap(), "X");
        assert!(matches!(
            fs.read(&session, "a.txt"),
            Err(SimError::NotFound(_))
        ));
    }

    #[test]
    fn test_mv_renames() {
        let (mut fs, session) = logged_in();
        fs.write(&session, "a.txt", "X").unwrap();
        fs.mkdir(&session, "sub").unwrap();

        fs.mv(&session, "a.txt", "b.txt").unwrap();
        fs.mv(&session, "b.txt", "sub/c.txt").unwrap();
        assert_eq!(fs.read(&session, "/sub/c.txt").unwrap(), "X");
        assert_eq!(names(&fs, &session), vec!["sub"]);
    }

    #[test]
    fn test_mv_directory_keeps_subtree() {
        let (mut fs, session) = logged_in();
        fs.mkdir(&session, "a").unwrap();
        fs.write(&session, "a/f", "deep").unwrap();
        fs.mkdir(&session, "b").unwrap();

        fs.mv(&session, "a", "b").unwrap();
        assert_eq!(fs.read(&session, "b/a/f").unwrap(), "deep");
    }

    #[test]
    fn test_mv_into_own_subtree_fails() {
        let (mut fs, session) = logged_in();
        fs.mkdir(&session, "dirA").unwrap();
        fs.mkdir(&session, "dirA/inner").unwrap();

        assert!(matches!(
            fs.mv(&session, "dirA", "dirA/child"),
            Err(SimError::CyclicMove { .. })
        ));
        assert!(matches!(
            fs.mv(&session, "dirA", "dirA/inner"),
            Err(SimError::CyclicMove { .. })
        ));
        assert!(matches!(
            fs.mv(&session, "dirA", "dirA"),
            Err(SimError::CyclicMove { .. })
        ));

        fs.write(&session, "a", "1").unwrap();
        assert!(matches!(
            fs.mv(&session, "a", "a"),
            Err(SimError::CyclicMove { .. })
        ));
        assert!(matches!(
            fs.mv(&session, "a", "/a"),
            Err(SimError::CyclicMove { .. })
        ));
        assert_eq!(fs.tree().node_count(), 4);
        assert_eq!(names(&fs, &session), vec!["a", "dirA"]);
        assert_eq!(fs.read(&session, "a").unwrap(), "1");
    }

    #[test]
    fn test_mv_occupied_destination() {
        let (mut fs, session) = logged_in();
        fs.write(&session, "a", "1").unwrap();
        fs.write(&session, "b", "2").unwrap();
        fs.mkdir(&session, "d").unwrap();
        fs.touch(&session, "d/a").unwrap();

        assert!(matches!(
            fs.mv(&session, "a", "b"),
            Err(SimError::DuplicateName(_))
        ));
        assert!(matches!(
            fs.mv(&session, "a", "d"),
            Err(SimError::DuplicateName(_))
        ));
        assert_eq!(fs.read(&session, "a").unwrap(), "1");
    }

    #[test]
    fn test_cp_is_independent() {
        let (mut fs, session) = logged_in();
        fs.write(&session, "a.txt", "original").unwrap();
        fs.cp(&session, "a.txt", "b.txt").unwrap();

        assert_eq!(fs.read(&session, "a.txt").unwrap(), "original");
        assert_eq!(fs.read(&session, "b.txt").unwrap(), "original");

        fs.write(&session, "b.txt", "changed").unwrap();
        assert_eq!(fs.read(&session, "a.txt").unwrap(), "original");
    }

    #[test]
    fn test_cp_rules() {
        let (mut fs, session) = logged_in();
        fs.mkdir(&session, "d").unwrap();
        fs.write(&session, "a", "1").unwrap();

        assert!(matches!(fs.cp(&session, "d", "e"), Err(SimError::NotAFile(_))));
        assert!(matches!(
            fs.cp(&session, "missing", "e"),
            Err(SimError::NotFound(_))
        ));
        assert!(matches!(
            fs.cp(&session, "a", "a"),
            Err(SimError::DuplicateName(_))
        ));

        fs.cp(&session, "a", "d").unwrap();
        assert_eq!(fs.read(&session, "d/a").unwrap(), "1");
    }

    #[test]
    fn test_mv_missing_source() {
        let (mut fs, session) = logged_in();
        fs.mkdir(&session, "d").unwrap();
        assert!(matches!(
            fs.mv(&session, "missing", "d"),
            Err(SimError::NotFound(_))
        ));
        assert!(matches!(
            fs.mv(&session, "d/missing", "x"),
            Err(SimError::NotFound(_))
        ));
        assert_eq!(names(&fs, &session), vec!["d"]);
    }

    #[test]
    fn test_cp_onto_existing_nested_file() {
        let (mut fs, session) = logged_in();
        fs.write(&session, "a", "new").unwrap();
        fs.mkdir(&session, "d").unwrap();
        fs.write(&session, "d/a", "old").unwrap();

        assert!(matches!(
            fs.cp(&session, "a", "d/a"),
            Err(SimError::DuplicateName(_))
        ));
        assert!(matches!(
            fs.cp(&session, "a", "d"),
            Err(SimError::DuplicateName(_))
        ));
        assert_eq!(fs.read(&session, "d/a").unwrap(), "old");
        assert_eq!(fs.tree().node_count(), 4);
    }

    #[test]
    fn test_cwd_removed_by_other_session() {
        let (mut fs, mut first) = logged_in();
        let mut users = UserRegistry::new();
        users.create_user("bob", "Builder").unwrap();
        let mut second = fs.new_session();
        users.login(&mut second, "bob").unwrap();

        fs.mkdir(&first, "home").unwrap();
        fs.cd(&mut first, "home").unwrap();
        fs.rm(&second, "/home").unwrap();
        // Reuses the arena slot of the removed directory.
        fs.mkdir(&second, "/other").unwrap();

        assert_eq!(fs.pwd(&first), "/");
        fs.touch(&first, "x").unwrap();
        assert_eq!(names(&fs, &second), vec!["other", "x"]);
        assert!(fs.ls(&first, Some("/other")).unwrap().is_empty());

        assert_eq!(fs.cd(&mut first, "other").unwrap(), "/other");
        assert_eq!(fs.pwd(&first), "/other");
    }

    #[test]
    fn test_mutations_require_login() {
        let mut fs = FileSystem::new();
        let session = fs.new_session();

        let results = [
            fs.mkdir(&session, "d").map(|_| ()),
            fs.touch(&session, "f").map(|_| ()),
            fs.write(&session, "f", "x").map(|_| ()),
            fs.append(&session, "f", "x").map(|_| ()),
            fs.rm(&session, "f").map(|_| ()),
            fs.mv(&session, "f", "g").map(|_| ()),
            fs.cp(&session, "f", "g").map(|_| ()),
            fs.read(&session, "f").map(|_| ()),
        ];
        for result in results {
            assert!(matches!(result, Err(SimError::NotLoggedIn)));
        }
        assert_eq!(fs.tree().node_count(), 1);
    }

    #[test]
    fn test_navigation_without_login() {
        let fs = FileSystem::new();
        let mut session = fs.new_session();
        assert_eq!(fs.pwd(&session), "/");
        assert!(fs.ls(&session, None).unwrap().is_empty());
        assert_eq!(fs.cd(&mut session, "/").unwrap(), "/");
        assert_eq!(fs.stat(&session, "/").unwrap().kind, NodeKind::Directory);
    }

    #[test]
    fn test_ls_of_file_and_path() {
        let (mut fs, session) = logged_in();
        fs.mkdir(&session, "d").unwrap();
        fs.write(&session, "d/b", "22").unwrap();
        fs.touch(&session, "d/a").unwrap();

        let listing = fs.ls(&session, Some("d")).unwrap();
        let names: Vec<&str> = listing.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(listing[1].size, Some(2));

        let single = fs.ls(&session, Some("d/b")).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].kind, NodeKind::File);
    }
}
