//! In-memory storage provider.
//!
//! Keeps a whole tree in memory and hands out handles that behave like
//! native ones: children enumerate in insertion order, removed entries go
//! stale, and a read-only grant refuses writes. Failures can be injected per
//! operation so callers can exercise their error paths without a disk.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{FsError, FsResult};
use crate::handle::{DirectoryEntry, DirectoryHandle, FileEntry, FileHandle, Handle};
use crate::path;
use crate::provider::{AccessMode, StorageProvider};

/// Operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOp {
    GetDirectory,
    GetFile,
    Entries,
    Remove,
    Read,
    Write,
}

/// How the next `open_root` call is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grant {
    Allow,
    Deny,
    Cancel,
}

/// State shared by every node of one provider.
#[derive(Debug, Default)]
struct Shared {
    failing: RwLock<HashSet<MemoryOp>>,
    failing_once: RwLock<HashSet<MemoryOp>>,
    read_only: AtomicBool,
}

impl Shared {
    fn check(&self, op: MemoryOp, target: &str) -> FsResult<()> {
        let once = self.failing_once.write().remove(&op);
        if once || self.failing.read().contains(&op) {
            return Err(FsError::Provider(format!(
                "simulated {:?} failure on {}",
                op, target
            )));
        }
        Ok(())
    }

    fn check_writable(&self, target: &str) -> FsResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(FsError::PermissionDenied(format!(
                "{} (read-only grant)",
                target
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Node {
    File(Arc<MemoryFile>),
    Directory(Arc<MemoryDirectory>),
}

impl Node {
    fn detach(&self) {
        match self {
            Self::File(f) => f.detached.store(true, Ordering::SeqCst),
            Self::Directory(d) => d.detach(),
        }
    }

    fn to_handle(&self) -> Handle {
        match self {
            Self::File(f) => Handle::File(f.clone()),
            Self::Directory(d) => Handle::Directory(d.clone()),
        }
    }
}

/// A file held in memory.
#[derive(Debug)]
pub struct MemoryFile {
    name: String,
    content: RwLock<String>,
    detached: AtomicBool,
    shared: Arc<Shared>,
}

impl MemoryFile {
    fn new(name: &str, content: &str, shared: Arc<Shared>) -> Self {
        Self {
            name: name.to_string(),
            content: RwLock::new(content.to_string()),
            detached: AtomicBool::new(false),
            shared,
        }
    }

    fn ensure_attached(&self) -> FsResult<()> {
        if self.detached.load(Ordering::SeqCst) {
            return Err(FsError::NotFound(self.name.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl FileEntry for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_text(&self) -> FsResult<String> {
        self.ensure_attached()?;
        self.shared.check(MemoryOp::Read, &self.name)?;
        Ok(self.content.read().clone())
    }

    async fn write_text(&self, content: &str) -> FsResult<()> {
        self.ensure_attached()?;
        self.shared.check(MemoryOp::Write, &self.name)?;
        self.shared.check_writable(&self.name)?;
        *self.content.write() = content.to_string();
        Ok(())
    }
}

/// A directory held in memory.
#[derive(Debug)]
pub struct MemoryDirectory {
    name: String,
    children: RwLock<Vec<(String, Node)>>,
    detached: AtomicBool,
    shared: Arc<Shared>,
}

impl MemoryDirectory {
    fn new(name: &str, shared: Arc<Shared>) -> Self {
        Self {
            name: name.to_string(),
            children: RwLock::new(Vec::new()),
            detached: AtomicBool::new(false),
            shared,
        }
    }

    fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
        for (_, child) in self.children.read().iter() {
            child.detach();
        }
    }

    fn ensure_attached(&self) -> FsResult<()> {
        if self.detached.load(Ordering::SeqCst) {
            return Err(FsError::NotFound(self.name.clone()));
        }
        Ok(())
    }

    fn child(&self, name: &str) -> Option<Node> {
        self.children
            .read()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node.clone())
    }

    fn child_directory(&self, name: &str, create: bool) -> FsResult<Arc<MemoryDirectory>> {
        match self.child(name) {
            Some(Node::Directory(d)) => Ok(d),
            Some(Node::File(_)) => Err(FsError::TypeMismatch(format!("{} is a file", name))),
            None if create => {
                self.shared.check_writable(name)?;
                let dir = Arc::new(MemoryDirectory::new(name, self.shared.clone()));
                self.children
                    .write()
                    .push((name.to_string(), Node::Directory(dir.clone())));
                Ok(dir)
            }
            None => Err(FsError::NotFound(name.to_string())),
        }
    }

    fn child_file(&self, name: &str, create: bool) -> FsResult<Arc<MemoryFile>> {
        match self.child(name) {
            Some(Node::File(f)) => Ok(f),
            Some(Node::Directory(_)) => {
                Err(FsError::TypeMismatch(format!("{} is a directory", name)))
            }
            None if create => {
                self.shared.check_writable(name)?;
                let file = Arc::new(MemoryFile::new(name, "", self.shared.clone()));
                self.children
                    .write()
                    .push((name.to_string(), Node::File(file.clone())));
                Ok(file)
            }
            None => Err(FsError::NotFound(name.to_string())),
        }
    }
}

#[async_trait]
impl DirectoryEntry for MemoryDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_directory(&self, name: &str, create: bool) -> FsResult<DirectoryHandle> {
        path::validate_name(name)?;
        self.ensure_attached()?;
        self.shared.check(MemoryOp::GetDirectory, name)?;
        let dir: DirectoryHandle = self.child_directory(name, create)?;
        Ok(dir)
    }

    async fn get_file(&self, name: &str, create: bool) -> FsResult<FileHandle> {
        path::validate_name(name)?;
        self.ensure_attached()?;
        self.shared.check(MemoryOp::GetFile, name)?;
        let file: FileHandle = self.child_file(name, create)?;
        Ok(file)
    }

    async fn entries(&self) -> FsResult<Vec<(String, Handle)>> {
        self.ensure_attached()?;
        self.shared.check(MemoryOp::Entries, &self.name)?;
        Ok(self
            .children
            .read()
            .iter()
            .map(|(name, node)| (name.clone(), node.to_handle()))
            .collect())
    }

    async fn remove_entry(&self, name: &str, recursive: bool) -> FsResult<()> {
        path::validate_name(name)?;
        self.ensure_attached()?;
        self.shared.check(MemoryOp::Remove, name)?;
        self.shared.check_writable(name)?;

        let mut children = self.children.write();
        let index = children
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;

        if let Node::Directory(d) = &children[index].1 {
            if !recursive && !d.children.read().is_empty() {
                return Err(FsError::Provider(format!("directory not empty: {}", name)));
            }
        }

        let (_, node) = children.remove(index);
        node.detach();
        Ok(())
    }
}

/// In-memory provider with a single root folder.
///
/// Clones share the same tree, so a test can keep one clone for seeding and
/// inspection while the manager owns another.
#[derive(Clone)]
pub struct MemoryProvider {
    root: Arc<MemoryDirectory>,
    shared: Arc<Shared>,
    grant: Arc<RwLock<Grant>>,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new("project")
    }
}

impl MemoryProvider {
    /// Create an empty provider whose root folder is called `root_name`.
    pub fn new(root_name: impl Into<String>) -> Self {
        let shared = Arc::new(Shared::default());
        Self {
            root: Arc::new(MemoryDirectory::new(&root_name.into(), shared.clone())),
            shared,
            grant: Arc::new(RwLock::new(Grant::Allow)),
        }
    }

    /// Seed a file (and any missing parent directories).
    pub fn with_file(self, file_path: &str, content: impl Into<String>) -> Self {
        self.seed_file(file_path, &content.into());
        self
    }

    /// Seed a directory (and any missing parents).
    pub fn with_directory(self, dir_path: &str) -> Self {
        self.seed_directory(dir_path);
        self
    }

    /// Refuse the next grants with `PermissionDenied`.
    pub fn deny_access(self) -> Self {
        *self.grant.write() = Grant::Deny;
        self
    }

    /// Answer the next grants with `UserCancelled`.
    pub fn cancel_selection(self) -> Self {
        *self.grant.write() = Grant::Cancel;
        self
    }

    /// Grant access again after `deny_access` or `cancel_selection`.
    pub fn allow_access(&self) {
        *self.grant.write() = Grant::Allow;
    }

    /// Make every future `op` fail with a provider error.
    pub fn fail_on(self, op: MemoryOp) -> Self {
        self.fail(op);
        self
    }

    /// Same as [`fail_on`](Self::fail_on) without consuming the provider.
    pub fn fail(&self, op: MemoryOp) {
        self.shared.failing.write().insert(op);
    }

    /// Make only the next `op` fail.
    pub fn fail_once(&self, op: MemoryOp) {
        self.shared.failing_once.write().insert(op);
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        self.shared.failing.write().clear();
        self.shared.failing_once.write().clear();
    }

    /// True if an entry exists at `entry_path`, ignoring any cache.
    pub fn exists(&self, entry_path: &str) -> bool {
        self.lookup(entry_path).is_some()
    }

    /// Content of the file at `file_path`, ignoring any cache.
    pub fn content(&self, file_path: &str) -> Option<String> {
        match self.lookup(file_path)? {
            Node::File(f) => Some(f.content.read().clone()),
            Node::Directory(_) => None,
        }
    }

    fn lookup(&self, entry_path: &str) -> Option<Node> {
        let mut node = Node::Directory(self.root.clone());
        for segment in path::segments(entry_path) {
            node = match node {
                Node::Directory(d) => d.child(segment)?,
                Node::File(_) => return None,
            };
        }
        Some(node)
    }

    fn seed_directory(&self, dir_path: &str) -> Option<Arc<MemoryDirectory>> {
        let mut dir = self.root.clone();
        for segment in path::segments(dir_path) {
            dir = dir.child_directory(segment, true).ok()?;
        }
        Some(dir)
    }

    fn seed_file(&self, file_path: &str, content: &str) {
        let Some((parent, name)) = path::split(file_path) else {
            return;
        };
        if let Some(dir) = self.seed_directory(&parent) {
            if let Ok(file) = dir.child_file(&name, true) {
                *file.content.write() = content.to_string();
            }
        }
    }
}

#[async_trait]
impl StorageProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn open_root(&self, mode: AccessMode) -> FsResult<DirectoryHandle> {
        match *self.grant.read() {
            Grant::Deny => {
                return Err(FsError::PermissionDenied(self.root.name.clone()));
            }
            Grant::Cancel => return Err(FsError::UserCancelled),
            Grant::Allow => {}
        }
        self.shared
            .read_only
            .store(!mode.is_writable(), Ordering::SeqCst);
        Ok(self.root.clone())
    }
}
