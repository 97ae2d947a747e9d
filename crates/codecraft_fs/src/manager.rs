//! Handle cache and file-system adapter.
//!
//! `FileSystemManager` is the session object for one opened project root.
//! It maps logical paths to provider handles, resolving lazily from the root
//! whenever a path is not cached. The cache is advisory: an entry removed
//! behind the manager's back simply fails on use and is re-resolved next time.
//!
//! Every contract method (`create_file`, `read_file`, ...) has a `try_*` twin
//! returning the failure reason. The contract methods log that reason and
//! collapse it into `false` / `None`.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::error::{FsError, FsResult};
use crate::handle::{DirectoryHandle, FileHandle, Handle};
use crate::path;
use crate::provider::{AccessMode, StorageProvider};
use crate::tree::FileTreeNode;

type ScanFuture<'a> = Pin<Box<dyn Future<Output = FsResult<FileTreeNode>> + Send + 'a>>;

/// Session state for one storage provider and its opened root.
pub struct FileSystemManager {
    provider: RwLock<Arc<dyn StorageProvider>>,
    mode: AccessMode,
    root: RwLock<Option<DirectoryHandle>>,
    files: RwLock<HashMap<String, FileHandle>>,
    directories: RwLock<HashMap<String, DirectoryHandle>>,
}

impl FileSystemManager {
    /// Create a manager that will ask `provider` for a read-write root.
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self::with_access_mode(provider, AccessMode::ReadWrite)
    }

    /// Create a manager that will ask for the given access when opening.
    pub fn with_access_mode(provider: Arc<dyn StorageProvider>, mode: AccessMode) -> Self {
        Self {
            provider: RwLock::new(provider),
            mode,
            root: RwLock::new(None),
            files: RwLock::new(HashMap::new()),
            directories: RwLock::new(HashMap::new()),
        }
    }

    /// Swap the provider used by the next `open_root`.
    ///
    /// The current root and cache stay in place until that open succeeds.
    pub fn set_provider(&self, provider: Arc<dyn StorageProvider>) {
        *self.provider.write() = provider;
    }

    pub fn access_mode(&self) -> AccessMode {
        self.mode
    }

    // ========================================================================
    // Root lifecycle
    // ========================================================================

    /// Ask the provider for a root and make it the session root.
    ///
    /// On success both handle maps are cleared before the new root is cached,
    /// so no handle from a previous root survives. On failure the previous
    /// session is left untouched.
    pub async fn open_root(&self) -> FsResult<DirectoryHandle> {
        let provider = self.provider.read().clone();
        let root = provider.open_root(self.mode).await.map_err(|e| {
            warn!("Opening root via {} failed: {}", provider.name(), e);
            e
        })?;

        self.files.write().clear();
        {
            let mut directories = self.directories.write();
            directories.clear();
            directories.insert(path::ROOT.to_string(), root.clone());
        }
        *self.root.write() = Some(root.clone());

        info!("Opened root '{}' via {} provider", root.name(), provider.name());
        Ok(root)
    }

    /// Open a root and scan it, returning the whole tree.
    pub async fn open_project(&self) -> FsResult<FileTreeNode> {
        let root = self.open_root().await?;
        self.try_scan_directory(root, path::ROOT).await
    }

    /// Rescan the current root.
    pub async fn refresh(&self) -> FsResult<FileTreeNode> {
        let root = self.root().ok_or(FsError::RootNotOpen)?;
        self.try_scan_directory(root, path::ROOT).await
    }

    /// Forget the root and every cached handle.
    pub fn reset(&self) {
        *self.root.write() = None;
        self.files.write().clear();
        self.directories.write().clear();
        debug!("Handle cache reset");
    }

    pub fn is_open(&self) -> bool {
        self.root.read().is_some()
    }

    pub fn root(&self) -> Option<DirectoryHandle> {
        self.root.read().clone()
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Resolve a directory by path, or `None` if any segment is missing.
    pub async fn resolve_directory(&self, dir_path: &str) -> Option<DirectoryHandle> {
        log_failure("resolve directory", dir_path, self.try_resolve_directory(dir_path).await)
    }

    /// Resolve a directory, walking from the root when it is not cached.
    ///
    /// Every directory visited on the way is cached. Nothing is created.
    pub async fn try_resolve_directory(&self, dir_path: &str) -> FsResult<DirectoryHandle> {
        let root = self.root().ok_or(FsError::RootNotOpen)?;
        if path::is_root(dir_path) {
            return Ok(root);
        }

        let key = path::normalize(dir_path);
        if let Some(handle) = self.directories.read().get(&key).cloned() {
            debug!("Directory cache hit: {}", key);
            return Ok(handle);
        }

        debug!("Directory cache miss, walking: {}", key);
        let mut current = root;
        let mut walked = path::ROOT.to_string();
        for segment in path::segments(&key) {
            walked = path::join(&walked, segment);
            let cached = self.directories.read().get(&walked).cloned();
            current = match cached {
                Some(handle) => handle,
                None => {
                    let handle = current.get_directory(segment, false).await?;
                    self.directories.write().insert(walked.clone(), handle.clone());
                    handle
                }
            };
        }
        Ok(current)
    }

    /// Resolve a file by path, or `None` if it or its parent is missing.
    pub async fn resolve_file(&self, file_path: &str) -> Option<FileHandle> {
        log_failure("resolve file", file_path, self.try_resolve_file(file_path).await)
    }

    /// Resolve a file through its parent directory when it is not cached.
    pub async fn try_resolve_file(&self, file_path: &str) -> FsResult<FileHandle> {
        if !self.is_open() {
            return Err(FsError::RootNotOpen);
        }

        let key = path::normalize(file_path);
        if let Some(handle) = self.files.read().get(&key).cloned() {
            debug!("File cache hit: {}", key);
            return Ok(handle);
        }

        let (parent, name) = path::split(&key).ok_or_else(|| FsError::NotFound(key.clone()))?;
        let directory = self.try_resolve_directory(&parent).await?;
        let handle = directory.get_file(&name, false).await?;
        self.files.write().insert(key, handle.clone());
        Ok(handle)
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Create (or overwrite) `name` inside `dir_path` with `content`.
    pub async fn create_file(&self, dir_path: &str, name: &str, content: &str) -> bool {
        let target = path::join(dir_path, name);
        log_failure("create file", &target, self.try_create_file(dir_path, name, content).await)
            .is_some()
    }

    /// Create or overwrite a file and return its canonical path.
    pub async fn try_create_file(&self, dir_path: &str, name: &str, content: &str) -> FsResult<String> {
        path::validate_name(name)?;
        let directory = self.try_resolve_directory(dir_path).await?;
        let handle = directory.get_file(name, true).await?;
        handle.write_text(content).await?;

        let key = path::normalize(&path::join(dir_path, name));
        self.files.write().insert(key.clone(), handle);
        info!("Created file {} ({} bytes)", key, content.len());
        Ok(key)
    }

    /// Create (or reuse) directory `name` inside `parent_path`.
    pub async fn create_directory(&self, parent_path: &str, name: &str) -> bool {
        let target = path::join(parent_path, name);
        log_failure("create directory", &target, self.try_create_directory(parent_path, name).await)
            .is_some()
    }

    /// Create or reuse a directory and return its canonical path.
    pub async fn try_create_directory(&self, parent_path: &str, name: &str) -> FsResult<String> {
        path::validate_name(name)?;
        let parent = self.try_resolve_directory(parent_path).await?;
        let handle = parent.get_directory(name, true).await?;

        let key = path::normalize(&path::join(parent_path, name));
        self.directories.write().insert(key.clone(), handle);
        info!("Created directory {}", key);
        Ok(key)
    }

    /// Read a whole file, or `None` on any resolution or I/O failure.
    pub async fn read_file(&self, file_path: &str) -> Option<String> {
        log_failure("read file", file_path, self.try_read_file(file_path).await)
    }

    pub async fn try_read_file(&self, file_path: &str) -> FsResult<String> {
        let handle = self.try_resolve_file(file_path).await?;
        handle.read_text().await
    }

    /// Replace the whole content of an existing file.
    pub async fn write_file(&self, file_path: &str, content: &str) -> bool {
        log_failure("write file", file_path, self.try_write_file(file_path, content).await)
            .is_some()
    }

    pub async fn try_write_file(&self, file_path: &str, content: &str) -> FsResult<()> {
        let handle = self.try_resolve_file(file_path).await?;
        handle.write_text(content).await?;
        debug!("Wrote {} bytes to {}", content.len(), path::normalize(file_path));
        Ok(())
    }

    /// Remove a file through its parent directory.
    pub async fn delete_file(&self, file_path: &str) -> bool {
        log_failure("delete file", file_path, self.try_delete_file(file_path).await).is_some()
    }

    pub async fn try_delete_file(&self, file_path: &str) -> FsResult<()> {
        let key = path::normalize(file_path);
        let (parent, name) = path::split(&key)
            .ok_or_else(|| FsError::UnsupportedOperation("cannot delete the root".to_string()))?;

        let directory = self.try_resolve_directory(&parent).await?;
        directory.remove_entry(&name, false).await?;

        self.files.write().remove(&key);
        self.directories.write().remove(&key);
        info!("Deleted file {}", key);
        Ok(())
    }

    /// Remove a directory and everything below it.
    ///
    /// Destructive and unconfirmed. Cached handles for the directory and all
    /// of its descendants are evicted.
    pub async fn delete_directory(&self, dir_path: &str) -> bool {
        log_failure("delete directory", dir_path, self.try_delete_directory(dir_path).await)
            .is_some()
    }

    pub async fn try_delete_directory(&self, dir_path: &str) -> FsResult<()> {
        let key = path::normalize(dir_path);
        let (parent, name) = path::split(&key)
            .ok_or_else(|| FsError::UnsupportedOperation("cannot delete the root".to_string()))?;

        let directory = self.try_resolve_directory(&parent).await?;
        directory.remove_entry(&name, true).await?;

        let evicted = self.evict_within(&key);
        info!("Deleted directory {} ({} cached handles evicted)", key, evicted);
        Ok(())
    }

    /// Rename a file within its parent directory.
    ///
    /// Directories cannot be renamed and always yield `false`.
    pub async fn rename(&self, old_path: &str, new_name: &str) -> bool {
        log_failure("rename", old_path, self.try_rename(old_path, new_name).await).is_some()
    }

    /// Rename a file by copy, create, and delete; returns the new path.
    ///
    /// Success is reported only once the old entry is gone. If writing the
    /// copy or removing the original fails, the new entry is rolled back (or
    /// the overwritten sibling restored) and that error is returned. If the
    /// rollback fails too, `AlreadyInconsistent` is returned.
    pub async fn try_rename(&self, old_path: &str, new_name: &str) -> FsResult<String> {
        path::validate_name(new_name)?;
        let key = path::normalize(old_path);
        let (parent, old_name) = path::split(&key)
            .ok_or_else(|| FsError::UnsupportedOperation("cannot rename the root".to_string()))?;

        if self.try_resolve_file(&key).await.is_err() {
            if self.try_resolve_directory(&key).await.is_ok() {
                return Err(FsError::UnsupportedOperation(format!(
                    "directory rename is not supported: {}",
                    key
                )));
            }
            return Err(FsError::NotFound(key));
        }

        let new_key = path::normalize(&path::join(&parent, new_name));
        if new_key == key {
            return Ok(key);
        }

        let content = self.try_read_file(&key).await?;
        let overwritten = self.try_read_file(&new_key).await.ok();
        let directory = self.try_resolve_directory(&parent).await?;

        if let Err(create_err) = self.try_create_file(&parent, new_name, &content).await {
            warn!("Rename of {} failed to write {}: {}", key, new_key, create_err);
            return Err(self
                .undo_copy(&directory, &new_key, new_name, overwritten.as_deref(), create_err)
                .await);
        }

        match directory.remove_entry(&old_name, false).await {
            Ok(()) => {
                self.files.write().remove(&key);
                info!("Renamed {} -> {}", key, new_key);
                Ok(new_key)
            }
            Err(delete_err) => {
                warn!("Rename of {} failed to remove the original: {}", key, delete_err);
                Err(self
                    .undo_copy(&directory, &new_key, new_name, overwritten.as_deref(), delete_err)
                    .await)
            }
        }
    }

    /// Put `new_name` back the way it was before a rename touched it.
    ///
    /// Returns `cause` when the undo worked, `AlreadyInconsistent` otherwise.
    async fn undo_copy(
        &self,
        directory: &DirectoryHandle,
        new_key: &str,
        new_name: &str,
        overwritten: Option<&str>,
        cause: FsError,
    ) -> FsError {
        let rollback = match overwritten {
            Some(previous) => self.try_write_file(new_key, previous).await,
            None => directory.remove_entry(new_name, false).await,
        };
        match rollback {
            Ok(()) => {
                if overwritten.is_none() {
                    self.files.write().remove(new_key);
                }
                cause
            }
            Err(rollback_err) => FsError::AlreadyInconsistent(format!(
                "{} left behind after a failed rename ({}; rollback: {})",
                new_key, cause, rollback_err
            )),
        }
    }

    // ========================================================================
    // Scanning
    // ========================================================================

    /// Scan a directory eagerly, or `None` if any enumeration fails.
    pub async fn scan_directory(&self, handle: DirectoryHandle, dir_path: &str) -> Option<FileTreeNode> {
        log_failure("scan directory", dir_path, self.try_scan_directory(handle, dir_path).await)
    }

    /// Enumerate every descendant of `handle`, caching each handle found.
    ///
    /// No depth or count limit: cost is linear in the number of descendants.
    pub async fn try_scan_directory(&self, handle: DirectoryHandle, dir_path: &str) -> FsResult<FileTreeNode> {
        let tree = self.scan_boxed(handle, path::normalize(dir_path)).await?;
        debug!("Scanned {} ({} entries)", path::normalize(dir_path), tree.count());
        Ok(tree)
    }

    fn scan_boxed(&self, handle: DirectoryHandle, dir_path: String) -> ScanFuture<'_> {
        Box::pin(async move {
            let mut children = Vec::new();
            for (name, child) in handle.entries().await? {
                let child_path = path::join(&dir_path, &name);
                match child {
                    Handle::File(file) => {
                        self.files.write().insert(child_path, file.clone());
                        children.push(FileTreeNode::file(name, Handle::File(file)));
                    }
                    Handle::Directory(dir) => {
                        self.directories.write().insert(child_path.clone(), dir.clone());
                        let mut node = self.scan_boxed(dir, child_path).await?;
                        node.name = name;
                        children.push(node);
                    }
                }
            }
            let name = handle.name().to_string();
            Ok(FileTreeNode::directory(name, Handle::Directory(handle), children))
        })
    }

    /// Cache every handle of an already scanned tree rooted at `base`.
    pub fn cache_tree(&self, base: &str, node: &FileTreeNode) {
        let key = path::normalize(base);
        match &node.handle {
            Some(Handle::Directory(dir)) => {
                self.directories.write().insert(key.clone(), dir.clone());
            }
            Some(Handle::File(file)) => {
                self.files.write().insert(key.clone(), file.clone());
            }
            None => {}
        }
        for child in node.children() {
            self.cache_tree(&path::join(&key, &child.name), child);
        }
    }

    // ========================================================================
    // Cache inspection
    // ========================================================================

    /// Cached file paths, sorted.
    pub fn cached_file_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Cached directory paths, sorted.
    pub fn cached_directory_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.directories.read().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn evict_within(&self, prefix: &str) -> usize {
        let mut evicted = 0;
        {
            let mut files = self.files.write();
            let before = files.len();
            files.retain(|key, _| !path::is_within(key, prefix));
            evicted += before - files.len();
        }
        {
            let mut directories = self.directories.write();
            let before = directories.len();
            directories.retain(|key, _| !path::is_within(key, prefix));
            evicted += before - directories.len();
        }
        evicted
    }
}

/// Log a failed operation and turn the result into an `Option`.
fn log_failure<T>(operation: &str, target: &str, result: FsResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_not_found() => {
            warn!("Cannot {} {}: {}", operation, target, e);
            None
        }
        Err(e) => {
            error!("Error trying to {} {}: {}", operation, target, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::same_directory;
    use crate::memory::{MemoryOp, MemoryProvider};

    fn manager_for(provider: &MemoryProvider) -> FileSystemManager {
        FileSystemManager::new(Arc::new(provider.clone()))
    }

    #[tokio::test]
    async fn test_resolution_without_root_is_none() {
        let manager = manager_for(&MemoryProvider::default().with_directory("/src"));
        assert!(manager.resolve_directory("/").await.is_none());
        assert!(manager.resolve_directory("/src").await.is_none());
        assert!(manager.resolve_file("/src/main.rs").await.is_none());
    }

    #[tokio::test]
    async fn test_resolution_caches_intermediate_directories() {
        let provider = MemoryProvider::default().with_directory("/a/b/c");
        let manager = manager_for(&provider);
        manager.open_root().await.unwrap();

        let first = manager.resolve_directory("/a/b/c").await.unwrap();
        let second = manager.resolve_directory("a//b/c/").await.unwrap();

        assert!(same_directory(&first, &second));
        assert_eq!(
            manager.cached_directory_paths(),
            vec!["/", "/a", "/a/b", "/a/b/c"]
        );
    }

    #[test]
    fn test_access_mode_defaults_to_read_write() {
        let provider = Arc::new(MemoryProvider::default());
        assert!(FileSystemManager::new(provider.clone()).access_mode().is_writable());

        let read_only = FileSystemManager::with_access_mode(provider, AccessMode::Read);
        assert_eq!(read_only.access_mode(), AccessMode::Read);
    }

    #[tokio::test]
    async fn test_root_path_short_circuits() {
        let manager = manager_for(&MemoryProvider::default());
        let root = manager.open_root().await.unwrap();

        let resolved = manager.resolve_directory("").await.unwrap();
        assert!(same_directory(&root, &resolved));
    }

    #[tokio::test]
    async fn test_failed_open_keeps_previous_session() {
        let provider = MemoryProvider::default().with_file("/keep.txt", "k");
        let manager = manager_for(&provider);
        manager.open_project().await.unwrap();

        manager.set_provider(Arc::new(MemoryProvider::default().cancel_selection()));
        assert!(matches!(manager.open_root().await, Err(FsError::UserCancelled)));

        assert!(manager.is_open());
        assert_eq!(manager.read_file("/keep.txt").await.as_deref(), Some("k"));
    }

    #[tokio::test]
    async fn test_delete_file_evicts_and_reports_missing() {
        let provider = MemoryProvider::default().with_file("/old.js", "x");
        let manager = manager_for(&provider);
        manager.open_project().await.unwrap();

        assert!(manager.delete_file("/old.js").await);
        assert!(manager.read_file("/old.js").await.is_none());
        assert!(!manager.delete_file("/old.js").await);
        assert!(!manager.cached_file_paths().contains(&"/old.js".to_string()));
    }

    #[tokio::test]
    async fn test_delete_root_is_refused() {
        let manager = manager_for(&MemoryProvider::default());
        manager.open_root().await.unwrap();

        assert!(matches!(
            manager.try_delete_directory("/").await,
            Err(FsError::UnsupportedOperation(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_to_same_name_is_a_no_op() {
        let provider = MemoryProvider::default().with_file("/a.txt", "same");
        let manager = manager_for(&provider);
        manager.open_root().await.unwrap();

        assert_eq!(manager.try_rename("/a.txt", "a.txt").await.unwrap(), "/a.txt");
        assert_eq!(provider.content("/a.txt").as_deref(), Some("same"));
    }

    #[tokio::test]
    async fn test_rename_restores_overwritten_sibling_on_failure() {
        let provider = MemoryProvider::default()
            .with_file("/a.txt", "from a")
            .with_file("/b.txt", "original b");
        let manager = manager_for(&provider);
        manager.open_project().await.unwrap();

        provider.fail(MemoryOp::Remove);
        assert!(!manager.rename("/a.txt", "b.txt").await);

        assert_eq!(provider.content("/a.txt").as_deref(), Some("from a"));
        assert_eq!(provider.content("/b.txt").as_deref(), Some("original b"));
    }

    #[tokio::test]
    async fn test_rename_reports_inconsistency_when_rollback_fails() {
        let provider = MemoryProvider::default().with_file("/a.txt", "body");
        let manager = manager_for(&provider);
        manager.open_project().await.unwrap();

        provider.fail(MemoryOp::Remove);
        let result = manager.try_rename("/a.txt", "c.txt").await;

        assert!(matches!(result, Err(FsError::AlreadyInconsistent(_))));
        assert!(provider.exists("/a.txt"));
        assert!(provider.exists("/c.txt"));
    }

    #[tokio::test]
    async fn test_cache_tree_registers_every_handle() {
        let provider = MemoryProvider::default()
            .with_file("/src/lib.rs", "")
            .with_file("/README.md", "");
        let manager = manager_for(&provider);
        let tree = manager.open_project().await.unwrap();

        manager.reset();
        assert!(manager.cached_file_paths().is_empty());

        manager.cache_tree("/", &tree);
        assert_eq!(manager.cached_file_paths(), vec!["/README.md", "/src/lib.rs"]);
        assert_eq!(manager.cached_directory_paths(), vec!["/", "/src"]);
    }
}
