//! Storage provider backed by a directory on the local disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{FsError, FsResult};
use crate::handle::{DirectoryEntry, DirectoryHandle, FileEntry, FileHandle, Handle};
use crate::path;
use crate::provider::{AccessMode, StorageProvider};

/// Provider that grants a fixed directory on disk.
#[derive(Debug, Clone)]
pub struct LocalProvider {
    root: PathBuf,
}

impl LocalProvider {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Directory this provider grants.
    pub fn root_path(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl StorageProvider for LocalProvider {
    fn name(&self) -> &str {
        "local"
    }

    async fn open_root(&self, mode: AccessMode) -> FsResult<DirectoryHandle> {
        let shown = self.root.display().to_string();
        let metadata = fs::metadata(&self.root)
            .await
            .map_err(|e| FsError::from_io(e, shown.clone()))?;

        if !metadata.is_dir() {
            return Err(FsError::TypeMismatch(format!("{} is not a directory", shown)));
        }
        if mode.is_writable() && metadata.permissions().readonly() {
            return Err(FsError::PermissionDenied(shown));
        }

        let name = self
            .root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path::ROOT.to_string());

        debug!("Granted {} ({:?})", shown, mode);
        Ok(Arc::new(LocalDirectory {
            name,
            path: self.root.clone(),
            writable: mode.is_writable(),
        }))
    }
}

/// A directory on disk.
#[derive(Debug)]
pub struct LocalDirectory {
    name: String,
    path: PathBuf,
    writable: bool,
}

impl LocalDirectory {
    fn child(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    fn check_writable(&self, target: &Path) -> FsResult<()> {
        if !self.writable {
            return Err(FsError::PermissionDenied(format!(
                "{} (read-only grant)",
                target.display()
            )));
        }
        Ok(())
    }

    fn directory(&self, name: &str, path: PathBuf) -> DirectoryHandle {
        Arc::new(LocalDirectory {
            name: name.to_string(),
            path,
            writable: self.writable,
        })
    }

    fn file(&self, name: &str, path: PathBuf) -> FileHandle {
        Arc::new(LocalFile {
            name: name.to_string(),
            path,
            writable: self.writable,
        })
    }
}

#[async_trait]
impl DirectoryEntry for LocalDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_directory(&self, name: &str, create: bool) -> FsResult<DirectoryHandle> {
        path::validate_name(name)?;
        let child = self.child(name);

        match fs::metadata(&child).await {
            Ok(m) if m.is_dir() => Ok(self.directory(name, child)),
            Ok(_) => Err(FsError::TypeMismatch(format!("{} is a file", child.display()))),
            Err(e) if e.kind() == ErrorKind::NotFound && create => {
                self.check_writable(&child)?;
                fs::create_dir(&child)
                    .await
                    .map_err(|e| FsError::from_io(e, child.display().to_string()))?;
                Ok(self.directory(name, child))
            }
            Err(e) => Err(FsError::from_io(e, child.display().to_string())),
        }
    }

    async fn get_file(&self, name: &str, create: bool) -> FsResult<FileHandle> {
        path::validate_name(name)?;
        let child = self.child(name);

        match fs::metadata(&child).await {
            Ok(m) if m.is_file() => Ok(self.file(name, child)),
            Ok(_) => Err(FsError::TypeMismatch(format!(
                "{} is a directory",
                child.display()
            ))),
            Err(e) if e.kind() == ErrorKind::NotFound && create => {
                self.check_writable(&child)?;
                fs::write(&child, "")
                    .await
                    .map_err(|e| FsError::from_io(e, child.display().to_string()))?;
                Ok(self.file(name, child))
            }
            Err(e) => Err(FsError::from_io(e, child.display().to_string())),
        }
    }

    async fn entries(&self) -> FsResult<Vec<(String, Handle)>> {
        let shown = self.path.display().to_string();
        let mut reader = fs::read_dir(&self.path)
            .await
            .map_err(|e| FsError::from_io(e, shown.clone()))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| FsError::from_io(e, shown.clone()))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                warn!("Skipping non UTF-8 entry in {}", shown);
                continue;
            };
            // Follows symlinks, so a link to a directory enumerates as one.
            let metadata = match fs::metadata(entry.path()).await {
                Ok(m) => m,
                Err(e) => {
                    warn!("Skipping unreadable entry {}: {}", name, e);
                    continue;
                }
            };
            let handle = if metadata.is_dir() {
                Handle::Directory(self.directory(&name, entry.path()))
            } else {
                Handle::File(self.file(&name, entry.path()))
            };
            entries.push((name, handle));
        }
        Ok(entries)
    }

    async fn remove_entry(&self, name: &str, recursive: bool) -> FsResult<()> {
        path::validate_name(name)?;
        let child = self.child(name);
        self.check_writable(&child)?;
        let shown = child.display().to_string();

        let metadata = fs::symlink_metadata(&child)
            .await
            .map_err(|e| FsError::from_io(e, shown.clone()))?;

        let result = if metadata.is_dir() {
            if recursive {
                fs::remove_dir_all(&child).await
            } else {
                fs::remove_dir(&child).await
            }
        } else {
            fs::remove_file(&child).await
        };

        result.map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => FsError::from_io(e, shown),
            _ => FsError::Provider(format!("cannot remove {}: {}", shown, e)),
        })
    }
}

/// A file on disk.
#[derive(Debug)]
pub struct LocalFile {
    name: String,
    path: PathBuf,
    writable: bool,
}

#[async_trait]
impl FileEntry for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_text(&self) -> FsResult<String> {
        fs::read_to_string(&self.path)
            .await
            .map_err(|e| FsError::from_io(e, self.path.display().to_string()))
    }

    async fn write_text(&self, content: &str) -> FsResult<()> {
        let shown = self.path.display().to_string();
        if !self.writable {
            return Err(FsError::PermissionDenied(format!("{} (read-only grant)", shown)));
        }
        // A handle whose file was removed must not resurrect it.
        fs::metadata(&self.path)
            .await
            .map_err(|e| FsError::from_io(e, shown.clone()))?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| FsError::from_io(e, shown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_create_read_write_on_disk() {
        let dir = tempdir().unwrap();
        let provider = LocalProvider::new(dir.path());
        let root = provider.open_root(AccessMode::ReadWrite).await.unwrap();

        let src = root.get_directory("src", true).await.unwrap();
        let file = src.get_file("main.rs", true).await.unwrap();
        file.write_text("fn main() {}").await.unwrap();

        let on_disk = std::fs::read_to_string(dir.path().join("src/main.rs")).unwrap();
        assert_eq!(on_disk, "fn main() {}");
        assert_eq!(file.read_text().await.unwrap(), "fn main() {}");
    }

    #[tokio::test]
    async fn test_missing_entries_are_not_found() {
        let dir = tempdir().unwrap();
        let root = LocalProvider::new(dir.path())
            .open_root(AccessMode::ReadWrite)
            .await
            .unwrap();

        assert!(matches!(
            root.get_file("nope.txt", false).await,
            Err(FsError::NotFound(_))
        ));
        assert!(matches!(
            root.get_directory("nope", false).await,
            Err(FsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_root_is_not_found() {
        let dir = tempdir().unwrap();
        let provider = LocalProvider::new(dir.path().join("missing"));
        assert!(matches!(
            provider.open_root(AccessMode::ReadWrite).await,
            Err(FsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_read_only_grant() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "keep").unwrap();
        let root = LocalProvider::new(dir.path())
            .open_root(AccessMode::Read)
            .await
            .unwrap();

        let file = root.get_file("a.txt", false).await.unwrap();
        assert!(matches!(
            file.write_text("lost").await,
            Err(FsError::PermissionDenied(_))
        ));
        assert!(matches!(
            root.get_file("b.txt", true).await,
            Err(FsError::PermissionDenied(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_non_empty_directory_needs_recursive() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg/inner")).unwrap();
        std::fs::write(dir.path().join("pkg/inner/x.txt"), "x").unwrap();
        let root = LocalProvider::new(dir.path())
            .open_root(AccessMode::ReadWrite)
            .await
            .unwrap();

        assert!(root.remove_entry("pkg", false).await.is_err());
        root.remove_entry("pkg", true).await.unwrap();
        assert!(!dir.path().join("pkg").exists());
    }

    #[tokio::test]
    async fn test_entries_and_root_path() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("lib")).unwrap();
        std::fs::write(dir.path().join("index.js"), "").unwrap();
        let provider = LocalProvider::new(dir.path());
        assert_eq!(provider.root_path(), dir.path());

        let root = provider.open_root(AccessMode::ReadWrite).await.unwrap();
        let mut kinds: Vec<(String, bool)> = root
            .entries()
            .await
            .unwrap()
            .into_iter()
            .map(|(name, handle)| (name, handle.as_file().is_some()))
            .collect();
        kinds.sort();

        assert_eq!(
            kinds,
            vec![("index.js".to_string(), true), ("lib".to_string(), false)]
        );
    }
}
