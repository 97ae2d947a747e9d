//! Opaque capabilities for entries in a storage provider.
//!
//! A handle is bound to exactly one file or directory at the moment it was
//! obtained. The cache keeps shared references to handles; the provider owns
//! the resource behind them.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FsResult;

/// Kind of a storage entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// A file inside a storage provider.
#[async_trait]
pub trait FileEntry: Send + Sync + fmt::Debug {
    /// Entry name (final path segment).
    fn name(&self) -> &str;

    /// Read the whole file as text.
    async fn read_text(&self) -> FsResult<String>;

    /// Replace the whole file with `content`.
    async fn write_text(&self, content: &str) -> FsResult<()>;
}

/// A directory inside a storage provider.
#[async_trait]
pub trait DirectoryEntry: Send + Sync + fmt::Debug {
    /// Entry name (final path segment). The root reports its own folder name.
    fn name(&self) -> &str;

    /// Open a child directory, creating it when `create` is set.
    async fn get_directory(&self, name: &str, create: bool) -> FsResult<DirectoryHandle>;

    /// Open a child file, creating an empty one when `create` is set.
    async fn get_file(&self, name: &str, create: bool) -> FsResult<FileHandle>;

    /// Immediate children in the provider's enumeration order.
    async fn entries(&self) -> FsResult<Vec<(String, Handle)>>;

    /// Remove a child by name. Non-empty directories need `recursive`.
    async fn remove_entry(&self, name: &str, recursive: bool) -> FsResult<()>;
}

/// Shared reference to a file capability.
pub type FileHandle = Arc<dyn FileEntry>;

/// Shared reference to a directory capability.
pub type DirectoryHandle = Arc<dyn DirectoryEntry>;

/// Either kind of handle.
#[derive(Debug, Clone)]
pub enum Handle {
    File(FileHandle),
    Directory(DirectoryHandle),
}

impl Handle {
    pub fn as_file(&self) -> Option<&FileHandle> {
        match self {
            Self::File(h) => Some(h),
            Self::Directory(_) => None,
        }
    }

    /// True if both handles are the very same capability object.
    pub fn same_entry(&self, other: &Handle) -> bool {
        match (self, other) {
            (Self::File(a), Self::File(b)) => same_file(a, b),
            (Self::Directory(a), Self::Directory(b)) => same_directory(a, b),
            _ => false,
        }
    }
}

/// Identity comparison for file handles.
pub fn same_file(a: &FileHandle, b: &FileHandle) -> bool {
    Arc::ptr_eq(a, b)
}

/// Identity comparison for directory handles.
pub fn same_directory(a: &DirectoryHandle, b: &DirectoryHandle) -> bool {
    Arc::ptr_eq(a, b)
}
