//! # codecraft_fs - Local file-system layer for CodeCraft
//!
//! This crate owns everything between a logical project path and the storage
//! provider that holds the bytes:
//! - Slash-delimited path rules shared by every cache key
//! - Opaque file/directory handles and the provider contract behind them
//! - In-memory and local-disk providers
//! - The path-indexed handle cache (`FileSystemManager`)
//! - The file operations service with change notification
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │  FileOperationsService   │──── ChangeListener (create/update/delete/rename)
//! └────────────┬─────────────┘
//!              ▼
//! ┌──────────────────────────┐
//! │    FileSystemManager     │  path → FileHandle / DirectoryHandle
//! └────────────┬─────────────┘
//!              ▼
//! ┌──────────────────────────┐
//! │     StorageProvider      │  MemoryProvider | LocalProvider
//! └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use codecraft_fs::{FileOperationsService, FileSystemManager, LocalProvider, RecordingListener};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fs = Arc::new(FileSystemManager::new(Arc::new(LocalProvider::new("."))));
//!     let tree = fs.open_project().await?;
//!     println!("{}", tree.render());
//!
//!     let events = Arc::new(RecordingListener::new());
//!     let ops = FileOperationsService::new(fs, events.clone());
//!     ops.create_file("/", "notes.md", "# Notes").await;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod handle;
pub mod local;
pub mod manager;
pub mod memory;
pub mod operations;
pub mod path;
pub mod provider;
pub mod tree;

pub use error::{FsError, FsResult};
pub use handle::{
    same_directory, same_file, DirectoryEntry, DirectoryHandle, EntryKind, FileEntry, FileHandle,
    Handle,
};
pub use local::LocalProvider;
pub use manager::FileSystemManager;
pub use memory::{MemoryOp, MemoryProvider};
pub use operations::{
    ChangeEvent, ChangeListener, FileOperationsService, NoopListener, OperationKind,
    RecordingListener,
};
pub use provider::{AccessMode, StorageProvider};
pub use tree::FileTreeNode;
