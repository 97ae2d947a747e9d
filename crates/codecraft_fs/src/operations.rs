//! File operations service.
//!
//! A uniform façade over [`FileSystemManager`] used by both the CLI and the
//! assistant. Every successful mutation is reported exactly once to the
//! injected [`ChangeListener`], after the storage call succeeded and before
//! the method returns. Failures are never reported and never escape: they
//! come back as `false` / `None` with the reason logged.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::manager::FileSystemManager;
use crate::path;

/// Kind of mutation reported to listeners.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    Rename,
}

impl OperationKind {
    /// Past tense for user-facing notices ("Created", "Deleted", ...).
    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Create => "Created",
            Self::Update => "Updated",
            Self::Delete => "Deleted",
            Self::Rename => "Renamed",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Rename => write!(f, "rename"),
        }
    }
}

/// Receiver of change notifications.
///
/// Called synchronously after each successful mutation. A panicking listener
/// is caught and logged; the mutation still counts as successful.
#[cfg_attr(test, mockall::automock)]
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, kind: OperationKind, path: &str);
}

impl<F> ChangeListener for F
where
    F: Fn(OperationKind, &str) + Send + Sync,
{
    fn on_change(&self, kind: OperationKind, path: &str) {
        self(kind, path)
    }
}

/// A recorded change notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: OperationKind,
    pub path: String,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(kind: OperationKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            at: Utc::now(),
        }
    }

    /// Short notice such as `Created /src/main.rs`.
    pub fn describe(&self) -> String {
        format!("{} {}", self.kind.past_tense(), self.path)
    }
}

/// Listener that keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: RwLock<Vec<ChangeEvent>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events received so far.
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.read().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<ChangeEvent> {
        std::mem::take(&mut *self.events.write())
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl ChangeListener for RecordingListener {
    fn on_change(&self, kind: OperationKind, path: &str) {
        self.events.write().push(ChangeEvent::new(kind, path));
    }
}

/// Listener that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl ChangeListener for NoopListener {
    fn on_change(&self, _kind: OperationKind, _path: &str) {}
}

/// CRUD façade with change notification.
#[derive(Clone)]
pub struct FileOperationsService {
    fs: Arc<FileSystemManager>,
    listener: Arc<dyn ChangeListener>,
}

impl FileOperationsService {
    pub fn new(fs: Arc<FileSystemManager>, listener: Arc<dyn ChangeListener>) -> Self {
        Self { fs, listener }
    }

    /// Service whose mutations notify nobody.
    pub fn without_listener(fs: Arc<FileSystemManager>) -> Self {
        Self::new(fs, Arc::new(NoopListener))
    }

    /// The underlying session.
    pub fn file_system(&self) -> &Arc<FileSystemManager> {
        &self.fs
    }

    /// Create (or overwrite) `filename` in `directory`.
    pub async fn create_file(&self, directory: &str, filename: &str, content: &str) -> bool {
        let full_path = path::normalize(&path::join(directory, filename));
        if self.fs.create_file(directory, filename, content).await {
            self.notify(OperationKind::Create, &full_path);
            return true;
        }
        false
    }

    /// Read a file; reads never notify.
    pub async fn read_file(&self, file_path: &str) -> Option<String> {
        self.fs.read_file(file_path).await
    }

    /// Replace the content of an existing file.
    pub async fn update_file(&self, file_path: &str, content: &str) -> bool {
        if self.fs.write_file(file_path, content).await {
            self.notify(OperationKind::Update, &path::normalize(file_path));
            return true;
        }
        false
    }

    pub async fn delete_file(&self, file_path: &str) -> bool {
        if self.fs.delete_file(file_path).await {
            self.notify(OperationKind::Delete, &path::normalize(file_path));
            return true;
        }
        false
    }

    /// Create (or reuse) `dirname` in `directory`.
    pub async fn create_directory(&self, directory: &str, dirname: &str) -> bool {
        let full_path = path::normalize(&path::join(directory, dirname));
        if self.fs.create_directory(directory, dirname).await {
            self.notify(OperationKind::Create, &full_path);
            return true;
        }
        false
    }

    /// Recursively delete a directory.
    pub async fn delete_directory(&self, dir_path: &str) -> bool {
        if self.fs.delete_directory(dir_path).await {
            self.notify(OperationKind::Delete, &path::normalize(dir_path));
            return true;
        }
        false
    }

    /// Rename a file; listeners receive the old path.
    pub async fn rename(&self, old_path: &str, new_name: &str) -> bool {
        if self.fs.rename(old_path, new_name).await {
            self.notify(OperationKind::Rename, &path::normalize(old_path));
            return true;
        }
        false
    }

    fn notify(&self, kind: OperationKind, changed: &str) {
        debug!("Notifying {} on {}", kind, changed);
        let delivered = catch_unwind(AssertUnwindSafe(|| self.listener.on_change(kind, changed)));
        if delivered.is_err() {
            error!("Change listener panicked while handling {} on {}", kind, changed);
        }
    }
}
