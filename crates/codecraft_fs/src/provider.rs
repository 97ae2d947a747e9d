//! Storage provider contract.
//!
//! Any hierarchical store that can grant a root directory handle is a
//! provider: a directory on disk, an in-memory tree, or something remote.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FsResult;
use crate::handle::DirectoryHandle;

/// Access requested when opening a root.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Read,
    #[default]
    ReadWrite,
}

impl AccessMode {
    pub fn is_writable(&self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

/// Source of root directory grants.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Short provider name for diagnostics.
    fn name(&self) -> &str;

    /// Ask for a root directory with the given access.
    ///
    /// Fails with `UserCancelled` when the selection is abandoned and with
    /// `PermissionDenied` when the grant is refused.
    async fn open_root(&self, mode: AccessMode) -> FsResult<DirectoryHandle>;
}
