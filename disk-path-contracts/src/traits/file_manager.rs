// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;

use crate::{DatastorePath, RemoteError};

/// Structural file operations issued over an authenticated session.
///
/// Implementations report provider faults as classified [`RemoteError`]s and
/// apply no outcome policy of their own.
#[async_trait]
pub trait FileManagerSession: Send + Sync {
    /// Create one directory. Parent directories are never created.
    async fn make_directory(&self, target: &DatastorePath) -> Result<(), RemoteError>;

    /// Delete a file or a directory tree.
    async fn delete_path(&self, target: &DatastorePath) -> Result<(), RemoteError>;
}
