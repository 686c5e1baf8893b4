// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;

use crate::{DatastorePath, RemoteError};

/// Read-only existence query.
///
/// Results may lag behind mutations issued through a [`crate::FileManagerSession`].
#[async_trait]
pub trait DatastoreBrowser: Send + Sync {
    async fn path_exists(&self, target: &DatastorePath) -> Result<bool, RemoteError>;
}
