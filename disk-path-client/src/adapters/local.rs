// SPDX-License-Identifier: GPL-3.0-only

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use disk_path_contracts::{
    Credentials, Datacenter, DatastoreBrowser, DatastorePath, FileManagerSession, RemoteError,
    RemoteErrorKind, SessionConnector,
};

use crate::config::ClientConfig;

/// Datacenter whose datastores are local directories.
#[derive(Debug, Clone)]
pub struct LocalDatacenter {
    name: String,
    datastores: Arc<BTreeMap<String, PathBuf>>,
}

impl LocalDatacenter {
    pub fn new(name: impl Into<String>, datastores: BTreeMap<String, PathBuf>) -> Self {
        Self {
            name: name.into(),
            datastores: Arc::new(datastores),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.session.datacenter.clone(), config.datastores.clone())
    }
}

/// Resolve `target` to a path directly under its datastore root.
async fn resolve(
    datastores: &BTreeMap<String, PathBuf>,
    target: &DatastorePath,
) -> Result<PathBuf, RemoteError> {
    let root = datastores.get(&target.datastore).ok_or_else(|| {
        RemoteError::from_fault(
            "InvalidDatastore",
            format!("Invalid datastore path '{target}'"),
        )
    })?;

    let mut components = Path::new(&target.path).components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        return Err(RemoteError::from_fault(
            "InvalidDatastorePath",
            format!("Invalid datastore path '{target}'"),
        ));
    }

    // A missing root must not read as a missing entry.
    match tokio::fs::metadata(root).await {
        Ok(metadata) if metadata.is_dir() => Ok(root.join(&target.path)),
        Ok(_) => Err(RemoteError::new(
            RemoteErrorKind::Unavailable,
            format!("datastore root {} is not a directory", root.display()),
        )),
        Err(error) => Err(RemoteError::new(
            RemoteErrorKind::Unavailable,
            format!("datastore root {} is not accessible: {error}", root.display()),
        )),
    }
}

#[async_trait]
impl SessionConnector for LocalDatacenter {
    async fn login(
        &self,
        credentials: &Credentials,
        datacenter: &Datacenter,
    ) -> Result<Arc<dyn FileManagerSession>, RemoteError> {
        if datacenter.name != self.name {
            return Err(RemoteError::from_fault(
                "InvalidDatacenter",
                format!("Datacenter '{datacenter}' is not known"),
            ));
        }

        if credentials.identity.trim().is_empty() {
            return Err(RemoteError::from_fault(
                "InvalidLogin",
                "Cannot complete login without a user name",
            ));
        }

        let session: Arc<dyn FileManagerSession> = Arc::new(LocalSession {
            datastores: self.datastores.clone(),
        });
        Ok(session)
    }
}

#[async_trait]
impl DatastoreBrowser for LocalDatacenter {
    async fn path_exists(&self, target: &DatastorePath) -> Result<bool, RemoteError> {
        let path = resolve(&self.datastores, target).await?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|error| RemoteError::from_io(&error, format!("stat {target}")))
    }
}

struct LocalSession {
    datastores: Arc<BTreeMap<String, PathBuf>>,
}

#[async_trait]
impl FileManagerSession for LocalSession {
    async fn make_directory(&self, target: &DatastorePath) -> Result<(), RemoteError> {
        let path = resolve(&self.datastores, target).await?;
        tokio::fs::create_dir(&path)
            .await
            .map_err(|error| RemoteError::from_io(&error, format!("make directory {target}")))?;

        tracing::debug!(path = %path.display(), "Created local directory");
        Ok(())
    }

    async fn delete_path(&self, target: &DatastorePath) -> Result<(), RemoteError> {
        let path = resolve(&self.datastores, target).await?;
        let context = || format!("delete {target}");

        let metadata = tokio::fs::symlink_metadata(&path)
            .await
            .map_err(|error| RemoteError::from_io(&error, context()))?;

        let removed = if metadata.is_dir() {
            tokio::fs::remove_dir_all(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };
        removed.map_err(|error| RemoteError::from_io(&error, context()))?;

        tracing::debug!(path = %path.display(), "Deleted local path");
        Ok(())
    }
}
