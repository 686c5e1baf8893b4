// SPDX-License-Identifier: GPL-3.0-only

use std::sync::Arc;

use disk_path_contracts::{
    Credentials, Datacenter, DatastorePath, FileManagerSession, RequestId, SessionConnector,
};
use tokio::sync::Mutex;
use tracing::Instrument;

use crate::error::{DiskPathError, Result};
use crate::outcome::{CreateExistingPolicy, Outcome, PathOperation, normalize};
use crate::validation::DiskPath;

/// Creates and deletes disk paths in the datastores of one datacenter.
///
/// Construction is pure; [`DiskPathOperator::start_session`] performs the
/// login and must succeed before the first structural call. Structural calls
/// on one operator run one at a time.
pub struct DiskPathOperator {
    credentials: Credentials,
    datacenter: Datacenter,
    connector: Arc<dyn SessionConnector>,
    create_existing: CreateExistingPolicy,
    session: Option<Arc<dyn FileManagerSession>>,
    structural_lock: Mutex<()>,
}

impl DiskPathOperator {
    pub fn new(
        credentials: Credentials,
        datacenter: Datacenter,
        connector: Arc<dyn SessionConnector>,
    ) -> Self {
        Self {
            credentials,
            datacenter,
            connector,
            create_existing: CreateExistingPolicy::default(),
            session: None,
            structural_lock: Mutex::new(()),
        }
    }

    pub fn with_create_existing(mut self, policy: CreateExistingPolicy) -> Self {
        self.create_existing = policy;
        self
    }

    pub fn datacenter(&self) -> &Datacenter {
        &self.datacenter
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Log in and bind the session. An already started session is kept.
    pub async fn start_session(&mut self) -> Result<()> {
        if self.session.is_some() {
            tracing::debug!(datacenter = %self.datacenter, "Session already started");
            return Ok(());
        }

        let session = self
            .connector
            .login(&self.credentials, &self.datacenter)
            .await
            .map_err(|source| DiskPathError::SessionFailed {
                datacenter: self.datacenter.name.clone(),
                source,
            })?;

        tracing::info!(
            datacenter = %self.datacenter,
            identity = %self.credentials.identity,
            "Session started"
        );
        self.session = Some(session);
        Ok(())
    }

    /// Drop the bound session handle.
    pub fn end_session(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!(datacenter = %self.datacenter, "Session ended");
        }
    }

    /// Create `path` directly under the root of `datastore`.
    pub async fn create_path(&self, datastore: &str, path: &str) -> Result<()> {
        self.execute(PathOperation::Create, datastore, path)
            .await
            .map(|_| ())
    }

    /// Delete `path` from the root of `datastore`. Deleting an absent path succeeds.
    pub async fn delete_path(&self, datastore: &str, path: &str) -> Result<()> {
        self.execute(PathOperation::Delete, datastore, path)
            .await
            .map(|_| ())
    }

    /// Run one structural operation and report whether it changed remote state.
    pub async fn execute(
        &self,
        operation: PathOperation,
        datastore: &str,
        path: &str,
    ) -> Result<Outcome> {
        let path = DiskPath::parse(path)?;

        let session = self
            .session
            .as_ref()
            .ok_or_else(|| DiskPathError::SessionNotStarted(self.datacenter.name.clone()))?;

        let target = DatastorePath::new(datastore, path.into_inner());
        let request_id = RequestId::new();
        let span = tracing::info_span!(
            "disk_path",
            %request_id,
            %operation,
            datacenter = %self.datacenter,
            %target
        );

        async move {
            let result = {
                let _guard = self.structural_lock.lock().await;
                match operation {
                    PathOperation::Create => session.make_directory(&target).await,
                    PathOperation::Delete => session.delete_path(&target).await,
                }
            };

            match normalize(operation, self.create_existing, result) {
                Ok(Outcome::Applied) => {
                    tracing::info!("Disk path {operation} applied");
                    Ok(Outcome::Applied)
                }
                Ok(Outcome::AlreadySatisfied) => {
                    tracing::debug!("Disk path already in requested state");
                    Ok(Outcome::AlreadySatisfied)
                }
                Err(source) => {
                    tracing::warn!(
                        kind = ?source.kind,
                        code = source.kind.code(),
                        "Disk path {operation} failed: {}",
                        source.message
                    );
                    Err(DiskPathError::RemoteOperationFailed { target, source })
                }
            }
        }
        .instrument(span)
        .await
    }
}
