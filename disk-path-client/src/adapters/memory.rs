// SPDX-License-Identifier: GPL-3.0-only

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use disk_path_contracts::{
    Credentials, Datacenter, DatastoreBrowser, DatastorePath, FileManagerSession, RemoteError,
    SessionConnector,
};
use tokio::time::Instant;

/// A structural call received by a [`MemoryDatacenter`] session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryCall {
    MakeDirectory(DatastorePath),
    DeletePath(DatastorePath),
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    present: bool,
    previously: bool,
    visible_at: Instant,
}

impl Entry {
    fn absent(now: Instant) -> Self {
        Self {
            present: false,
            previously: false,
            visible_at: now,
        }
    }

    fn visible(&self, now: Instant) -> bool {
        if now >= self.visible_at {
            self.present
        } else {
            self.previously
        }
    }

    fn set(&mut self, present: bool, now: Instant, delay: Duration) {
        self.previously = self.visible(now);
        self.present = present;
        self.visible_at = now + delay;
    }
}

#[derive(Debug, Default)]
struct State {
    credentials: Option<Credentials>,
    visibility_delay: Duration,
    datastores: BTreeMap<String, BTreeMap<String, Entry>>,
    calls: Vec<MemoryCall>,
    faults: VecDeque<RemoteError>,
}

#[derive(Debug)]
struct Inner {
    datacenter: String,
    state: Mutex<State>,
}

impl Inner {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-process datacenter reproducing the provider's file manager semantics.
///
/// Mutations are authoritative immediately, while [`DatastoreBrowser`]
/// queries observe them only after the configured visibility delay.
#[derive(Debug, Clone)]
pub struct MemoryDatacenter {
    inner: Arc<Inner>,
}

impl MemoryDatacenter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                datacenter: name.into(),
                state: Mutex::new(State::default()),
            }),
        }
    }

    pub fn with_datastore(self, name: impl Into<String>) -> Self {
        self.inner.state().datastores.entry(name.into()).or_default();
        self
    }

    /// Only accept logins with these credentials. Any login is accepted otherwise.
    pub fn with_credentials(self, credentials: Credentials) -> Self {
        self.inner.state().credentials = Some(credentials);
        self
    }

    pub fn with_visibility_delay(self, delay: Duration) -> Self {
        self.inner.state().visibility_delay = delay;
        self
    }

    /// Fail the next structural call with `error`. Faults queue in order.
    pub fn inject_fault(&self, error: RemoteError) {
        self.inner.state().faults.push_back(error);
    }

    pub fn take_calls(&self) -> Vec<MemoryCall> {
        std::mem::take(&mut self.inner.state().calls)
    }

    #[cfg(test)]
    fn tracked_entries(&self, datastore: &str) -> usize {
        self.inner
            .state()
            .datastores
            .get(datastore)
            .map_or(0, BTreeMap::len)
    }

    /// Authoritative contents of a datastore root, ignoring visibility lag.
    pub fn entries(&self, datastore: &str) -> Vec<String> {
        self.inner
            .state()
            .datastores
            .get(datastore)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, entry)| entry.present)
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn invalid_datastore(target: &DatastorePath) -> RemoteError {
    RemoteError::from_fault(
        "InvalidDatastore",
        format!("Invalid datastore path '{target}'"),
    )
}

fn already_exists(target: &DatastorePath) -> RemoteError {
    RemoteError::from_fault(
        "FileAlreadyExists",
        format!("Cannot complete the operation because the file or folder {target} already exists"),
    )
}

fn not_found(target: &DatastorePath) -> RemoteError {
    RemoteError::from_fault("FileNotFound", format!("File {target} was not found"))
}

#[async_trait]
impl SessionConnector for MemoryDatacenter {
    async fn login(
        &self,
        credentials: &Credentials,
        datacenter: &Datacenter,
    ) -> Result<Arc<dyn FileManagerSession>, RemoteError> {
        if datacenter.name != self.inner.datacenter {
            return Err(RemoteError::from_fault(
                "InvalidDatacenter",
                format!("Datacenter '{datacenter}' is not known"),
            ));
        }

        if let Some(expected) = &self.inner.state().credentials
            && expected != credentials
        {
            return Err(RemoteError::from_fault(
                "InvalidLogin",
                "Cannot complete login due to an incorrect user name or password",
            ));
        }

        let session: Arc<dyn FileManagerSession> = Arc::new(MemorySession {
            inner: self.inner.clone(),
        });
        Ok(session)
    }
}

#[async_trait]
impl DatastoreBrowser for MemoryDatacenter {
    async fn path_exists(&self, target: &DatastorePath) -> Result<bool, RemoteError> {
        let state = self.inner.state();
        let entries = state
            .datastores
            .get(&target.datastore)
            .ok_or_else(|| invalid_datastore(target))?;

        Ok(entries
            .get(&target.path)
            .is_some_and(|entry| entry.visible(Instant::now())))
    }
}

struct MemorySession {
    inner: Arc<Inner>,
}

impl MemorySession {
    fn apply(&self, call: MemoryCall) -> Result<(), RemoteError> {
        let mut guard = self.inner.state();
        let state = &mut *guard;
        state.calls.push(call.clone());

        if let Some(fault) = state.faults.pop_front() {
            return Err(fault);
        }

        let (target, present) = match &call {
            MemoryCall::MakeDirectory(target) => (target, true),
            MemoryCall::DeletePath(target) => (target, false),
        };

        let now = Instant::now();
        let delay = state.visibility_delay;
        let entries = state
            .datastores
            .get_mut(&target.datastore)
            .ok_or_else(|| invalid_datastore(target))?;

        if let Some(entry) = entries.get_mut(&target.path) {
            if entry.present == present {
                return Err(if present {
                    already_exists(target)
                } else {
                    not_found(target)
                });
            }
            entry.set(present, now, delay);
        } else if present {
            let mut entry = Entry::absent(now);
            entry.set(true, now, delay);
            entries.insert(target.path.clone(), entry);
        } else {
            return Err(not_found(target));
        }

        // Deletions are forgotten once queries observe them.
        entries.retain(|_, entry| entry.present || now < entry.visible_at);
        Ok(())
    }
}

#[async_trait]
impl FileManagerSession for MemorySession {
    async fn make_directory(&self, target: &DatastorePath) -> Result<(), RemoteError> {
        self.apply(MemoryCall::MakeDirectory(target.clone()))
    }

    async fn delete_path(&self, target: &DatastorePath) -> Result<(), RemoteError> {
        self.apply(MemoryCall::DeletePath(target.clone()))
    }
}
