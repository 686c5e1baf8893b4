// SPDX-License-Identifier: GPL-3.0-only

use std::sync::Arc;

use async_trait::async_trait;

use crate::{Credentials, Datacenter, FileManagerSession, RemoteError};

#[async_trait]
pub trait SessionConnector: Send + Sync {
    /// Authenticate and return a session scoped to `datacenter`.
    async fn login(
        &self,
        credentials: &Credentials,
        datacenter: &Datacenter,
    ) -> Result<Arc<dyn FileManagerSession>, RemoteError>;
}
