// SPDX-License-Identifier: GPL-3.0-only

//! Client configuration
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! default_datastore = "datastore1"
//!
//! [session]
//! identity = "administrator@vsphere.local"
//! secret_env = "DISK_PATH_SECRET"
//! datacenter = "dc-1"
//!
//! [operator]
//! create_existing = "succeed"
//!
//! [wait]
//! tries = 5
//! interval_ms = 1000
//!
//! [datastores]
//! datastore1 = "/srv/datastores/datastore1"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use disk_path_contracts::{Credentials, Datacenter, SessionConnector};
use serde::Deserialize;
use thiserror::Error;

use crate::operator::DiskPathOperator;
use crate::outcome::CreateExistingPolicy;
use crate::wait::WaitPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error for {path:?}: {reason}")]
    Io { path: PathBuf, reason: String },
    #[error("invalid config {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("secret environment variable {0} is not set")]
    MissingSecret(String),
    #[error("unknown datastore '{0}'")]
    UnknownDatastore(String),
    #[error("no datastore given and no default datastore configured")]
    NoDatastore,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub session: SessionSection,
    #[serde(default)]
    pub operator: OperatorSection,
    #[serde(default)]
    pub wait: WaitPolicy,
    #[serde(default)]
    pub default_datastore: Option<String>,
    #[serde(default)]
    pub datastores: BTreeMap<String, PathBuf>,
}

#[derive(Clone, Deserialize)]
pub struct SessionSection {
    pub identity: String,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub secret_env: Option<String>,
    pub datacenter: String,
}

impl std::fmt::Debug for SessionSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSection")
            .field("identity", &self.identity)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("secret_env", &self.secret_env)
            .field("datacenter", &self.datacenter)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperatorSection {
    #[serde(default)]
    pub create_existing: CreateExistingPolicy,
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        let config: ClientConfig = toml::from_str(&raw).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), datacenter = %config.session.datacenter, "Loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.identity.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "session.identity must not be empty".to_string(),
            ));
        }

        if self.session.datacenter.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "session.datacenter must not be empty".to_string(),
            ));
        }

        match (&self.session.secret, &self.session.secret_env) {
            (Some(_), None) | (None, Some(_)) => {}
            _ => {
                return Err(ConfigError::Invalid(
                    "exactly one of session.secret or session.secret_env must be set".to_string(),
                ));
            }
        }

        if self.wait.tries == 0 {
            return Err(ConfigError::Invalid(
                "wait.tries must be greater than 0".to_string(),
            ));
        }

        if self.datastores.is_empty() {
            return Err(ConfigError::Invalid(
                "datastores must not be empty".to_string(),
            ));
        }

        if let Some(name) = &self.default_datastore
            && !self.datastores.contains_key(name)
        {
            return Err(ConfigError::UnknownDatastore(name.clone()));
        }

        Ok(())
    }

    /// Resolve the login credentials, reading the secret from the environment if configured.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let secret = match (&self.session.secret, &self.session.secret_env) {
            (Some(secret), _) => secret.clone(),
            (None, Some(var)) => std::env::var(var)
                .ok()
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ConfigError::MissingSecret(var.clone()))?,
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "session has no secret source".to_string(),
                ));
            }
        };

        Ok(Credentials::new(self.session.identity.clone(), secret))
    }

    pub fn datacenter(&self) -> Datacenter {
        Datacenter::new(self.session.datacenter.clone())
    }

    /// Pick the datastore to operate on: the explicit one, the configured
    /// default, or the only configured datastore.
    pub fn resolve_datastore(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        if let Some(name) = explicit {
            if !self.datastores.contains_key(name) {
                return Err(ConfigError::UnknownDatastore(name.to_string()));
            }
            return Ok(name.to_string());
        }

        if let Some(name) = &self.default_datastore {
            return Ok(name.clone());
        }

        let mut names = self.datastores.keys();
        match (names.next(), names.next()) {
            (Some(only), None) => Ok(only.clone()),
            _ => Err(ConfigError::NoDatastore),
        }
    }

    /// Build an operator for the configured datacenter. The session is not started.
    pub fn operator(
        &self,
        connector: Arc<dyn SessionConnector>,
    ) -> Result<DiskPathOperator, ConfigError> {
        Ok(
            DiskPathOperator::new(self.credentials()?, self.datacenter(), connector)
                .with_create_existing(self.operator.create_existing),
        )
    }
}
