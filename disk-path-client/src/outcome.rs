// SPDX-License-Identifier: GPL-3.0-only

//! Outcome normalization for structural remote calls
//!
//! A remote failure that only reports the target is already in the requested
//! end state counts as success: not-found on delete, and already-exists on
//! create unless [`CreateExistingPolicy::Fail`] is selected.

use std::fmt;

use disk_path_contracts::{RemoteError, RemoteErrorKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathOperation {
    Create,
    Delete,
}

impl PathOperation {
    pub fn name(self) -> &'static str {
        match self {
            PathOperation::Create => "create",
            PathOperation::Delete => "delete",
        }
    }
}

impl fmt::Display for PathOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How `create_path` treats a directory that already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateExistingPolicy {
    #[default]
    Succeed,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The remote call changed datastore state.
    Applied,
    /// The target was already in the requested end state.
    AlreadySatisfied,
}

impl Outcome {
    pub fn name(self) -> &'static str {
        match self {
            Outcome::Applied => "applied",
            Outcome::AlreadySatisfied => "already_satisfied",
        }
    }
}

pub fn normalize(
    operation: PathOperation,
    policy: CreateExistingPolicy,
    result: Result<(), RemoteError>,
) -> Result<Outcome, RemoteError> {
    let error = match result {
        Ok(()) => return Ok(Outcome::Applied),
        Err(error) => error,
    };

    match (operation, error.kind, policy) {
        (PathOperation::Delete, RemoteErrorKind::NotFound, _) => Ok(Outcome::AlreadySatisfied),
        (PathOperation::Create, RemoteErrorKind::AlreadyExists, CreateExistingPolicy::Succeed) => {
            Ok(Outcome::AlreadySatisfied)
        }
        _ => Err(error),
    }
}
