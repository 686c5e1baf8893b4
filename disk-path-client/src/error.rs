// SPDX-License-Identifier: GPL-3.0-only

use disk_path_contracts::{DatastorePath, RemoteError, RemoteErrorKind};
use thiserror::Error;

use crate::validation::InvalidPath;

/// Error types for disk path operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiskPathError {
    #[error("Invalid path: {0}")]
    InvalidPath(#[from] InvalidPath),

    #[error("Remote operation on {target} failed: {source}")]
    RemoteOperationFailed {
        target: DatastorePath,
        #[source]
        source: RemoteError,
    },

    #[error("No session started for datacenter {0}")]
    SessionNotStarted(String),

    #[error("Failed to start session for datacenter {datacenter}: {source}")]
    SessionFailed {
        datacenter: String,
        #[source]
        source: RemoteError,
    },
}

impl DiskPathError {
    /// Class of the remote failure behind this error, if any.
    pub fn remote_kind(&self) -> Option<RemoteErrorKind> {
        match self {
            Self::RemoteOperationFailed { source, .. } | Self::SessionFailed { source, .. } => {
                Some(source.kind)
            }
            _ => None,
        }
    }

    /// Whether repeating the call could plausibly change the outcome.
    pub fn is_retryable(&self) -> bool {
        self.remote_kind() == Some(RemoteErrorKind::Unavailable)
    }
}

/// Result type alias for disk path operations
pub type Result<T> = std::result::Result<T, DiskPathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unavailable_remote_failures_are_retryable() {
        let target = DatastorePath::new("datastore1", "disks");

        let unavailable = DiskPathError::RemoteOperationFailed {
            target: target.clone(),
            source: RemoteError::new(RemoteErrorKind::Unavailable, "host not connected"),
        };
        assert!(unavailable.is_retryable());

        let denied = DiskPathError::RemoteOperationFailed {
            target,
            source: RemoteError::new(RemoteErrorKind::PermissionDenied, "no permission"),
        };
        assert!(!denied.is_retryable());

        let invalid = DiskPathError::from(InvalidPath::Empty);
        assert!(!invalid.is_retryable());
        assert_eq!(invalid.remote_kind(), None);
    }

    #[test]
    fn remote_failure_names_its_target() {
        let error = DiskPathError::RemoteOperationFailed {
            target: DatastorePath::new("datastore1", "disks"),
            source: RemoteError::new(RemoteErrorKind::Other, "boom"),
        };
        let msg = error.to_string();
        assert!(msg.contains("[datastore1] disks"));
        assert!(msg.contains("boom"));
    }
}
