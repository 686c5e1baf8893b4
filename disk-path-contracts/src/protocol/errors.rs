// SPDX-License-Identifier: GPL-3.0-only

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    NotFound,
    AlreadyExists,
    PermissionDenied,
    Unavailable,
    Other,
}

impl RemoteErrorKind {
    /// HTTP-style status code, reported alongside failed remote calls.
    pub fn code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::AlreadyExists => 409,
            Self::PermissionDenied => 403,
            Self::Unavailable => 503,
            Self::Other => 500,
        }
    }

    /// Classify a provider fault name.
    ///
    /// Returns `None` for fault names outside the table so the caller can
    /// fall back to inspecting the fault message.
    pub fn from_fault_name(fault: &str) -> Option<Self> {
        let kind = match fault {
            "FileNotFound" => Self::NotFound,
            "FileAlreadyExists" | "DuplicateName" => Self::AlreadyExists,
            "NoPermission" | "NotAuthenticated" | "InvalidLogin" => Self::PermissionDenied,
            "HostNotConnected" | "HostCommunication" | "Timedout" => Self::Unavailable,
            // A missing datastore must never read as a missing file.
            "InvalidDatastore" | "InvalidDatastorePath" => Self::Other,
            _ => return None,
        };
        Some(kind)
    }

    /// Best-effort classification of a fault message with no known fault name.
    pub fn from_fault_message(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();

        if lower.contains("invalid datastore") || lower.contains("datastore not found") {
            Self::Other
        } else if lower.contains("already exists") {
            Self::AlreadyExists
        } else if lower.contains("file ") && lower.contains("was not found") {
            Self::NotFound
        } else {
            Self::Other
        }
    }

    pub fn from_io_kind(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::AlreadyExists => Self::AlreadyExists,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::TimedOut => Self::Unavailable,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build an error from a provider fault name and its message.
    pub fn from_fault(fault: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let kind = RemoteErrorKind::from_fault_name(fault)
            .unwrap_or_else(|| RemoteErrorKind::from_fault_message(&message));

        Self {
            kind,
            message: format!("{fault}: {message}"),
        }
    }

    pub fn from_io(err: &io::Error, context: impl AsRef<str>) -> Self {
        Self {
            kind: RemoteErrorKind::from_io_kind(err.kind()),
            message: format!("{}: {}", context.as_ref(), err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::NotFound
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind == RemoteErrorKind::AlreadyExists
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_roundtrips() {
        let error = RemoteError::new(RemoteErrorKind::AlreadyExists, "already exists");
        let json = serde_json::to_string(&error).expect("serialize error");
        let parsed: RemoteError = serde_json::from_str(&json).expect("deserialize error");
        assert_eq!(parsed, error);
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&RemoteErrorKind::PermissionDenied).unwrap();
        assert_eq!(json, "\"permission_denied\"");
    }

    #[test]
    fn fault_table_is_explicit() {
        let cases = [
            ("FileNotFound", RemoteErrorKind::NotFound),
            ("FileAlreadyExists", RemoteErrorKind::AlreadyExists),
            ("DuplicateName", RemoteErrorKind::AlreadyExists),
            ("NoPermission", RemoteErrorKind::PermissionDenied),
            ("NotAuthenticated", RemoteErrorKind::PermissionDenied),
            ("InvalidLogin", RemoteErrorKind::PermissionDenied),
            ("HostNotConnected", RemoteErrorKind::Unavailable),
            ("HostCommunication", RemoteErrorKind::Unavailable),
            ("Timedout", RemoteErrorKind::Unavailable),
            ("InvalidDatastore", RemoteErrorKind::Other),
            ("InvalidDatastorePath", RemoteErrorKind::Other),
        ];

        for (fault, expected) in cases {
            assert_eq!(
                RemoteErrorKind::from_fault_name(fault),
                Some(expected),
                "fault {fault}"
            );
        }
        assert_eq!(RemoteErrorKind::from_fault_name("CannotDeleteFile"), None);
    }

    #[test]
    fn missing_datastore_is_not_a_missing_file() {
        let error = RemoteError::from_fault("InvalidDatastore", "Datastore not found: missing");
        assert_eq!(error.kind, RemoteErrorKind::Other);
        assert!(!error.is_not_found());

        let error = RemoteError::from_fault("SystemError", "Datastore not found: missing");
        assert_eq!(error.kind, RemoteErrorKind::Other);
    }

    #[test]
    fn unknown_faults_fall_back_to_the_message() {
        let error = RemoteError::from_fault(
            "SystemError",
            "File [datastore1] disk_path_spec_playground was not found",
        );
        assert!(error.is_not_found());
        assert_eq!(
            error.message,
            "SystemError: File [datastore1] disk_path_spec_playground was not found"
        );

        let error = RemoteError::from_fault(
            "SystemError",
            "The file [datastore1] disk_path_spec_playground was not found",
        );
        assert!(error.is_not_found());

        let error = RemoteError::from_fault("SystemError", "Cannot complete: path already exists");
        assert!(error.is_already_exists());

        let error = RemoteError::from_fault("CannotDeleteFile", "Cannot delete file [ds] foo");
        assert_eq!(error.kind, RemoteErrorKind::Other);
    }

    #[test]
    fn io_errors_keep_their_class() {
        let not_found = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert!(RemoteError::from_io(&not_found, "delete [ds] foo").is_not_found());

        let refused = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let error = RemoteError::from_io(&refused, "connect");
        assert_eq!(error.kind, RemoteErrorKind::Unavailable);
        assert!(error.message.starts_with("connect: "));
    }

    #[test]
    fn http_family_codes_are_stable() {
        assert_eq!(RemoteErrorKind::NotFound.code(), 404);
        assert_eq!(RemoteErrorKind::AlreadyExists.code(), 409);
        assert_eq!(RemoteErrorKind::PermissionDenied.code(), 403);
        assert_eq!(RemoteErrorKind::Unavailable.code(), 503);
        assert_eq!(RemoteErrorKind::Other.code(), 500);
    }
}
