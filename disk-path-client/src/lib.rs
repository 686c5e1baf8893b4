// SPDX-License-Identifier: GPL-3.0-only

//! Disk path management for virtualization datastores
//!
//! Creates and deletes single-segment directories under a datastore root over
//! an authenticated, datacenter-scoped session. Paths are validated locally
//! before any remote call, and "already in the desired state" outcomes are
//! normalized to success so both operations are idempotent.

pub mod adapters;
pub mod config;
pub mod error;
pub mod operator;
pub mod outcome;
pub mod validation;
pub mod wait;

// Re-export commonly used types
pub use config::{ClientConfig, ConfigError};
pub use error::{DiskPathError, Result};
pub use operator::DiskPathOperator;
pub use outcome::{CreateExistingPolicy, Outcome, PathOperation};
pub use validation::{DiskPath, InvalidPath, MAX_PATH_LENGTH, validate};
pub use wait::{WaitError, WaitPolicy, wait_for_path, wait_until};

// Re-export shared contracts
pub use disk_path_contracts::*;
