// SPDX-License-Identifier: GPL-3.0-only

//! Transports implementing the session contracts
//!
//! - [`memory`]: an in-process datacenter with configurable visibility lag,
//!   used for tests and dry runs.
//! - [`local`]: datastores backed by local directories.

pub mod local;
pub mod memory;

pub use local::LocalDatacenter;
pub use memory::{MemoryCall, MemoryDatacenter};
