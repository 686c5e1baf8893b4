// SPDX-License-Identifier: GPL-3.0-only

pub mod protocol;
pub mod traits;

pub use protocol::{Credentials, Datacenter, DatastorePath, RemoteError, RemoteErrorKind, RequestId};
pub use traits::{DatastoreBrowser, FileManagerSession, SessionConnector};
