// SPDX-License-Identifier: GPL-3.0-only

pub mod errors;
pub mod ids;
pub mod session;
pub mod target;

pub use errors::{RemoteError, RemoteErrorKind};
pub use ids::RequestId;
pub use session::{Credentials, Datacenter};
pub use target::DatastorePath;
