// SPDX-License-Identifier: GPL-3.0-only

pub mod browser;
pub mod file_manager;
pub mod session;

pub use browser::DatastoreBrowser;
pub use file_manager::FileManagerSession;
pub use session::SessionConnector;
