//! Shared utilities

pub mod config;
pub mod context;
pub mod fs;
pub mod process;
pub mod scan_cache;
pub mod watch;

pub use config::Config;
pub use context::GlobalContext;
pub use fs::{FileSystem, RealFileSystem};
pub use process::{ProcessRunner, SystemProcessRunner};
pub use watch::{FileWatcher, PollingWatcher};
