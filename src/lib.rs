//! # usbids - USB vendor and device name lookup
//!
//! Resolves numeric USB vendor/device identifiers to human readable names
//! using a local SQLite cache of the `usb.ids` registry.
//!
//! usbids provides:
//! - A tolerant line-grammar parser for the registry text format
//! - SQLite-backed storage with atomic whole-dataset replacement
//! - A lookup service with vendor-scoped device queries
//! - A staleness-driven refresh policy that degrades to cached data

pub mod id;
pub mod registry;
pub mod parser;
pub mod fetch;
pub mod storage;
pub mod lookup;
pub mod refresh;
pub mod config;
pub mod interactive;
pub mod ui;

// Re-exports for convenient access
pub use id::UsbId;
pub use registry::{Device, Registry, Vendor};
pub use parser::{parse, ParseWarning, ParsedRegistry};
pub use fetch::{Fetcher, HttpFetcher};
pub use storage::SqliteStore;
pub use lookup::{LookupOutcome, LookupService};
pub use refresh::{should_refresh, RefreshOutcome, RefreshReport, Refresher};

/// Result type alias for usbids operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for usbids operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Registry document contained no vendor entries")]
    EmptyRegistry,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Failures of the remote source. A refresh may fall back to cached data on these.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_) | Error::EmptyRegistry)
    }

    /// Persistence failures. Always fatal to the current operation.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Io(_))
    }
}
