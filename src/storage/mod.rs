//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - vendors(id, name)
//! - devices(vendor_id, device_id, name)
//! - metadata(key, value) holding the last refresh time and source

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, StoreStats};
