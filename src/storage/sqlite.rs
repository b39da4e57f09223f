//! SQLite storage implementation

use std::path::Path;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use crate::Result;
use crate::id::UsbId;
use crate::registry::{Device, Registry, Vendor};
use super::schema;

/// SQLite-backed storage for the vendor/device registry
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.conn.pragma_update(None, "foreign_keys", true)?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Refresh ==========

    /// Swap the whole dataset for `registry` in a single transaction.
    ///
    /// Readers see either every old row or every new row. On any failure
    /// the transaction is rolled back and the previous contents remain.
    pub fn replace_all(&mut self, registry: &Registry, source: &str, updated_at: DateTime<Utc>) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM devices", [])?;
        tx.execute("DELETE FROM vendors", [])?;

        {
            let mut insert_vendor = tx.prepare("INSERT OR REPLACE INTO vendors (id, name) VALUES (?1, ?2)")?;
            for vendor in &registry.vendors {
                insert_vendor.execute(params![vendor.id.to_hex(), vendor.name])?;
            }

            let mut insert_device = tx.prepare(
                "INSERT OR REPLACE INTO devices (vendor_id, device_id, name) VALUES (?1, ?2, ?3)",
            )?;
            for device in &registry.devices {
                insert_device.execute(params![device.vendor_id.to_hex(), device.device_id.to_hex(), device.name])?;
            }

            let mut set_meta = tx.prepare("INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)")?;
            set_meta.execute(params![schema::META_LAST_UPDATED, updated_at.to_rfc3339()])?;
            set_meta.execute(params![schema::META_SOURCE, source])?;
        }

        tx.commit()?;
        tracing::debug!(
            vendors = registry.vendors.len(),
            devices = registry.devices.len(),
            "Replaced registry contents"
        );
        Ok(())
    }

    // ========== Vendor Operations ==========

    /// Get a vendor by id
    pub fn get_vendor(&self, id: UsbId) -> Result<Option<Vendor>> {
        self.conn
            .query_row(
                "SELECT id, name FROM vendors WHERE id = ?1",
                [id.to_hex()],
                row_to_vendor,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Count all vendors
    pub fn count_vendors(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM vendors", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Device Operations ==========

    /// Get a device by its vendor-scoped id
    pub fn get_device(&self, vendor_id: UsbId, device_id: UsbId) -> Result<Option<Device>> {
        self.conn
            .query_row(
                "SELECT vendor_id, device_id, name FROM devices WHERE vendor_id = ?1 AND device_id = ?2",
                [vendor_id.to_hex(), device_id.to_hex()],
                row_to_device,
            )
            .optional()
            .map_err(Into::into)
    }

    /// All devices of a vendor, in registry order
    pub fn devices_for_vendor(&self, vendor_id: UsbId) -> Result<Vec<Device>> {
        let mut stmt = self.conn.prepare(
            "SELECT vendor_id, device_id, name FROM devices WHERE vendor_id = ?1 ORDER BY rowid",
        )?;

        let devices = stmt
            .query_map([vendor_id.to_hex()], row_to_device)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(devices)
    }

    /// Count all devices
    pub fn count_devices(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM devices", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Metadata ==========

    /// Time of the last successful `replace_all`, `None` if never populated
    pub fn last_updated(&self) -> Result<Option<DateTime<Utc>>> {
        let value = self.get_meta(schema::META_LAST_UPDATED)?;
        match value {
            Some(text) => {
                let parsed = DateTime::parse_from_rfc3339(&text).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
                })?;
                Ok(Some(parsed.with_timezone(&Utc)))
            }
            None => Ok(None),
        }
    }

    /// Where the current contents were fetched from
    pub fn source(&self) -> Result<Option<String>> {
        self.get_meta(schema::META_SOURCE)
    }

    /// Whether any refresh has ever completed
    pub fn is_populated(&self) -> Result<bool> {
        Ok(self.last_updated()?.is_some())
    }

    fn get_meta(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .map_err(Into::into)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            vendors: self.count_vendors()?,
            devices: self.count_devices()?,
            last_updated: self.last_updated()?,
            source: self.source()?,
        })
    }
}

fn parse_id_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<UsbId> {
    let text: String = row.get(idx)?;
    UsbId::from_registry(&text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("invalid USB id in store: {:?}", text).into(),
        )
    })
}

fn row_to_vendor(row: &rusqlite::Row) -> rusqlite::Result<Vendor> {
    Ok(Vendor {
        id: parse_id_column(row, 0)?,
        name: row.get(1)?,
    })
}

fn row_to_device(row: &rusqlite::Row) -> rusqlite::Result<Device> {
    Ok(Device {
        vendor_id: parse_id_column(row, 0)?,
        device_id: parse_id_column(row, 1)?,
        name: row.get(2)?,
    })
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    pub vendors: usize,
    pub devices: usize,
    pub last_updated: Option<DateTime<Utc>>,
    pub source: Option<String>,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Vendors: {}", self.vendors)?;
        writeln!(f, "  Devices: {}", self.devices)?;
        match &self.last_updated {
            Some(ts) => writeln!(f, "  Last updated: {}", ts.to_rfc3339())?,
            None => writeln!(f, "  Last updated: never")?,
        }
        write!(f, "  Source: {}", self.source.as_deref().unwrap_or("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use chrono::TimeZone;

    fn sample_registry() -> Registry {
        Registry {
            vendors: vec![
                Vendor::new(0x1d6b, "Linux Foundation"),
                Vendor::new(0x8086, "Intel Corp."),
            ],
            devices: vec![
                Device::new(0x1d6b, 0x0003, "3.0 root hub"),
                Device::new(0x1d6b, 0x0001, "1.1 root hub"),
                Device::new(0x8086, 0x0a2b, "Bluetooth wireless interface"),
            ],
        }
    }

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.last_updated().unwrap(), None);
        assert!(!store.is_populated().unwrap());
        assert!(store.get_vendor(UsbId::new(0x1d6b)).unwrap().is_none());
    }

    #[test]
    fn test_replace_and_get() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_registry(), "test", ts(1)).unwrap();

        let vendor = store.get_vendor(UsbId::new(0x1d6b)).unwrap().unwrap();
        assert_eq!(vendor.name, "Linux Foundation");

        let device = store.get_device(UsbId::new(0x8086), UsbId::new(0x0a2b)).unwrap().unwrap();
        assert_eq!(device.name, "Bluetooth wireless interface");

        assert!(store.get_device(UsbId::new(0x8086), UsbId::new(0x0001)).unwrap().is_none());
        assert_eq!(store.last_updated().unwrap(), Some(ts(1)));
        assert_eq!(store.source().unwrap().as_deref(), Some("test"));
    }

    #[test]
    fn test_stats_reflect_last_replace() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_registry(), "http://mirror/usb.ids", ts(3)).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.vendors, 2);
        assert_eq!(stats.devices, 3);
        assert_eq!(stats.last_updated, Some(ts(3)));
        assert_eq!(stats.source.as_deref(), Some("http://mirror/usb.ids"));
    }

    #[test]
    fn test_devices_for_vendor_keeps_registry_order() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_registry(), "test", ts(1)).unwrap();

        let devices = store.devices_for_vendor(UsbId::new(0x1d6b)).unwrap();
        let ids: Vec<String> = devices.iter().map(|d| d.device_id.to_hex()).collect();
        assert_eq!(ids, vec!["0003", "0001"]);
    }

    #[test]
    fn test_replace_drops_rows_missing_from_new_batch() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_registry(), "test", ts(1)).unwrap();

        let smaller = Registry {
            vendors: vec![Vendor::new(0x1d6b, "Linux Foundation (renamed)")],
            devices: vec![Device::new(0x1d6b, 0x0002, "2.0 root hub")],
        };
        store.replace_all(&smaller, "test", ts(2)).unwrap();

        assert!(store.get_vendor(UsbId::new(0x8086)).unwrap().is_none());
        assert!(store.get_device(UsbId::new(0x1d6b), UsbId::new(0x0001)).unwrap().is_none());
        assert_eq!(
            store.get_vendor(UsbId::new(0x1d6b)).unwrap().unwrap().name,
            "Linux Foundation (renamed)"
        );
        assert_eq!(store.count_devices().unwrap(), 1);
        assert_eq!(store.last_updated().unwrap(), Some(ts(2)));
    }

    #[test]
    fn test_failed_replace_keeps_previous_contents() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_registry(), "first", ts(1)).unwrap();

        // The orphan device violates the foreign key after the new vendor
        // rows have already been written inside the transaction.
        let broken = Registry {
            vendors: vec![Vendor::new(0x046d, "Logitech, Inc.")],
            devices: vec![
                Device::new(0x046d, 0xc52b, "Unifying Receiver"),
                Device::new(0xffff, 0x0001, "orphan"),
            ],
        };
        let err = store.replace_all(&broken, "second", ts(2)).unwrap_err();
        assert!(err.is_storage(), "{err}");
        assert!(matches!(err, Error::Storage(_)));

        assert!(store.get_vendor(UsbId::new(0x046d)).unwrap().is_none());
        assert_eq!(store.count_vendors().unwrap(), 2);
        assert_eq!(store.count_devices().unwrap(), 3);
        assert_eq!(store.last_updated().unwrap(), Some(ts(1)));
        assert_eq!(store.source().unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn test_replace_is_idempotent() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_registry(), "test", ts(1)).unwrap();
        let first: Vec<Device> = store.devices_for_vendor(UsbId::new(0x1d6b)).unwrap();

        store.replace_all(&sample_registry(), "test", ts(1)).unwrap();
        let second: Vec<Device> = store.devices_for_vendor(UsbId::new(0x1d6b)).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count_vendors().unwrap(), 2);
        assert_eq!(store.count_devices().unwrap(), 3);
    }

    #[test]
    fn test_contents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usb_ids.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.replace_all(&sample_registry(), "test", ts(3)).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count_vendors().unwrap(), 2);
        assert_eq!(store.last_updated().unwrap(), Some(ts(3)));
    }

    #[test]
    fn test_reader_sees_old_rows_until_commit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usb_ids.db");

        let mut writer = SqliteStore::open(&path).unwrap();
        writer.replace_all(&sample_registry(), "test", ts(1)).unwrap();
        let reader = SqliteStore::open(&path).unwrap();

        // Hold the write open and check what a second connection observes.
        let tx = writer.conn.transaction().unwrap();
        tx.execute("DELETE FROM devices", []).unwrap();
        tx.execute("DELETE FROM vendors", []).unwrap();
        tx.execute("INSERT INTO vendors (id, name) VALUES ('046d', 'Logitech, Inc.')", [])
            .unwrap();

        assert_eq!(reader.count_vendors().unwrap(), 2);
        assert!(reader.get_vendor(UsbId::new(0x046d)).unwrap().is_none());

        drop(tx);
        assert_eq!(reader.count_vendors().unwrap(), 2);
        assert_eq!(reader.count_devices().unwrap(), 3);
    }
}
