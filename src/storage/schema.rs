//! Database schema definitions

/// SQL to create the vendors table
pub const CREATE_VENDORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS vendors (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL
)
"#;

/// SQL to create the devices table
pub const CREATE_DEVICES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS devices (
    vendor_id TEXT NOT NULL REFERENCES vendors(id),
    device_id TEXT NOT NULL,
    name TEXT NOT NULL,
    PRIMARY KEY (vendor_id, device_id)
)
"#;

/// SQL to create the metadata table
pub const CREATE_METADATA_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
"#;

/// Metadata key for the time of the last successful refresh (RFC 3339)
pub const META_LAST_UPDATED: &str = "last_updated";

/// Metadata key for where the last refresh was fetched from
pub const META_SOURCE: &str = "source";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    vec![
        CREATE_VENDORS_TABLE,
        CREATE_DEVICES_TABLE,
        CREATE_METADATA_TABLE,
    ]
}
