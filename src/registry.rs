//! Registry records
//!
//! The registry is a two level hierarchy:
//! - `Vendor`: unique by vendor id
//! - `Device`: unique by (vendor id, device id), always nested under a vendor

use crate::id::UsbId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A USB vendor entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: UsbId,
    pub name: String,
}

impl Vendor {
    pub fn new(id: impl Into<UsbId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.id, self.name)
    }
}

/// A device entry, scoped under its vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub vendor_id: UsbId,
    pub device_id: UsbId,
    pub name: String,
}

impl Device {
    pub fn new(vendor_id: impl Into<UsbId>, device_id: impl Into<UsbId>, name: impl Into<String>) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            device_id: device_id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", self.device_id, self.name)
    }
}

/// One complete ingestion batch, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    pub vendors: Vec<Vendor>,
    pub devices: Vec<Device>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }
}
