//! Lookup service
//!
//! Resolves user supplied vendor/device ids against the store. Device ids
//! are only meaningful inside a vendor, so every query needs a vendor id.
//! A missing vendor or device is a normal outcome, not an error.

use crate::id::UsbId;
use crate::registry::{Device, Vendor};
use crate::storage::SqliteStore;
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Result of a lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// No vendor with this id
    VendorNotFound { vendor_id: UsbId },
    /// Vendor-only query
    Vendor { vendor: Vendor },
    /// Vendor and device both resolved
    Device { vendor: Vendor, device: Device },
    /// Vendor resolved, device absent under it
    DeviceNotFound { vendor: Vendor, device_id: UsbId },
}

impl LookupOutcome {
    /// Whether everything that was asked for was found
    pub fn is_complete(&self) -> bool {
        matches!(self, LookupOutcome::Vendor { .. } | LookupOutcome::Device { .. })
    }
}

impl fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupOutcome::VendorNotFound { vendor_id } => write!(f, "Vendor {} not found", vendor_id),
            LookupOutcome::Vendor { vendor } => write!(f, "{}", vendor),
            LookupOutcome::Device { vendor, device } => write!(f, "{}\n\t{}", vendor, device),
            LookupOutcome::DeviceNotFound { vendor, device_id } => {
                write!(f, "{}\n\t{}  (device not found)", vendor, device_id)
            }
        }
    }
}

/// A vendor together with every device registered under it
#[derive(Debug, Clone, Serialize)]
pub struct VendorListing {
    pub vendor: Vendor,
    pub devices: Vec<Device>,
}

impl fmt::Display for VendorListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.vendor)?;
        for device in &self.devices {
            write!(f, "\n\t{}", device)?;
        }
        Ok(())
    }
}

/// Lookup service over a store
pub struct LookupService<'a> {
    store: &'a SqliteStore,
}

impl<'a> LookupService<'a> {
    /// Create a new lookup service
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Look up a vendor, optionally with one of its devices.
    ///
    /// Blank input counts as absent.
    pub fn lookup(&self, vendor_id: Option<&str>, device_id: Option<&str>) -> Result<LookupOutcome> {
        let vendor_id = non_blank(vendor_id);
        let device_id = non_blank(device_id);

        let vendor_id = match (vendor_id, device_id) {
            (None, None) => return Err(Error::InvalidQuery("no vendor or device id given".to_string())),
            (None, Some(_)) => {
                return Err(Error::InvalidQuery(
                    "a device id needs its vendor id; device ids are only unique per vendor".to_string(),
                ));
            }
            (Some(v), _) => UsbId::parse(v)?,
        };
        let device_id = device_id.map(UsbId::parse).transpose()?;

        let Some(vendor) = self.store.get_vendor(vendor_id)? else {
            tracing::debug!("Vendor {} not in store", vendor_id);
            return Ok(LookupOutcome::VendorNotFound { vendor_id });
        };

        let Some(device_id) = device_id else {
            return Ok(LookupOutcome::Vendor { vendor });
        };

        match self.store.get_device(vendor_id, device_id)? {
            Some(device) => Ok(LookupOutcome::Device { vendor, device }),
            None => Ok(LookupOutcome::DeviceNotFound { vendor, device_id }),
        }
    }

    /// A vendor and all of its devices, `None` if the vendor is unknown
    pub fn vendor_devices(&self, vendor_id: &str) -> Result<Option<VendorListing>> {
        let vendor_id = UsbId::parse(vendor_id)?;
        let Some(vendor) = self.store.get_vendor(vendor_id)? else {
            return Ok(None);
        };
        let devices = self.store.devices_for_vendor(vendor_id)?;
        Ok(Some(VendorListing { vendor, devices }))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
