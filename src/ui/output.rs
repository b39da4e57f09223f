use crate::lookup::{LookupOutcome, VendorListing};
use crate::registry::{Device, Vendor};
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::PLUG, text.style(theme().heading));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().ok));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().failure));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().notice));
}

pub fn dim(text: &str) -> String {
    text.style(theme().label).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().label), value);
}

/// Cached data is being served because the refresh failed
pub fn degraded(last_updated: &str, reason: &str) {
    warn(&format!("Could not refresh the USB id registry: {}", reason));
    eprintln!("   {}", dim(&format!("Using cached data from {}", last_updated)));
}

fn vendor_line(vendor: &Vendor) -> String {
    format!("{}  {}", vendor.id.style(theme().id), vendor.name.style(theme().name))
}

fn device_line(device: &Device) -> String {
    format!("\t{}  {}", device.device_id.style(theme().id), device.name)
}

pub fn lookup_result(outcome: &LookupOutcome) {
    match outcome {
        LookupOutcome::VendorNotFound { vendor_id } => {
            println!("{} Vendor {} not found", Icons::CROSS, vendor_id);
        }
        LookupOutcome::Vendor { vendor } => {
            println!("{}", vendor_line(vendor));
        }
        LookupOutcome::Device { vendor, device } => {
            println!("{}", vendor_line(vendor));
            println!("{}", device_line(device));
        }
        LookupOutcome::DeviceNotFound { vendor, device_id } => {
            println!("{}", vendor_line(vendor));
            println!(
                "\t{}  {}",
                device_id.style(theme().id),
                "device not found".style(theme().notice)
            );
        }
    }
}

pub fn listing(listing: &VendorListing) {
    println!("{}", vendor_line(&listing.vendor));
    if listing.devices.is_empty() {
        println!("\t{}", dim("(no devices registered)"));
    }
    for device in &listing.devices {
        println!("{}", device_line(device));
    }
}
