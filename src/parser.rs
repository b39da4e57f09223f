//! Line-grammar parser for the `usb.ids` registry format
//!
//! ```text
//! # comment
//! 1d6b  Linux Foundation          <- vendor (column 0, 4 hex digits)
//! 	0002  2.0 root hub              <- device (one tab)
//! 		01  some interface          <- interface (two tabs, ignored)
//! C 09  Hub                       <- other section (ignored with its children)
//! ```
//!
//! The parser makes a single pass and never aborts: lines it cannot use
//! are either ignored (other entity types) or recorded as [`ParseWarning`]s.

use crate::id::UsbId;
use crate::registry::{Device, Registry, Vendor};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static VENDOR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9A-Fa-f]{4})\s+(\S.*)$").expect("vendor regex is valid"));

static DEVICE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\t([0-9A-Fa-f]{4})\s+(\S.*)$").expect("device regex is valid"));

/// Why a line was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseWarningKind {
    /// Device line before any vendor line
    OrphanDevice,
    /// Tab-indented line under a vendor that is not `<4 hex>  <name>`
    MalformedDevice,
    /// Column-0 line that looks like a vendor id but is not one
    MalformedVendor,
}

impl ParseWarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseWarningKind::OrphanDevice => "device line without a vendor",
            ParseWarningKind::MalformedDevice => "malformed device line",
            ParseWarningKind::MalformedVendor => "malformed vendor line",
        }
    }
}

/// A skipped line (1-indexed line number)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub line: usize,
    pub kind: ParseWarningKind,
    pub content: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {:?}", self.line, self.kind.as_str(), self.content)
    }
}

/// Parser output: the usable records plus every skipped line
#[derive(Debug, Clone, Default)]
pub struct ParsedRegistry {
    pub registry: Registry,
    pub warnings: Vec<ParseWarning>,
}

impl ParsedRegistry {
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// What the most recent column-0 line opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Nothing seen yet
    Start,
    /// Devices attach to this vendor
    Vendor(UsbId),
    /// Rejected vendor line; its children are dropped
    Rejected,
    /// Class, language, HID or other non-vendor section
    Foreign,
}

/// Parse a registry document.
pub fn parse(raw: &str) -> ParsedRegistry {
    let mut out = ParsedRegistry::default();
    let mut context = Context::Start;

    for (idx, raw_line) in raw.lines().enumerate() {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        let line_no = idx + 1;

        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with("\t\t") {
            continue;
        }

        if line.starts_with('\t') {
            match context {
                Context::Vendor(vendor_id) => match DEVICE_LINE.captures(line) {
                    Some(caps) => {
                        // regex guarantees four hex digits
                        if let Some(device_id) = UsbId::from_registry(&caps[1]) {
                            out.registry
                                .devices
                                .push(Device::new(vendor_id, device_id, caps[2].trim()));
                        }
                    }
                    None => warn(&mut out, line_no, ParseWarningKind::MalformedDevice, line),
                },
                Context::Start => warn(&mut out, line_no, ParseWarningKind::OrphanDevice, line),
                Context::Rejected | Context::Foreign => {}
            }
            continue;
        }

        if line.starts_with(char::is_whitespace) {
            continue;
        }

        if let Some(caps) = VENDOR_LINE.captures(line) {
            if let Some(vendor_id) = UsbId::from_registry(&caps[1]) {
                out.registry.vendors.push(Vendor::new(vendor_id, caps[2].trim()));
                context = Context::Vendor(vendor_id);
                continue;
            }
        }

        if looks_like_vendor_id(line) {
            warn(&mut out, line_no, ParseWarningKind::MalformedVendor, line);
            context = Context::Rejected;
        } else {
            context = Context::Foreign;
        }
    }

    if !out.warnings.is_empty() {
        tracing::warn!("Skipped {} malformed registry lines", out.warnings.len());
    }
    tracing::debug!(
        vendors = out.registry.vendors.len(),
        devices = out.registry.devices.len(),
        "Parsed registry"
    );

    out
}

/// Section keywords (`C`, `HID`, `BIAS`, ...) never contain digits.
fn looks_like_vendor_id(line: &str) -> bool {
    let token = line.split_whitespace().next().unwrap_or("");
    token.len() == 4 && token.bytes().any(|b| b.is_ascii_digit())
}

fn warn(out: &mut ParsedRegistry, line: usize, kind: ParseWarningKind, content: &str) {
    let warning = ParseWarning {
        line,
        kind,
        content: content.to_string(),
    };
    tracing::debug!("Skipping {}", warning);
    out.warnings.push(warning);
}
