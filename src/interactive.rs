//! Interactive prompt
//!
//! Repeatedly asks for a vendor id and a device id and prints the result.
//! Invalid input is reported and the session continues; `q` or end of
//! input ends it.

use crate::lookup::{LookupOutcome, LookupService};
use crate::{Error, Result};
use std::io::{BufRead, Write};

/// Counters for one prompt session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub queries: usize,
    pub invalid: usize,
    /// Valid queries where the vendor or device was unknown
    pub not_found: usize,
}

/// Read one answer. `None` on end of input or a quit command.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<Option<String>> {
    write!(output, "{}: ", label)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let answer = line.trim();
    if answer.eq_ignore_ascii_case("q") || answer.eq_ignore_ascii_case("quit") {
        return Ok(None);
    }
    Ok(Some(answer.to_string()))
}

/// Run the prompt loop until the user quits.
///
/// Only storage failures end the session early.
pub fn run<R: BufRead, W: Write>(service: &LookupService<'_>, mut input: R, mut output: W) -> Result<SessionSummary> {
    let mut summary = SessionSummary::default();
    writeln!(output, "Enter hex ids; leave the device blank for a vendor lookup, 'q' to quit.")?;

    loop {
        writeln!(output)?;
        let Some(vendor) = prompt(&mut input, &mut output, "Vendor ID")? else {
            break;
        };
        let Some(device) = prompt(&mut input, &mut output, "Device ID")? else {
            break;
        };

        summary.queries += 1;
        match service.lookup(Some(&vendor), Some(&device)) {
            Ok(outcome) => {
                if !outcome.is_complete() {
                    summary.not_found += 1;
                }
                print_outcome(&mut output, &outcome)?;
            }
            Err(Error::InvalidQuery(reason)) => {
                summary.invalid += 1;
                writeln!(output, "Invalid input: {}", reason)?;
            }
            Err(err) => return Err(err),
        }
    }

    writeln!(output)?;
    Ok(summary)
}

fn print_outcome<W: Write>(output: &mut W, outcome: &LookupOutcome) -> Result<()> {
    writeln!(output, "{}", outcome)?;
    Ok(())
}
