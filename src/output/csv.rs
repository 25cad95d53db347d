//! CSV dumps of the timeline, global-peak stacks and leaks.
//!
//! Every writer takes an `io::Write` so the CLI can stream to stdout; the
//! `*_file` variants handle path validation and directory creation.

use super::path::{create_output, file_size};
use crate::profile::AllocationProfile;
use crate::utils::config::{BYTES_PER_MB, UNKNOWN_STACK};
use crate::utils::error::OutputError;
use log::info;
use std::io::Write;
use std::path::Path;

/// Quote a CSV cell, doubling embedded quotes
fn quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

fn megabytes(bytes: u64) -> String {
    format!("{:.3}", bytes as f64 / BYTES_PER_MB)
}

/// Write the annotated timeline
///
/// Columns: time in seconds, change in requested bytes since the previous
/// sample, the three memory series, and the flattened callsite stack.
pub fn write_timeline_csv<W: Write>(profile: &AllocationProfile, mut out: W) -> Result<(), OutputError> {
    writeln!(out, "time(s),request,physical,virtual,requested,location")?;

    let mut last_requested: u64 = 0;
    for entry in profile.annotated_timeline() {
        let request = entry.requested_bytes as i128 - last_requested as i128;
        let location = match &entry.stack_id {
            Some(id) => profile.flatten_stack_from_id(id),
            None => UNKNOWN_STACK.to_string(),
        };
        writeln!(
            out,
            "{},{},{},{},{},{}",
            entry.t,
            request,
            entry.physical_bytes,
            entry.virtual_bytes,
            entry.requested_bytes,
            quote(&location)
        )?;
        last_requested = entry.requested_bytes;
    }

    out.flush()?;
    Ok(())
}

/// Write every stack holding memory at the global peak
pub fn write_global_peak_csv<W: Write>(profile: &AllocationProfile, mut out: W) -> Result<(), OutputError> {
    writeln!(out, "Memory(MB),location")?;

    for record in profile.stacks().iter().filter(|r| r.global_peak_bytes > 0) {
        writeln!(
            out,
            "{},{}",
            megabytes(record.global_peak_bytes),
            quote(&profile.flatten_stack_from_id(&record.stack_id))
        )?;
    }

    out.flush()?;
    Ok(())
}

/// Write the leaked allocations
pub fn write_leaks_csv<W: Write>(profile: &AllocationProfile, mut out: W) -> Result<(), OutputError> {
    writeln!(out, "Memory(MB),count,location")?;

    for leak in profile.leaks() {
        writeln!(
            out,
            "{},{},{}",
            megabytes(leak.memory),
            leak.count,
            quote(&profile.flatten_stack(&leak.stack))
        )?;
    }

    out.flush()?;
    Ok(())
}

pub fn write_timeline_file(profile: &AllocationProfile, path: impl AsRef<Path>) -> Result<(), OutputError> {
    write_to_file(path.as_ref(), |out| write_timeline_csv(profile, out))
}

pub fn write_global_peak_file(profile: &AllocationProfile, path: impl AsRef<Path>) -> Result<(), OutputError> {
    write_to_file(path.as_ref(), |out| write_global_peak_csv(profile, out))
}

pub fn write_leaks_file(profile: &AllocationProfile, path: impl AsRef<Path>) -> Result<(), OutputError> {
    write_to_file(path.as_ref(), |out| write_leaks_csv(profile, out))
}

/// **Private** - open `path` and hand the writer to `write`
fn write_to_file<F>(path: &Path, write: F) -> Result<(), OutputError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), OutputError>,
{
    info!("Writing {}", path.display());

    let mut writer = create_output(path)?;
    write(&mut writer)?;

    info!("Wrote {} ({} bytes)", path.display(), file_size(path));
    Ok(())
}
