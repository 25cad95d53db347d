//! JSON report output.
//!
//! A report is a ranked snapshot of the aggregate tables, meant for CI
//! artifacts and for diffing two runs by eye.

use super::path::{create_output, file_size};
use crate::aggregator::{top_by_bytes, RankedAlloc};
use crate::profile::AllocationProfile;
use crate::utils::config::{MATCH_ALL_PATTERN, SCHEMA_VERSION};
use crate::utils::error::OutputError;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Top-level report structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// Profile the report was built from
    pub source: String,

    /// Number of distinct function names in the aggregate tables
    pub function_count: usize,

    /// Number of stacks with at least one surviving frame
    pub stack_count: usize,

    pub sample_count: usize,

    pub top_inclusive: Vec<ReportRow>,
    pub top_exclusive: Vec<ReportRow>,

    /// Ranked by inclusive peak sums
    pub top_global_peaks: Vec<ReportRow>,

    /// Timestamp when the report was generated
    pub generated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub name: String,
    pub bytes: u64,
    pub count: u64,
}

impl From<RankedAlloc> for ReportRow {
    fn from(row: RankedAlloc) -> Self {
        Self {
            name: row.name,
            bytes: row.bytes,
            count: row.count,
        }
    }
}

/// Build a report from an indexed profile
pub fn build_report(profile: &AllocationProfile, source: &str, top_n: usize) -> AllocationReport {
    let ranked = |use_exclusive: bool| -> Vec<ReportRow> {
        let all = profile.allocs_by_name_lenient(MATCH_ALL_PATTERN, use_exclusive);
        top_by_bytes(&all, top_n).into_iter().map(ReportRow::from).collect()
    };

    AllocationReport {
        version: SCHEMA_VERSION.to_string(),
        source: source.to_string(),
        function_count: profile.index().len(),
        stack_count: profile.index().stack_count(),
        sample_count: profile.sample_count(),
        top_inclusive: ranked(false),
        top_exclusive: ranked(true),
        top_global_peaks: profile
            .top_global_peaks(false, top_n)
            .into_iter()
            .map(ReportRow::from)
            .collect(),
        generated_at: Utc::now().to_rfc3339(),
    }
}

/// Write a report to a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_report(report: &AllocationReport, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing report to: {}", output_path.display());

    let mut writer = create_output(output_path)?;
    serde_json::to_writer_pretty(&mut writer, report).map_err(OutputError::SerializationFailed)?;
    writer.flush()?;

    info!("Report written successfully ({} bytes)", file_size(output_path));

    Ok(())
}

/// Read a report back from a JSON file
pub fn read_report(input_path: impl AsRef<Path>) -> Result<AllocationReport, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading report from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let report: AllocationReport =
        serde_json::from_reader(BufReader::new(file)).map_err(OutputError::SerializationFailed)?;

    debug!("Report loaded: version {}, source {}", report.version, report.source);

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::IndexOptions;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn profile() -> AllocationProfile {
        let doc = json!({
            "sites": {
                "strings": ["leaf", "main"],
                "instr": {"a": {"function": 0}, "b": {"function": 1}}
            },
            "stacks": {"stats": [
                {"stackId": "S1", "stack": ["a", "b"],
                 "infos": {"alloc": {"count": 4, "sum": "4096"}, "globalPeak": "1024"}}
            ]},
            "globals": {"ticksPerSecond": 1.0},
            "timeline": {"memoryTimeline": {
                "perPoints": 1.0,
                "fields": ["requestedMem", "physicalMem", "virtualMem"],
                "values": [],
                "callsite": []
            }}
        });
        AllocationProfile::from_value(&doc, &IndexOptions::default()).unwrap()
    }

    #[test]
    fn test_build_report() {
        let report = build_report(&profile(), "run.json", 5);

        assert_eq!(report.function_count, 2);
        assert_eq!(report.stack_count, 1);
        assert_eq!(report.sample_count, 0);
        assert_eq!(
            report.top_exclusive[0],
            ReportRow { name: "leaf".to_string(), bytes: 4096, count: 4 }
        );
        assert_eq!(report.top_exclusive[1].bytes, 0);
        assert_eq!(report.top_global_peaks.len(), 2);
    }

    #[test]
    fn test_write_and_read_report() {
        let report = build_report(&profile(), "run.json", 5);
        let temp_file = NamedTempFile::new().unwrap();

        write_report(&report, temp_file.path()).unwrap();
        let loaded = read_report(temp_file.path()).unwrap();

        assert_eq!(loaded, report);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_report_surfaces_flush_error() {
        let device = Path::new("/dev/full");
        if !device.exists() {
            return;
        }

        // the whole report fits in the buffer, so only the final flush hits the device
        let report = build_report(&profile(), "run.json", 5);
        let result = write_report(&report, device);
        assert!(matches!(result, Err(OutputError::WriteFailed(_))));
    }
}
