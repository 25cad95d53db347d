//! Output writers for indexed profiles.
//!
//! This module handles writing data to disk in various formats:
//! - CSV dumps (timeline, global peak stacks, leaks)
//! - JSON reports
//! - Text tables for the terminal

pub mod csv;
pub mod format;
pub mod json;
mod path;

// Re-export main functions
pub use csv::{
    write_global_peak_csv, write_global_peak_file, write_leaks_csv, write_leaks_file,
    write_timeline_csv, write_timeline_file,
};
pub use format::{format_bytes, format_count, render_allocation_table, truncate_name};
pub use json::{build_report, read_report, write_report, AllocationReport, ReportRow};
