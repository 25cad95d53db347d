//! Argument structs shared between the CLI and command implementations.

use crate::profile::IndexOptions;
use crate::timeline::TimestampPolicy;
use crate::utils::config::DEFAULT_TOP_N;
use std::path::PathBuf;

/// Arguments for the query command
#[derive(Debug, Clone)]
pub struct QueryArgs {
    /// Profile JSON file
    pub input: PathBuf,

    /// Function-name regex, `None` matches everything
    pub pattern: Option<String>,

    /// Rank by exclusive instead of inclusive bytes
    pub exclusive: bool,

    /// Keep only frames from files containing this string
    pub file_filter: Option<String>,

    pub top_n: usize,

    /// Treat the pattern as plain text
    pub literal: bool,
}

impl Default for QueryArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            pattern: None,
            exclusive: false,
            file_filter: None,
            top_n: DEFAULT_TOP_N,
            literal: false,
        }
    }
}

/// Arguments for the peaks command
#[derive(Debug, Clone)]
pub struct PeaksArgs {
    pub input: PathBuf,
    pub exclusive: bool,
    pub file_filter: Option<String>,
    pub top_n: usize,
}

/// Arguments for the timeline command
#[derive(Debug, Clone)]
pub struct TimelineArgs {
    pub input: PathBuf,

    /// CSV destination, stdout when absent
    pub output: Option<PathBuf>,

    /// Timestamp samples by source row instead of emitted position
    pub source_row_time: bool,
}

impl TimelineArgs {
    pub fn index_options(&self) -> IndexOptions {
        let policy = if self.source_row_time {
            TimestampPolicy::SourceRow
        } else {
            TimestampPolicy::EmittedIndex
        };
        IndexOptions::new().with_timestamp_policy(policy)
    }
}

/// Arguments for the dump command
#[derive(Debug, Clone)]
pub struct DumpArgs {
    pub input: PathBuf,
    pub file_filter: Option<String>,
}

/// Arguments for the report command
#[derive(Debug, Clone)]
pub struct ReportArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub top_n: usize,
}
