//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod dump;
pub mod models;
pub mod query;
pub mod utils;

// Re-export main command functions
pub use dump::{execute_dump, execute_report, execute_timeline};
pub use models::{DumpArgs, PeaksArgs, QueryArgs, ReportArgs, TimelineArgs};
pub use query::{execute_peaks, execute_query, validate_query_args};
pub use utils::{display_version, validate_profile_file};
