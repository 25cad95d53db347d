//! Aggregation of stack records into function-centric cost tables.
//!
//! This module transforms decoded stack records into:
//! - Inclusive/exclusive/peak byte totals per function
//! - Resolved call paths per stack id
//! - Pattern queries and rankings over those totals

pub mod filter;
pub mod index;
pub mod query;

// Re-export main types and functions
pub use filter::NoiseFilter;
pub use index::{FunctionCost, PeakSums, StackIndex};
pub use query::{
    allocs_by_name, allocs_by_name_lenient, compile_pattern, top_by_bytes, top_global_peaks,
    AllocTotals, RankedAlloc,
};
