//! MALT Index
//!
//! Indexing and query engine for MALT memory allocation profiles.
//!
//! A profile is decoded once into typed records, every call stack is
//! aggregated into per-function inclusive/exclusive/peak byte totals, and
//! the memory timeline is annotated with the resolved stack of each sample.
//!
//! ```ignore
//! use malt_index::{AllocationProfile, IndexOptions};
//!
//! let profile = AllocationProfile::load("malt-app-1234.json", &IndexOptions::default())?;
//! for (name, totals) in profile.allocs_by_name("parse", true)? {
//!     println!("{} {} bytes in {} allocations", name, totals.bytes, totals.count);
//! }
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod profile;
pub mod timeline;
pub mod utils;

pub use profile::{AllocationProfile, IndexOptions};
pub use timeline::{TimelineEntry, TimestampPolicy};
pub use utils::error::ProfileError;
