//! Memory timeline reconstruction.
//!
//! Turns the sampled memory series into time-stamped entries carrying the
//! call stack that was active at each sample.

pub mod reconstruct;

pub use reconstruct::{annotated_timeline, TimelineEntry, TimestampPolicy};
