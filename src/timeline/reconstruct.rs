//! Rebuild the memory timeline with a resolved call stack on every sample.

use crate::aggregator::StackIndex;
use crate::parser::MemoryTimeline;
use log::debug;
use serde::Serialize;

/// How sample timestamps are derived when truncated rows get skipped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampPolicy {
    /// `t = (emitted samples so far + 1) * delta`; skipped rows do not
    /// consume a time slot, so later samples shift earlier
    #[default]
    EmittedIndex,

    /// `t = (source row + 1) * delta`; skipped rows leave a gap
    SourceRow,
}

/// One annotated sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    /// Seconds since the start of the run
    pub t: f64,
    pub physical_bytes: u64,
    pub virtual_bytes: u64,
    pub requested_bytes: u64,

    /// Resolved function names, or the raw stack id when it was never indexed
    pub stack: Vec<String>,

    /// Callsite id recorded for the row, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,
}

/// Produce the annotated timeline
///
/// **Public** - consumed by the CSV writer and any chart front end
///
/// Rows too short to hold every memory column are skipped. The result is
/// computed fresh on each call.
pub fn annotated_timeline(
    timeline: &MemoryTimeline,
    index: &StackIndex,
    policy: TimestampPolicy,
) -> Vec<TimelineEntry> {
    let delta = timeline.delta();
    let columns = timeline.columns;
    let max_index = columns.max_index();

    let mut entries = Vec::with_capacity(timeline.rows.len());

    for (row_idx, row) in timeline.rows.iter().enumerate() {
        if row.len() <= max_index {
            debug!(
                "Skipping timeline row {}: {} cells, need {}",
                row_idx,
                row.len(),
                max_index + 1
            );
            continue;
        }

        let slot = match policy {
            TimestampPolicy::EmittedIndex => entries.len(),
            TimestampPolicy::SourceRow => row_idx,
        };

        entries.push(TimelineEntry {
            t: (slot + 1) as f64 * delta,
            physical_bytes: row[columns.physical],
            virtual_bytes: row[columns.virtual_mem],
            requested_bytes: row[columns.requested],
            stack: resolve_stack(timeline.callsite.get(row_idx), index),
            stack_id: timeline.callsite.get(row_idx).cloned(),
        });
    }

    entries
}

/// **Private** - display stack for one sample
fn resolve_stack(stack_id: Option<&String>, index: &StackIndex) -> Vec<String> {
    match stack_id {
        Some(id) => match index.callsite(id) {
            Some(names) => names.to_vec(),
            None => vec![id.clone()],
        },
        None => Vec::new(),
    }
}
