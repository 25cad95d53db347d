//! Typed records decoded from a MALT profile document.
//!
//! The generic JSON tree is converted into these once, during construction.
//! Nothing past the parser holds on to `serde_json::Value`.

/// One entry of `stacks.stats`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackRecord {
    pub stack_id: String,

    /// Site identifiers in the order the profiler wrote them (leaf first)
    pub stack: Vec<String>,

    /// Number of allocation events on this stack
    pub count: u64,

    /// Cumulative bytes allocated on this stack (`infos.alloc.sum`)
    pub inclusive_bytes: u64,

    /// Bytes held by this stack at the global memory peak
    pub global_peak_bytes: u64,
}

impl StackRecord {
    /// A record with neither allocated nor peak bytes carries no cost
    pub fn is_empty_cost(&self) -> bool {
        self.inclusive_bytes == 0 && self.global_peak_bytes == 0
    }
}

/// Positions of the memory series inside each timeline row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineColumns {
    pub physical: usize,
    pub virtual_mem: usize,
    pub requested: usize,
}

impl TimelineColumns {
    /// Largest column index; shorter rows cannot be read
    pub fn max_index(&self) -> usize {
        self.physical.max(self.virtual_mem).max(self.requested)
    }
}

/// `timeline.memoryTimeline` together with the global tick rate
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryTimeline {
    pub ticks_per_second: f64,

    /// Sampling interval in ticks
    pub per_points: f64,

    pub columns: TimelineColumns,

    /// Sample rows, already converted to byte counts
    pub rows: Vec<Vec<u64>>,

    /// Stack id active at each sample, parallel to `rows`
    pub callsite: Vec<String>,
}

impl MemoryTimeline {
    /// Seconds between two samples
    pub fn delta(&self) -> f64 {
        self.per_points / self.ticks_per_second
    }
}

/// One entry of the optional top-level `leaks` array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeakRecord {
    pub memory: u64,
    pub count: u64,
    pub stack: Vec<String>,
}
