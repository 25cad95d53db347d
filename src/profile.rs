//! The allocation-profile engine.
//!
//! `AllocationProfile` decodes a MALT document, indexes every stack once at
//! construction, and answers read-only queries afterwards. Construction
//! either succeeds completely or returns the first structural error.

use crate::aggregator::{
    allocs_by_name, allocs_by_name_lenient, top_global_peaks, AllocTotals, FunctionCost,
    NoiseFilter, RankedAlloc, StackIndex,
};
use crate::parser::{
    decode_document, load_document, LeakRecord, MemoryTimeline, SiteInfo, StackRecord, SymbolTable,
};
use crate::timeline::{annotated_timeline, TimelineEntry, TimestampPolicy};
use crate::utils::config::UNKNOWN_STACK;
use crate::utils::error::ProfileError;
use log::info;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

/// Options applied while indexing
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    pub noise: NoiseFilter,
    pub timestamps: TimestampPolicy,
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_noise_filter(mut self, noise: NoiseFilter) -> Self {
        self.noise = noise;
        self
    }

    /// Keep only frames from files whose path contains `filter`
    pub fn with_file_filter(mut self, filter: Option<String>) -> Self {
        self.noise = self.noise.with_file_filter(filter);
        self
    }

    pub fn with_timestamp_policy(mut self, policy: TimestampPolicy) -> Self {
        self.timestamps = policy;
        self
    }
}

/// A fully indexed allocation profile
#[derive(Debug, Clone)]
pub struct AllocationProfile {
    symbols: SymbolTable,
    stacks: Vec<StackRecord>,
    index: StackIndex,
    timeline: MemoryTimeline,
    leaks: Vec<LeakRecord>,
    timestamps: TimestampPolicy,
}

impl AllocationProfile {
    /// Load and index a profile file
    pub fn load(path: impl AsRef<Path>, options: &IndexOptions) -> Result<Self, ProfileError> {
        let document = load_document(path)?;
        Self::from_value(&document, options)
    }

    /// Index an already parsed document
    ///
    /// # Errors
    /// * `ProfileError::MalformedDocument` - missing keys or bad numbers
    /// * `ProfileError::OutOfRange` - name pool index outside the pool
    pub fn from_value(document: &Value, options: &IndexOptions) -> Result<Self, ProfileError> {
        let start_time = Instant::now();

        let decoded = decode_document(document)?;

        if let Some(filter) = options.noise.file_filter() {
            info!("Keeping only frames from files matching '{}'", filter);
        }
        let index = StackIndex::build(&decoded.stacks, &decoded.symbols, &options.noise);

        info!(
            "Indexing done in {:.2}s",
            start_time.elapsed().as_secs_f64()
        );

        Ok(Self {
            symbols: decoded.symbols,
            stacks: decoded.stacks,
            index,
            timeline: decoded.timeline,
            leaks: decoded.leaks,
            timestamps: options.timestamps,
        })
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Site id or function name lookup
    pub fn lookup(&self, key: &str) -> Option<&SiteInfo> {
        self.symbols.lookup(key)
    }

    pub fn index(&self) -> &StackIndex {
        &self.index
    }

    pub fn cost(&self, name: &str) -> Option<&FunctionCost> {
        self.index.cost(name)
    }

    pub fn stacks(&self) -> &[StackRecord] {
        &self.stacks
    }

    pub fn leaks(&self) -> &[LeakRecord] {
        &self.leaks
    }

    pub fn sample_count(&self) -> usize {
        self.timeline.rows.len()
    }

    /// Resolved call path of an indexed stack
    pub fn callsite(&self, stack_id: &str) -> Option<&[String]> {
        self.index.callsite(stack_id)
    }

    /// See [`crate::aggregator::allocs_by_name`]
    pub fn allocs_by_name(
        &self,
        pattern: &str,
        use_exclusive: bool,
    ) -> Result<BTreeMap<String, AllocTotals>, ProfileError> {
        allocs_by_name(&self.index, pattern, use_exclusive)
    }

    /// See [`crate::aggregator::allocs_by_name_lenient`]
    pub fn allocs_by_name_lenient(
        &self,
        pattern: &str,
        use_exclusive: bool,
    ) -> BTreeMap<String, AllocTotals> {
        allocs_by_name_lenient(&self.index, pattern, use_exclusive)
    }

    pub fn top_global_peaks(&self, use_exclusive: bool, top_n: usize) -> Vec<RankedAlloc> {
        top_global_peaks(&self.index, use_exclusive, top_n)
    }

    /// Annotated timeline, recomputed on every call
    pub fn annotated_timeline(&self) -> Vec<TimelineEntry> {
        annotated_timeline(&self.timeline, &self.index, self.timestamps)
    }

    /// Render site ids as `< line:function < line:function`
    pub fn flatten_stack<S: AsRef<str>>(&self, stack: &[S]) -> String {
        stack
            .iter()
            .map(|site_id| {
                let site_id = site_id.as_ref();
                match self.symbols.site(site_id) {
                    Some(info) => format!("< {}:{}", info.line, info.function),
                    None => format!("< ??:{}", site_id),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Flattened surviving frames of an indexed stack
    pub fn flatten_stack_from_id(&self, stack_id: &str) -> String {
        match self.index.site_path(stack_id) {
            Some(sites) => self.flatten_stack(sites),
            None => UNKNOWN_STACK.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "sites": {
                "strings": ["malloc", "foo", "main", "app.cpp"],
                "instr": {
                    "siteA": {"function": 0},
                    "siteB": {"function": 1, "file": 3, "line": 7},
                    "siteC": {"function": 2, "file": 3, "line": 42}
                }
            },
            "stacks": {"stats": [
                {"stackId": "S1", "stack": ["siteA", "siteB", "siteC"],
                 "infos": {"alloc": {"count": 3, "sum": "900"}, "globalPeak": "100"}}
            ]},
            "globals": {"ticksPerSecond": 10.0},
            "timeline": {"memoryTimeline": {
                "perPoints": 1.0,
                "fields": ["requestedMem", "physicalMem", "virtualMem"],
                "values": [[5, 6, 7]],
                "callsite": ["S1"]
            }}
        })
    }

    #[test]
    fn test_flatten_stack_from_id() {
        let profile = AllocationProfile::from_value(&document(), &IndexOptions::default()).unwrap();

        assert_eq!(profile.flatten_stack_from_id("S1"), "< 7:foo < 42:main");
        assert_eq!(profile.flatten_stack_from_id("S404"), "UNKNOWN");
        assert_eq!(profile.flatten_stack(&["siteB", "0xbad"]), "< 7:foo < ??:0xbad");
    }

    #[test]
    fn test_lookup_by_site_and_function() {
        let profile = AllocationProfile::from_value(&document(), &IndexOptions::default()).unwrap();

        assert_eq!(profile.lookup("siteC").unwrap().line, 42);
        assert_eq!(profile.lookup("foo").unwrap().line, 7);
        assert!(profile.lookup("nothing").is_none());
    }

    #[test]
    fn test_malformed_document_fails_construction() {
        let mut doc = document();
        doc["sites"]["instr"]["siteA"] = json!({"line": 3});

        let result = AllocationProfile::from_value(&doc, &IndexOptions::default());
        assert!(matches!(result, Err(ProfileError::MalformedDocument(_))));
    }
}
