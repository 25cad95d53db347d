//! Stack aggregation: attribute each stack's cost to function names.
//!
//! Attribution rule, per stack record:
//! - every surviving frame is credited the record's full inclusive bytes
//! - only the first surviving frame (leaf-most) is credited exclusive bytes
//! - a record whose frames are all noise is credited to its own stack id
//!
//! Example: stack `[malloc, parse, main]` with 900 bytes credits
//! `parse` inclusive 900 / exclusive 900 and `main` inclusive 900 / exclusive 0.

use super::filter::NoiseFilter;
use crate::parser::{StackRecord, SymbolTable};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;

/// Additive peak accumulation.
///
/// These are sums of each stack's bytes at the global peak, not a
/// high-water mark of any single function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeakSums {
    pub inclusive: u64,
    pub exclusive: u64,
}

/// Aggregated cost of one function name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FunctionCost {
    pub count: u64,
    pub inclusive: u64,
    pub exclusive: u64,
    pub peak: PeakSums,
}

impl FunctionCost {
    /// Bytes from the selected table
    pub fn bytes(&self, use_exclusive: bool) -> u64 {
        if use_exclusive {
            self.exclusive
        } else {
            self.inclusive
        }
    }

    pub fn peak_bytes(&self, use_exclusive: bool) -> u64 {
        if use_exclusive {
            self.peak.exclusive
        } else {
            self.peak.inclusive
        }
    }
}

/// Aggregate tables plus the resolved call path of every indexed stack
#[derive(Debug, Clone, Default)]
pub struct StackIndex {
    costs: HashMap<String, FunctionCost>,

    /// stack id -> surviving function names, stack order
    callsite: HashMap<String, Vec<String>>,

    /// stack id -> surviving site ids, stack order
    site_paths: HashMap<String, Vec<String>>,

    skipped_records: usize,
}

impl StackIndex {
    /// Walk every record and build the aggregate tables
    ///
    /// **Public** - main entry point for indexing
    pub fn build(records: &[StackRecord], symbols: &SymbolTable, filter: &NoiseFilter) -> Self {
        debug!("Indexing {} stack records", records.len());

        let mut index = StackIndex::default();
        for record in records {
            index.index_record(record, symbols, filter);
        }

        info!(
            "Indexed {} functions from {} stacks ({} without cost skipped)",
            index.costs.len(),
            records.len() - index.skipped_records,
            index.skipped_records
        );

        index
    }

    /// **Private** - one step of build
    fn index_record(&mut self, record: &StackRecord, symbols: &SymbolTable, filter: &NoiseFilter) {
        if record.is_empty_cost() {
            self.skipped_records += 1;
            return;
        }

        let mut exclusive = record.inclusive_bytes;

        for site_id in &record.stack {
            let site = symbols.site(site_id);
            let name = symbols.resolve_name(site_id);
            if filter.is_noise(site_id, name, site) {
                continue;
            }

            self.callsite
                .entry(record.stack_id.clone())
                .or_default()
                .push(name.to_string());
            self.site_paths
                .entry(record.stack_id.clone())
                .or_default()
                .push(site_id.clone());

            self.credit(
                name,
                record.count,
                record.inclusive_bytes,
                exclusive,
                record.global_peak_bytes,
            );
            exclusive = 0;
        }

        // Nothing survived: keep the bytes under the stack id
        if exclusive != 0 {
            debug!("Stack {} is all noise, crediting it directly", record.stack_id);
            self.credit(
                &record.stack_id,
                record.count,
                record.inclusive_bytes,
                exclusive,
                record.global_peak_bytes,
            );
        }
    }

    fn credit(&mut self, name: &str, count: u64, inclusive: u64, exclusive: u64, global_peak: u64) {
        let row = self.costs.entry(name.to_string()).or_default();
        row.count = row.count.saturating_add(count);
        row.inclusive = row.inclusive.saturating_add(inclusive);
        row.exclusive = row.exclusive.saturating_add(exclusive);

        if global_peak > 0 {
            row.peak.inclusive = row.peak.inclusive.saturating_add(global_peak);
            if exclusive > 0 {
                row.peak.exclusive = row.peak.exclusive.saturating_add(global_peak);
            }
        }
    }

    pub fn cost(&self, name: &str) -> Option<&FunctionCost> {
        self.costs.get(name)
    }

    /// Every aggregated function, in no particular order
    pub fn costs(&self) -> impl Iterator<Item = (&str, &FunctionCost)> {
        self.costs.iter().map(|(name, cost)| (name.as_str(), cost))
    }

    /// Resolved function names of an indexed stack
    pub fn callsite(&self, stack_id: &str) -> Option<&[String]> {
        self.callsite.get(stack_id).map(Vec::as_slice)
    }

    /// Surviving site ids of an indexed stack
    pub fn site_path(&self, stack_id: &str) -> Option<&[String]> {
        self.site_paths.get(stack_id).map(Vec::as_slice)
    }

    pub fn stack_count(&self) -> usize {
        self.callsite.len()
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SiteInfo;

    fn symbols(entries: &[(&str, &str)]) -> SymbolTable {
        let mut table = SymbolTable::default();
        for (id, function) in entries {
            table.insert(
                id.to_string(),
                SiteInfo {
                    function: function.to_string(),
                    file: "app.cpp".to_string(),
                    line: 1,
                },
            );
        }
        table
    }

    fn record(id: &str, stack: &[&str], count: u64, bytes: u64, peak: u64) -> StackRecord {
        StackRecord {
            stack_id: id.to_string(),
            stack: stack.iter().map(|s| s.to_string()).collect(),
            count,
            inclusive_bytes: bytes,
            global_peak_bytes: peak,
        }
    }

    #[test]
    fn test_allocator_frame_is_skipped() {
        let table = symbols(&[("siteA", "malloc"), ("siteB", "foo")]);
        let records = [record("S1", &["siteA", "siteB"], 3, 900, 100)];

        let index = StackIndex::build(&records, &table, &NoiseFilter::default());

        let foo = index.cost("foo").unwrap();
        assert_eq!(foo.inclusive, 900);
        assert_eq!(foo.exclusive, 900);
        assert_eq!(foo.count, 3);
        assert_eq!(foo.peak, PeakSums { inclusive: 100, exclusive: 100 });
        assert!(index.cost("malloc").is_none());
        assert_eq!(index.callsite("S1").unwrap(), ["foo"]);
        assert_eq!(index.site_path("S1").unwrap(), ["siteB"]);
    }

    #[test]
    fn test_only_first_surviving_frame_is_exclusive() {
        let table = symbols(&[("a", "leaf"), ("b", "bar"), ("c", "main")]);
        let records = [
            record("S1", &["a", "b", "c"], 1, 500, 0),
            record("S2", &["a", "b"], 1, 700, 50),
        ];

        let index = StackIndex::build(&records, &table, &NoiseFilter::default());

        let bar = index.cost("bar").unwrap();
        assert_eq!(bar.inclusive, 1200);
        assert_eq!(bar.exclusive, 0);
        assert_eq!(bar.peak, PeakSums { inclusive: 50, exclusive: 0 });

        let leaf = index.cost("leaf").unwrap();
        assert_eq!(leaf.exclusive, 1200);
        assert_eq!(leaf.peak.exclusive, 50);
    }

    #[test]
    fn test_zero_cost_record_leaves_no_trace() {
        let table = symbols(&[("a", "foo")]);
        let records = [record("S1", &["a"], 5, 0, 0)];

        let index = StackIndex::build(&records, &table, &NoiseFilter::default());

        assert!(index.is_empty());
        assert!(index.callsite("S1").is_none());
    }

    #[test]
    fn test_all_noise_record_credits_stack_id() {
        let table = symbols(&[("a", "malloc"), ("b", "__gnu_cxx::allocate")]);
        let records = [record("S9", &["a", "b"], 2, 64, 32)];

        let index = StackIndex::build(&records, &table, &NoiseFilter::default());

        let synthetic = index.cost("S9").unwrap();
        assert_eq!(synthetic.count, 2);
        assert_eq!(synthetic.inclusive, 64);
        assert_eq!(synthetic.exclusive, 64);
        assert_eq!(synthetic.peak, PeakSums { inclusive: 32, exclusive: 32 });
        assert!(index.callsite("S9").is_none());
    }

    #[test]
    fn test_unknown_site_uses_raw_id() {
        let table = symbols(&[("b", "main")]);
        let records = [record("S1", &["0xdead", "b"], 1, 10, 0)];

        let index = StackIndex::build(&records, &table, &NoiseFilter::default());

        assert_eq!(index.cost("0xdead").unwrap().exclusive, 10);
        assert_eq!(index.callsite("S1").unwrap(), ["0xdead", "main"]);
    }

    #[test]
    fn test_peak_only_record_is_indexed() {
        let table = symbols(&[("a", "foo")]);
        let records = [record("S1", &["a"], 0, 0, 256)];

        let index = StackIndex::build(&records, &table, &NoiseFilter::default());

        let foo = index.cost("foo").unwrap();
        assert_eq!(foo.inclusive, 0);
        assert_eq!(foo.peak, PeakSums { inclusive: 256, exclusive: 0 });
    }
}
