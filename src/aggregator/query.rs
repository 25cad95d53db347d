//! Name-pattern queries over the aggregate tables.

use super::index::StackIndex;
use crate::utils::error::ProfileError;
use log::warn;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::BTreeMap;

/// Bytes and event count matched for one function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocTotals {
    pub bytes: u64,
    pub count: u64,
}

/// One row of a ranked listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedAlloc {
    pub name: String,
    pub bytes: u64,
    pub count: u64,
}

/// Compile a case-insensitive, unanchored search pattern
pub fn compile_pattern(pattern: &str) -> Result<Regex, ProfileError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ProfileError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// All functions whose name matches `pattern`
///
/// **Public** - main query entry point
///
/// Bytes come from the exclusive table when `use_exclusive` is set,
/// otherwise from the inclusive table. An empty pattern or `"."` matches
/// every name.
///
/// # Errors
/// * `ProfileError::InvalidPattern` - pattern is not a valid regex
pub fn allocs_by_name(
    index: &StackIndex,
    pattern: &str,
    use_exclusive: bool,
) -> Result<BTreeMap<String, AllocTotals>, ProfileError> {
    let matcher = compile_pattern(pattern)?;
    Ok(collect_matches(index, &matcher, use_exclusive))
}

/// Like [`allocs_by_name`], but an invalid regex is retried as a literal
/// substring instead of failing
pub fn allocs_by_name_lenient(
    index: &StackIndex,
    pattern: &str,
    use_exclusive: bool,
) -> BTreeMap<String, AllocTotals> {
    let matcher = match compile_pattern(pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!("{}; matching it as plain text", e);
            // An escaped pattern always compiles
            match compile_pattern(&regex::escape(pattern)) {
                Ok(re) => re,
                Err(_) => return BTreeMap::new(),
            }
        }
    };
    collect_matches(index, &matcher, use_exclusive)
}

fn collect_matches(
    index: &StackIndex,
    matcher: &Regex,
    use_exclusive: bool,
) -> BTreeMap<String, AllocTotals> {
    index
        .costs()
        .filter(|(name, _)| matcher.is_match(name))
        .map(|(name, cost)| {
            (
                name.to_string(),
                AllocTotals {
                    bytes: cost.bytes(use_exclusive),
                    count: cost.count,
                },
            )
        })
        .collect()
}

/// The `top_n` largest results, by bytes descending then name
pub fn top_by_bytes(results: &BTreeMap<String, AllocTotals>, top_n: usize) -> Vec<RankedAlloc> {
    let mut ranked: Vec<RankedAlloc> = results
        .iter()
        .map(|(name, totals)| RankedAlloc {
            name: name.clone(),
            bytes: totals.bytes,
            count: totals.count,
        })
        .collect();

    // BTreeMap order already sorts ties by name; the sort is stable
    ranked.sort_by(|a, b| b.bytes.cmp(&a.bytes));
    ranked.truncate(top_n);
    ranked
}

/// Functions ranked by their peak sums, zeros left out
pub fn top_global_peaks(index: &StackIndex, use_exclusive: bool, top_n: usize) -> Vec<RankedAlloc> {
    let mut ranked: Vec<RankedAlloc> = index
        .costs()
        .map(|(name, cost)| RankedAlloc {
            name: name.to_string(),
            bytes: cost.peak_bytes(use_exclusive),
            count: cost.count,
        })
        .filter(|row| row.bytes > 0)
        .collect();

    ranked.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(top_n);
    ranked
}
