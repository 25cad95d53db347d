//! Query and peaks commands: ranked allocation listings on the terminal.

use super::models::{PeaksArgs, QueryArgs};
use crate::aggregator::top_by_bytes;
use crate::output::render_allocation_table;
use crate::profile::{AllocationProfile, IndexOptions};
use crate::utils::config::MATCH_ALL_PATTERN;
use anyhow::{Context, Result};
use log::{debug, info};

/// Execute the query command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Profile load or indexing failures
/// * Invalid regex (unless `literal` is set)
pub fn execute_query(args: &QueryArgs) -> Result<()> {
    validate_query_args(args)?;

    let options = IndexOptions::new().with_file_filter(args.file_filter.clone());
    let profile = AllocationProfile::load(&args.input, &options)
        .with_context(|| format!("Failed to load profile {}", args.input.display()))?;

    let pattern = query_pattern(args);

    let matches = profile
        .allocs_by_name(&pattern, args.exclusive)
        .context("Invalid name pattern (use --literal to match it as plain text)")?;
    debug!("{} functions match '{}'", matches.len(), pattern);

    let ranked = top_by_bytes(&matches, args.top_n);

    info!(
        "Top {} {} allocations matching '{}'",
        ranked.len(),
        if args.exclusive { "exclusive" } else { "inclusive" },
        pattern
    );
    println!("{}", render_allocation_table(&ranked, true));

    Ok(())
}

/// Execute the peaks command
///
/// **Public** - main entry point called from main.rs
pub fn execute_peaks(args: &PeaksArgs) -> Result<()> {
    if args.top_n == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    let options = IndexOptions::new().with_file_filter(args.file_filter.clone());
    let profile = AllocationProfile::load(&args.input, &options)
        .with_context(|| format!("Failed to load profile {}", args.input.display()))?;

    let ranked = profile.top_global_peaks(args.exclusive, args.top_n);

    info!("Top {} contributors at global peak", ranked.len());
    println!("{}", render_allocation_table(&ranked, false));

    Ok(())
}

/// Regex actually run for a query: `--literal` escapes it, none matches all
pub fn query_pattern(args: &QueryArgs) -> String {
    match (&args.pattern, args.literal) {
        (Some(p), true) => regex::escape(p),
        (Some(p), false) => p.clone(),
        (None, _) => MATCH_ALL_PATTERN.to_string(),
    }
}

/// Validate query arguments
///
/// **Public** - can be called before execute_query for early validation
pub fn validate_query_args(args: &QueryArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input profile path cannot be empty");
    }

    if args.top_n == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    Ok(())
}
