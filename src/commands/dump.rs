//! File-producing commands: timeline, dump and report.

use super::models::{DumpArgs, ReportArgs, TimelineArgs};
use crate::output::{
    build_report, write_global_peak_file, write_leaks_file, write_report, write_timeline_csv,
    write_timeline_file,
};
use crate::profile::{AllocationProfile, IndexOptions};
use anyhow::{Context, Result};
use log::info;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Execute the timeline command
///
/// Writes the annotated timeline as CSV to `args.output`, or to stdout.
pub fn execute_timeline(args: &TimelineArgs) -> Result<()> {
    let profile = load(&args.input, &args.index_options())?;

    match &args.output {
        Some(path) => write_timeline_file(&profile, path)
            .with_context(|| format!("Failed to write timeline to {}", path.display()))?,
        None => write_timeline_csv(&profile, stdout().lock())
            .context("Failed to write timeline to stdout")?,
    }

    Ok(())
}

/// Execute the dump command
///
/// Writes `<base>_timeline.csv`, `<base>_globalPeak.csv` and
/// `<base>_leaks.csv` next to the input file and returns their paths.
pub fn execute_dump(args: &DumpArgs) -> Result<Vec<PathBuf>> {
    let start_time = Instant::now();

    let options = IndexOptions::new().with_file_filter(args.file_filter.clone());
    let profile = load(&args.input, &options)?;

    let timeline = sibling_path(&args.input, "timeline");
    let peaks = sibling_path(&args.input, "globalPeak");
    let leaks = sibling_path(&args.input, "leaks");

    info!("Step 1/3: Writing timeline...");
    write_timeline_file(&profile, &timeline).context("Failed to write timeline CSV")?;

    info!("Step 2/3: Writing global peak stacks...");
    write_global_peak_file(&profile, &peaks).context("Failed to write global peak CSV")?;

    info!("Step 3/3: Writing leaks...");
    write_leaks_file(&profile, &leaks).context("Failed to write leaks CSV")?;

    info!("Dump completed in {:.2}s", start_time.elapsed().as_secs_f64());

    Ok(vec![timeline, peaks, leaks])
}

/// Execute the report command
pub fn execute_report(args: &ReportArgs) -> Result<()> {
    if args.top_n == 0 {
        anyhow::bail!("top must be greater than 0");
    }

    let profile = load(&args.input, &IndexOptions::default())?;
    let report = build_report(&profile, &args.input.display().to_string(), args.top_n);

    write_report(&report, &args.output).context("Failed to write report JSON")?;
    info!("✓ Report written to: {}", args.output.display());

    Ok(())
}

/// **Private** - load with a path-bearing error context
fn load(input: &Path, options: &IndexOptions) -> Result<AllocationProfile> {
    AllocationProfile::load(input, options)
        .with_context(|| format!("Failed to load profile {}", input.display()))
}

/// `dir/run.json` + `leaks` -> `dir/run_leaks.csv`
pub fn sibling_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "profile".to_string());
    input.with_file_name(format!("{}_{}.csv", stem, suffix))
}
