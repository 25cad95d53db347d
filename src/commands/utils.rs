use crate::profile::{AllocationProfile, IndexOptions};
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a profile JSON file by fully indexing it
pub fn validate_profile_file(file_path: &Path) -> Result<()> {
    println!("Validating profile: {}", file_path.display());

    let profile = AllocationProfile::load(file_path, &IndexOptions::default())
        .with_context(|| format!("Invalid profile {}", file_path.display()))?;

    println!("✓ Valid profile JSON");
    println!("  Sites: {}", profile.symbols().len());
    println!("  Stack records: {}", profile.stacks().len());
    println!("  Indexed stacks: {}", profile.index().stack_count());
    println!("  Functions: {}", profile.index().len());
    println!("  Timeline samples: {}", profile.sample_count());
    println!("  Leaks: {}", profile.leaks().len());

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("MALT Index v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Indexing and query engine for MALT memory allocation profiles.");
}
