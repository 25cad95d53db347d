//! MALT Index CLI
//!
//! Query function-level allocation totals, global-peak contributors and the
//! annotated memory timeline of a MALT JSON profile.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use malt_index::commands::{
    display_version, execute_dump, execute_peaks, execute_query, execute_report,
    execute_timeline, validate_profile_file, DumpArgs, PeaksArgs, QueryArgs, ReportArgs,
    TimelineArgs,
};
use malt_index::utils::config::DEFAULT_TOP_N;

/// MALT Index - allocation profile queries
#[derive(Parser, Debug)]
#[command(name = "malt-index")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// List the largest allocators whose name matches a pattern
    Query {
        /// Path to MALT JSON profile
        file: PathBuf,

        /// Case-insensitive regex for function names
        #[arg(short, long)]
        name: Option<String>,

        /// Report exclusive instead of inclusive allocations
        #[arg(short, long)]
        exclusive: bool,

        /// Only keep frames from files whose path contains this string
        #[arg(short, long)]
        filter: Option<String>,

        /// Number of rows to print
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,

        /// Match the name as plain text instead of a regex
        #[arg(long)]
        literal: bool,
    },

    /// List the largest contributors at the global memory peak
    Peaks {
        /// Path to MALT JSON profile
        file: PathBuf,

        /// Rank by exclusive peak sums
        #[arg(short, long)]
        exclusive: bool,

        /// Only keep frames from files whose path contains this string
        #[arg(short, long)]
        filter: Option<String>,

        /// Number of rows to print
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },

    /// Write the annotated memory timeline as CSV
    Timeline {
        /// Path to MALT JSON profile
        file: PathBuf,

        /// Output CSV path (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Timestamp by source row so skipped rows leave gaps
        #[arg(long)]
        source_row_time: bool,
    },

    /// Write timeline, global peak and leak CSVs next to the profile
    Dump {
        /// Path to MALT JSON profile
        file: PathBuf,

        /// Only keep frames from files whose path contains this string
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Write a JSON report of the top allocators
    Report {
        /// Path to MALT JSON profile
        file: PathBuf,

        /// Output path for JSON report
        #[arg(short, long, default_value = "malt-report.json")]
        output: PathBuf,

        /// Number of rows per ranking
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
    },

    /// Validate a profile JSON file
    Validate {
        /// Path to MALT JSON profile
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Query {
            file,
            name,
            exclusive,
            filter,
            top,
            literal,
        } => {
            execute_query(&QueryArgs {
                input: file,
                pattern: name,
                exclusive,
                file_filter: filter,
                top_n: top,
                literal,
            })?;
        }

        Commands::Peaks {
            file,
            exclusive,
            filter,
            top,
        } => {
            execute_peaks(&PeaksArgs {
                input: file,
                exclusive,
                file_filter: filter,
                top_n: top,
            })?;
        }

        Commands::Timeline {
            file,
            output,
            source_row_time,
        } => {
            execute_timeline(&TimelineArgs {
                input: file,
                output,
                source_row_time,
            })?;
        }

        Commands::Dump { file, filter } => {
            let written = execute_dump(&DumpArgs {
                input: file,
                file_filter: filter,
            })?;
            for path in written {
                println!("✓ {}", path.display());
            }
        }

        Commands::Report { file, output, top } => {
            execute_report(&ReportArgs {
                input: file,
                output,
                top_n: top,
            })?;
        }

        Commands::Validate { file } => {
            validate_profile_file(&file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
