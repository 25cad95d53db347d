//! Configuration and constants for the indexer and CLI.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Allocator entry points instrumented at the allocator boundary itself.
/// They sit at the leaf of every stack and say nothing about who allocated.
pub const IGNORED_FUNCTIONS: &[&str] = &[
    "calloc",
    "malloc",
    "posix_memalign",
    "realloc",
    "operator new(unsigned long)",
];

/// Resolved function names starting with this prefix belong to the C++ runtime
pub const INTERNAL_NAMESPACE_PREFIX: &str = "__gnu_cxx::";

/// Site identifiers containing this fragment point into the C++ runtime
pub const INTERNAL_PATH_FRAGMENT: &str = "/libstdc++/";

// Column names in timeline.memoryTimeline.fields
pub const PHYSICAL_FIELD: &str = "physicalMem";
pub const VIRTUAL_FIELD: &str = "virtualMem";
pub const REQUESTED_FIELD: &str = "requestedMem";

/// Pattern used when the caller does not supply one
pub const MATCH_ALL_PATTERN: &str = ".";

/// Number of rows shown by ranking commands by default
pub const DEFAULT_TOP_N: usize = 10;

/// Width at which function names get shortened in text output
pub const MAX_DISPLAY_NAME: usize = 77;

pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Rendered by stack flattening when a stack id was never indexed
pub const UNKNOWN_STACK: &str = "UNKNOWN";
