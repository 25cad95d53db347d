//! Noise-frame filtering.
//!
//! Allocator shims and C++ runtime plumbing show up in nearly every stack
//! but were not written by the profiled program. Dropping them moves their
//! bytes onto the first caller the program did author.

use crate::parser::SiteInfo;
use crate::utils::config::{IGNORED_FUNCTIONS, INTERNAL_NAMESPACE_PREFIX, INTERNAL_PATH_FRAGMENT};
use std::collections::HashSet;

/// Decides which stack frames are excluded from aggregation
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    ignored: HashSet<String>,
    namespace_prefixes: Vec<String>,
    path_fragments: Vec<String>,

    /// When set, only frames whose source file contains this string survive
    file_filter: Option<String>,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self {
            ignored: IGNORED_FUNCTIONS.iter().map(|s| s.to_string()).collect(),
            namespace_prefixes: vec![INTERNAL_NAMESPACE_PREFIX.to_string()],
            path_fragments: vec![INTERNAL_PATH_FRAGMENT.to_string()],
            file_filter: None,
        }
    }
}

impl NoiseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter that lets every frame through
    pub fn none() -> Self {
        Self {
            ignored: HashSet::new(),
            namespace_prefixes: Vec::new(),
            path_fragments: Vec::new(),
            file_filter: None,
        }
    }

    pub fn with_ignored(mut self, function: impl Into<String>) -> Self {
        self.ignored.insert(function.into());
        self
    }

    pub fn with_namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.namespace_prefixes.push(prefix.into());
        self
    }

    pub fn with_path_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.path_fragments.push(fragment.into());
        self
    }

    pub fn with_file_filter(mut self, file_filter: Option<String>) -> Self {
        self.file_filter = file_filter.filter(|f| !f.is_empty());
        self
    }

    pub fn file_filter(&self) -> Option<&str> {
        self.file_filter.as_deref()
    }

    /// Whether a frame should be skipped
    ///
    /// `name` is the resolved function name (the raw id for unknown sites)
    /// and `site` the symbol entry, if the id was known.
    pub fn is_noise(&self, site_id: &str, name: &str, site: Option<&SiteInfo>) -> bool {
        if self.ignored.contains(name) {
            return true;
        }
        if self.namespace_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
            return true;
        }
        if self.path_fragments.iter().any(|f| site_id.contains(f.as_str())) {
            return true;
        }

        // Unknown sites have no file to judge by
        match (&self.file_filter, site) {
            (Some(filter), Some(info)) => !info.file.contains(filter.as_str()),
            _ => false,
        }
    }
}
