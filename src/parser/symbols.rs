//! Call-site symbol table built from `sites.instr`.
//!
//! Maps each instrumented site identifier to its function, file and line.
//! A secondary alias keyed by function name points at the *last* site seen
//! with that name, in document order. Callers needing every site of a
//! function use [`SymbolTable::sites_for_function`].

use super::names::NamePool;
use crate::utils::error::ProfileError;
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Resolved location of one call site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteInfo {
    pub function: String,

    /// Source file, empty when the profiler did not record one
    pub file: String,

    /// Source line, `-1` when the profiler did not record one
    pub line: i64,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    sites: HashMap<String, SiteInfo>,
    aliases: HashMap<String, SiteInfo>,
    by_function: HashMap<String, Vec<String>>,
}

impl SymbolTable {
    /// Build the table from the `sites.instr` node
    ///
    /// # Errors
    /// * `ProfileError::MalformedDocument` - a site lacks its function index,
    ///   or an index/line is not an integer
    /// * `ProfileError::OutOfRange` - an index points outside the name pool
    pub fn build(instr: &Value, pool: &NamePool) -> Result<Self, ProfileError> {
        let entries = instr
            .as_object()
            .ok_or_else(|| ProfileError::malformed("sites.instr must be an object"))?;

        let mut table = SymbolTable::default();

        for (site_id, entry) in entries {
            let function_idx = entry
                .get("function")
                .ok_or_else(|| {
                    ProfileError::malformed(format!("site {} has no function index", site_id))
                })
                .and_then(|v| integer_field(v, site_id, "function"))?;
            let function = pool.resolve(function_idx)?.to_string();

            let file = match entry.get("file") {
                Some(v) => pool.resolve(integer_field(v, site_id, "file")?)?.to_string(),
                None => String::new(),
            };

            let line = match entry.get("line") {
                Some(v) => integer_field(v, site_id, "line")?,
                None => -1,
            };

            table.insert(
                site_id.clone(),
                SiteInfo {
                    function,
                    file,
                    line,
                },
            );
        }

        debug!(
            "Symbol table: {} sites, {} distinct functions",
            table.sites.len(),
            table.by_function.len()
        );

        Ok(table)
    }

    /// Record a site; the function alias is overwritten (last wins)
    pub fn insert(&mut self, site_id: String, info: SiteInfo) {
        self.by_function
            .entry(info.function.clone())
            .or_default()
            .push(site_id.clone());
        self.aliases.insert(info.function.clone(), info.clone());
        self.sites.insert(site_id, info);
    }

    pub fn site(&self, site_id: &str) -> Option<&SiteInfo> {
        self.sites.get(site_id)
    }

    /// Site info of the last site recorded under `function`
    pub fn by_function(&self, function: &str) -> Option<&SiteInfo> {
        self.aliases.get(function)
    }

    /// Every site id sharing `function`, in document order
    pub fn sites_for_function(&self, function: &str) -> &[String] {
        self.by_function
            .get(function)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a site id, falling back to the function-name alias
    pub fn lookup(&self, key: &str) -> Option<&SiteInfo> {
        self.site(key).or_else(|| self.by_function(key))
    }

    /// Function name for a site id; unknown ids stand in for themselves
    pub fn resolve_name<'a>(&'a self, site_id: &'a str) -> &'a str {
        match self.sites.get(site_id) {
            Some(info) => &info.function,
            None => {
                debug!("Unknown site {}, using raw identifier", site_id);
                site_id
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// Read an integer-valued site field
///
/// **Private** - internal helper for build
fn integer_field(value: &Value, site_id: &str, field: &str) -> Result<i64, ProfileError> {
    value.as_i64().ok_or_else(|| {
        ProfileError::malformed(format!(
            "site {} has non-integer {}: {}",
            site_id, field, value
        ))
    })
}
