//! Interned string pool (`sites.strings`).
//!
//! Every other section of the profile refers to names by their position in
//! this pool.

use crate::utils::error::ProfileError;
use serde_json::Value;

/// Ordered pool of interned strings
#[derive(Debug, Clone, Default)]
pub struct NamePool {
    strings: Vec<String>,
}

impl NamePool {
    pub fn new(strings: Vec<String>) -> Self {
        Self { strings }
    }

    /// Build the pool from the `sites.strings` node
    ///
    /// # Errors
    /// * `ProfileError::MalformedDocument` - node is not an array of strings
    pub fn from_value(node: &Value) -> Result<Self, ProfileError> {
        let entries = node
            .as_array()
            .ok_or_else(|| ProfileError::malformed("sites.strings must be an array"))?;

        let strings = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                entry.as_str().map(str::to_owned).ok_or_else(|| {
                    ProfileError::malformed(format!("sites.strings[{}] is not a string", i))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { strings })
    }

    /// Resolve an interned index
    ///
    /// An index outside the pool means the profile is corrupt; callers treat
    /// the error as fatal.
    pub fn resolve(&self, index: i64) -> Result<&str, ProfileError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .map(String::as_str)
            .ok_or(ProfileError::OutOfRange {
                index,
                len: self.strings.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
