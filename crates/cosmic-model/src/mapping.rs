use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How a column name was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMethod {
    Override,
    DictionaryExact,
    FuzzyMatch,
    NoMatch,
}

/// Audit entry for one input column.
///
/// `method == NoMatch` implies `standard == original`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub original: String,
    pub standard: String,
    pub method: MappingMethod,
    /// Percentage in `0..=100`.
    pub confidence: u8,
    /// Dictionary key behind a fuzzy decision (also kept for rejected candidates).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_key: Option<String>,
}

impl ColumnMapping {
    pub fn is_match(&self) -> bool {
        self.method != MappingMethod::NoMatch
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardizationResult {
    /// Original name to standardized name, in input order.
    pub mapping: IndexMap<String, String>,
    pub log: Vec<ColumnMapping>,
}

impl StandardizationResult {
    pub fn standard_name<'a>(&'a self, original: &'a str) -> &'a str {
        self.mapping
            .get(original)
            .map_or(original, String::as_str)
    }

    pub fn matched_count(&self) -> usize {
        self.log.iter().filter(|entry| entry.is_match()).count()
    }
}
