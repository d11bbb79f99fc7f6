//! Column standardizer: overrides, dictionary lookup, then fuzzy matching.

use cosmic_model::{ColumnMapping, MappingMethod, StandardizationResult, StandardizerOptions};
use indexmap::IndexMap;

use crate::dictionary::{canonical_field, lookup_keys};
use crate::score::{percent, token_sort_similarity};

/// Maps arbitrary column names onto canonical fields.
///
/// The outcome for a column depends only on its name, the overrides and the
/// threshold; standardizing never fails.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStandardizer {
    threshold: u8,
    /// Override keys lowercased; a later key wins over an earlier one that
    /// differs only in case.
    overrides: IndexMap<String, String>,
}

impl Default for ColumnStandardizer {
    fn default() -> Self {
        Self::new(&StandardizerOptions::default())
    }
}

/// Best dictionary candidate for a fuzzy lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    key: &'static str,
    field: &'static str,
    similarity: f64,
}

impl ColumnStandardizer {
    pub fn new(options: &StandardizerOptions) -> Self {
        let overrides = options
            .overrides
            .iter()
            .map(|(original, standard)| (original.trim().to_lowercase(), standard.clone()))
            .collect();
        Self {
            threshold: options.threshold.min(100),
            overrides,
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Standardize columns in order. Later duplicates overwrite earlier
    /// entries of `mapping`; the log keeps one entry per input column.
    pub fn standardize<S: AsRef<str>>(&self, columns: &[S]) -> StandardizationResult {
        let mut result = StandardizationResult::default();
        for column in columns {
            let entry = self.map_column(column.as_ref());
            result
                .mapping
                .insert(entry.original.clone(), entry.standard.clone());
            result.log.push(entry);
        }
        tracing::debug!(
            columns = columns.len(),
            matched = result.matched_count(),
            "standardized columns"
        );
        result
    }

    /// Resolve a single column name.
    pub fn map_column(&self, column: &str) -> ColumnMapping {
        let key = column.trim().to_lowercase();

        if let Some(standard) = self.overrides.get(&key) {
            return entry(column, standard, MappingMethod::Override, 100, None);
        }
        if let Some(field) = canonical_field(&key) {
            return entry(column, field, MappingMethod::DictionaryExact, 100, None);
        }

        let Some(best) = best_candidate(&key) else {
            return entry(column, column, MappingMethod::NoMatch, 0, None);
        };
        let score = percent(best.similarity);
        if score >= self.threshold {
            tracing::trace!(column, key = best.key, score, "fuzzy match");
            entry(column, best.field, MappingMethod::FuzzyMatch, score, Some(best.key))
        } else {
            entry(column, column, MappingMethod::NoMatch, score, Some(best.key))
        }
    }
}

/// Highest-scoring key; the earliest key wins a tie.
fn best_candidate(key: &str) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for (candidate, field) in lookup_keys() {
        let similarity = token_sort_similarity(key, candidate);
        if best.is_none_or(|current| similarity > current.similarity) {
            best = Some(Candidate {
                key: candidate,
                field,
                similarity,
            });
        }
    }
    best
}

fn entry(
    original: &str,
    standard: &str,
    method: MappingMethod,
    confidence: u8,
    matched_key: Option<&str>,
) -> ColumnMapping {
    ColumnMapping {
        original: original.to_string(),
        standard: standard.to_string(),
        method,
        confidence,
        matched_key: matched_key.map(str::to_string),
    }
}
