//! Column-name standardization.
//!
//! Maps free-form column names such as `RA_J2000` or `FluX_Val` onto a fixed
//! set of canonical fields (`position_ra`, `brightness`, ...). Resolution order
//! per column, first match wins:
//!
//! 1. caller overrides (case-insensitive)
//! 2. exact dictionary lookup (case-insensitive)
//! 3. token-sort similarity against every dictionary key, accepted at or
//!    above the threshold
//!
//! Unmatched columns keep their name and record the best rejected score.

mod dictionary;
mod score;
mod standardizer;

pub use dictionary::{SYNONYMS, canonical_field, canonical_fields, lookup_keys};
pub use score::{token_sort_key, token_sort_ratio, token_sort_similarity};
pub use standardizer::ColumnStandardizer;
