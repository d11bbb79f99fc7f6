//! Unit declarations in metadata.

use cosmic_model::QualityCheck;
use indexmap::IndexMap;

use super::Finding;

/// Header keys that declare a unit outright.
pub(crate) const UNIT_KEYS: [&str; 1] = ["BUNIT"];

const DECLARED: f64 = 100.0;
const UNDECLARED: f64 = 70.0;

pub(crate) fn check(metadata: &IndexMap<String, String>) -> Finding {
    let declared = UNIT_KEYS.iter().any(|key| metadata.contains_key(*key))
        || metadata.keys().any(|key| key.to_lowercase().contains("unit"));
    if declared {
        Finding {
            metric: DECLARED,
            check: QualityCheck::pass("All units consistent"),
        }
    } else {
        Finding {
            metric: UNDECLARED,
            check: QualityCheck::warn("Units not explicitly defined"),
        }
    }
}
