/// Cell spellings treated as null before any numeric parsing.
pub const MISSING_SENTINELS: [&str; 5] = ["NaN", "nan", "", "None", "null"];

/// Whether a raw text cell denotes a missing value.
pub fn is_missing_sentinel(cell: &str) -> bool {
    MISSING_SENTINELS.contains(&cell.trim())
}
