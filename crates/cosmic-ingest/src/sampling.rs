//! Even sampling of dense numeric grids.

use cosmic_model::Record;

/// Equally spaced indices into `0..n`, at most `limit` of them.
///
/// Every index is returned when `n <= limit`; otherwise index `i` is
/// `floor(i * (n - 1) / (limit - 1))`, so the first and last elements are
/// always included.
pub fn even_indices(n: usize, limit: usize) -> Vec<usize> {
    if n <= limit {
        return (0..n).collect();
    }
    match limit {
        0 => Vec::new(),
        1 => vec![0],
        m => (0..m).map(|i| i * (n - 1) / (m - 1)).collect(),
    }
}

/// Shape rendered as a tuple: `(3, 4)`, `(5,)`, `()`.
pub fn shape_text(dims: &[usize]) -> String {
    match dims {
        [] => "()".to_string(),
        [single] => format!("({single},)"),
        _ => {
            let parts: Vec<String> = dims.iter().map(usize::to_string).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// Preview records for a flattened grid.
///
/// With a `width`, flat index `k` maps to row `k / width` and column
/// `k % width`; without one every sample sits on row 0 at column `k`.
/// Not-a-number pixels are reported as `0.0`.
pub(crate) fn grid_preview(values: &[f64], width: Option<usize>, limit: usize) -> Vec<Record> {
    even_indices(values.len(), limit)
        .into_iter()
        .enumerate()
        .map(|(i, flat)| {
            let (row, col) = match width {
                Some(width) if width > 0 => (flat / width, flat % width),
                _ => (0, flat),
            };
            let value = values[flat];
            let value = if value.is_nan() { 0.0 } else { value };
            Record::new(i as u64, col as f64, row as f64, value)
        })
        .collect()
}
