//! Canonical preview record.
//!
//! Every format parser emits the same row shape: a stable `id`, the three
//! display projections `x`, `y` and `value`, and the untouched numeric source
//! fields. Later stages reference rows only through `id`.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Field names owned by the record projection.
///
/// When a source column carries one of these names the projected value is
/// what gets serialized.
pub const PROJECTED_FIELDS: [&str; 4] = ["id", "x", "y", "value"];

/// Label attached to a record once anomaly detection has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Anomaly,
    Valid,
}

/// One preview row.
///
/// Projection fields use `f64::NAN` for null; they serialize as JSON `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub value: f64,
    /// Numeric source fields in source column order.
    pub raw_fields: IndexMap<String, Option<f64>>,
    pub status: Option<RecordStatus>,
}

impl Record {
    pub fn new(id: u64, x: f64, y: f64, value: f64) -> Self {
        Self {
            id,
            x,
            y,
            value,
            raw_fields: IndexMap::new(),
            status: None,
        }
    }

    /// Add a source field, keeping insertion order.
    pub fn with_field(mut self, name: impl Into<String>, value: Option<f64>) -> Self {
        self.raw_fields.insert(name.into(), value);
        self
    }

    /// Look up a field by name.
    ///
    /// Projection names resolve to the projection; everything else resolves to
    /// the raw field. Non-finite values are reported as missing.
    pub fn field(&self, name: &str) -> Option<f64> {
        match name {
            "id" => Some(self.id as f64),
            "x" => finite(self.x),
            "y" => finite(self.y),
            "value" => finite(self.value),
            _ => self.raw_fields.get(name).copied().flatten().and_then(finite),
        }
    }

    /// Copy of this record with raw field names passed through `mapping`.
    ///
    /// When two source fields land on the same name the later one overwrites
    /// the earlier value while keeping the earlier position.
    pub fn renamed(&self, mapping: &IndexMap<String, String>) -> Self {
        let mut raw_fields = IndexMap::with_capacity(self.raw_fields.len());
        for (name, value) in &self.raw_fields {
            let target = mapping.get(name).unwrap_or(name);
            raw_fields.insert(target.clone(), *value);
        }
        Self {
            raw_fields,
            ..self.clone()
        }
    }
}

pub(crate) fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in &self.raw_fields {
            if PROJECTED_FIELDS.contains(&name.as_str()) || name == "status" {
                continue;
            }
            map.serialize_entry(name, &value.and_then(finite))?;
        }
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("x", &finite(self.x))?;
        map.serialize_entry("y", &finite(self.y))?;
        map.serialize_entry("value", &finite(self.value))?;
        if let Some(status) = self.status {
            map.serialize_entry("status", &status)?;
        }
        map.end()
    }
}
