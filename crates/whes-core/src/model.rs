// ── Domain model ──
//
// Typed values and row mappings produced by normalization, plus the
// snapshot pair published after each successful poll cycle.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// One normalized metric value.
///
/// The wire format tags each column with a type name; normalization maps
/// tagged values into this enum. Columns with an unrecognized tag (or a
/// value that refuses to coerce) pass through as [`MetricValue::Raw`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Explicit null, also used to pad short rows.
    Null,
    Float(f64),
    Text(String),
    /// Millisecond epoch timestamp.
    Timestamp(i64),
    /// Untyped passthrough.
    Raw(serde_json::Value),
}

impl MetricValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Float view of the value: numbers directly, numeric strings after
    /// trimming. Used by the sign-flip transform and display rounding.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Timestamp(t) => Some(*t as f64),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Raw(value) => match value {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            },
            Self::Null => None,
        }
    }

    /// Text view without JSON quoting (used for table output).
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Raw(serde_json::Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Timestamp(t) => write!(f, "{t}"),
            Self::Raw(value) => write!(f, "{value}"),
        }
    }
}

/// One normalized metrics row: deduplicated column name to value, in
/// wire column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricRow(IndexMap<String, MetricValue>);

impl MetricRow {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Insert a value; an existing key is replaced in place.
    pub fn insert(&mut self, key: String, value: MetricValue) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, MetricValue> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl<'a> IntoIterator for &'a MetricRow {
    type Item = (&'a String, &'a MetricValue);
    type IntoIter = indexmap::map::Iter<'a, String, MetricValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, MetricValue)> for MetricRow {
    fn from_iter<I: IntoIterator<Item = (String, MetricValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Which metric series a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Ems,
    Ammeter,
}

impl Section {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ems => "EMS",
            Self::Ammeter => "Ammeter",
        }
    }
}

/// Latest row pair from one successful poll cycle.
///
/// Either side may be empty when the cloud returned no rows for its
/// window; the snapshot is still published so observers see the cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub ems: MetricRow,
    pub ammeter: MetricRow,
}

impl Snapshot {
    /// `true` before the first successful cycle or when both series
    /// came back empty.
    pub fn is_empty(&self) -> bool {
        self.ems.is_empty() && self.ammeter.is_empty()
    }

    pub fn section(&self, section: Section) -> &MetricRow {
        match section {
            Section::Ems => &self.ems,
            Section::Ammeter => &self.ammeter,
        }
    }

    /// Value under `key`, or `None` when the column is absent.
    pub fn value(&self, section: Section, key: &str) -> Option<&MetricValue> {
        self.section(section).get(key)
    }

    /// Presentation rule: a reading is available only when the column
    /// is present and non-null.
    pub fn reading(&self, section: Section, key: &str) -> Option<&MetricValue> {
        self.value(section, key).filter(|v| !v.is_null())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn row_preserves_insertion_order() {
        let mut row = MetricRow::new();
        row.insert("b".to_owned(), MetricValue::Float(1.0));
        row.insert("a".to_owned(), MetricValue::Float(2.0));
        let keys: Vec<_> = row.keys().cloned().collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut row = MetricRow::new();
        row.insert("a".to_owned(), MetricValue::Float(1.0));
        row.insert("b".to_owned(), MetricValue::Float(2.0));
        row.insert("a".to_owned(), MetricValue::Float(-1.0));
        let keys: Vec<_> = row.keys().cloned().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(row.get("a"), Some(&MetricValue::Float(-1.0)));
    }

    #[test]
    fn as_f64_reads_numbers_and_numeric_strings() {
        assert_eq!(MetricValue::Float(3.5).as_f64(), Some(3.5));
        assert_eq!(MetricValue::Text(" 42 ".to_owned()).as_f64(), Some(42.0));
        assert_eq!(MetricValue::Raw(json!("7.5")).as_f64(), Some(7.5));
        assert_eq!(MetricValue::Raw(json!(2)).as_f64(), Some(2.0));
        assert_eq!(MetricValue::Text("n/a".to_owned()).as_f64(), None);
        assert_eq!(MetricValue::Null.as_f64(), None);
    }

    #[test]
    fn untagged_serialization_is_flat() {
        let mut row = MetricRow::new();
        row.insert("soc".to_owned(), MetricValue::Float(55.5));
        row.insert("state".to_owned(), MetricValue::Text("ready".to_owned()));
        row.insert("ts".to_owned(), MetricValue::Timestamp(1_700_000_000_000));
        row.insert("gap".to_owned(), MetricValue::Null);
        let rendered = serde_json::to_value(&row).unwrap();
        assert_eq!(
            rendered,
            json!({"soc": 55.5, "state": "ready", "ts": 1_700_000_000_000_i64, "gap": null})
        );
    }

    #[test]
    fn reading_filters_null_and_absent() {
        let snapshot = Snapshot {
            ems: [
                ("ems_soc".to_owned(), MetricValue::Float(80.0)),
                ("ems_soh".to_owned(), MetricValue::Null),
            ]
            .into_iter()
            .collect(),
            ammeter: MetricRow::new(),
        };
        assert!(snapshot.reading(Section::Ems, "ems_soc").is_some());
        assert!(snapshot.reading(Section::Ems, "ems_soh").is_none());
        assert!(snapshot.reading(Section::Ems, "missing").is_none());
        assert!(snapshot.value(Section::Ems, "ems_soh").is_some());
    }
}
