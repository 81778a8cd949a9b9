// ── Columnar payload normalization ──
//
// The cloud answers with parallel arrays: `columns` names the fields,
// `metadata` carries one type tag per column, `rows` holds the values.
// This module turns each row into a `MetricRow`, deduplicating repeated
// column names and coercing values according to their tag.

use std::collections::HashMap;

use serde_json::Value;

use crate::model::{MetricRow, MetricValue};
use whes_api::wire::{MetricsData, MetricsResponse};

/// Ammeter columns negated to make grid import positive.
const SIGN_FLIP_COLUMNS: [&str; 4] = [
    "ac_active_power",
    "ac_active_powers_0",
    "ac_active_powers_1",
    "ac_active_powers_2",
];

/// Per-column coercion, resolved once from the metadata type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coercion {
    Double,
    Varchar,
    Timestamp,
    Identity,
}

impl Coercion {
    fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "DOUBLE" => Self::Double,
            "VARCHAR" => Self::Varchar,
            "TIMESTAMP" => Self::Timestamp,
            _ => Self::Identity,
        }
    }

    /// Coerce one raw value. Nulls stay null; a value that refuses to
    /// coerce keeps its raw form.
    fn apply(self, value: Value) -> MetricValue {
        if value.is_null() {
            return MetricValue::Null;
        }
        match self {
            Self::Double => coerce_float(value),
            Self::Varchar => coerce_text(value),
            Self::Timestamp => coerce_timestamp(value),
            Self::Identity => MetricValue::Raw(value),
        }
    }
}

fn coerce_float(value: Value) -> MetricValue {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) => MetricValue::Float(v),
            None => MetricValue::Raw(Value::Number(n)),
        },
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) => MetricValue::Float(v),
            Err(_) => MetricValue::Raw(Value::String(s)),
        },
        other => MetricValue::Raw(other),
    }
}

fn coerce_text(value: Value) -> MetricValue {
    match value {
        Value::String(s) => MetricValue::Text(s),
        other => MetricValue::Text(other.to_string()),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn coerce_timestamp(value: Value) -> MetricValue {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                MetricValue::Timestamp(v)
            } else if let Some(v) = n.as_f64() {
                // fractional epochs truncate toward zero
                MetricValue::Timestamp(v as i64)
            } else {
                MetricValue::Raw(Value::Number(n))
            }
        }
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(v) => MetricValue::Timestamp(v),
            Err(_) => MetricValue::Raw(Value::String(s)),
        },
        other => MetricValue::Raw(other),
    }
}

/// Disambiguate repeated column names: the first occurrence keeps the
/// name, the n-th duplicate becomes `name_n`.
fn dedupe_columns(columns: &[String]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    columns
        .iter()
        .map(|name| {
            let n = {
                let count = seen.entry(name.as_str()).or_insert(0);
                *count += 1;
                *count
            };
            if n > 1 {
                format!("{name}_{n}")
            } else {
                name.clone()
            }
        })
        .collect()
}

/// Convert a wire response into one normalized row per input row.
///
/// A missing `data` object, empty `columns`, or empty `rows` all yield
/// no rows. When `metadata` does not line up with `columns` one-to-one,
/// typing is dropped for the whole response and values pass through raw.
/// Rows shorter than the column list are padded with nulls; values
/// beyond the column list are ignored.
pub fn normalize(response: MetricsResponse) -> Vec<MetricRow> {
    match response.data {
        Some(data) => normalize_data(data),
        None => Vec::new(),
    }
}

fn normalize_data(data: MetricsData) -> Vec<MetricRow> {
    if data.columns.is_empty() || data.rows.is_empty() {
        return Vec::new();
    }

    let columns = dedupe_columns(&data.columns);
    let coercions: Vec<Coercion> = if data.metadata.len() == columns.len() {
        data.metadata
            .iter()
            .map(|tag| Coercion::from_tag(tag))
            .collect()
    } else {
        vec![Coercion::Identity; columns.len()]
    };

    data.rows
        .into_iter()
        .map(|row| normalize_row(&columns, &coercions, row))
        .collect()
}

fn normalize_row(columns: &[String], coercions: &[Coercion], row: Vec<Value>) -> MetricRow {
    let mut normalized = MetricRow::new();
    let mut values = row.into_iter();
    for (name, coercion) in columns.iter().zip(coercions) {
        let value = match values.next() {
            Some(raw) => coercion.apply(raw),
            None => MetricValue::Null,
        };
        normalized.insert(name.clone(), value);
    }
    normalized
}

/// Negate the grid active-power fields of an ammeter row so that import
/// from the grid reads positive. Fields that are absent, null, or not
/// float-interpretable stay untouched.
pub fn flip_power_signs(row: &mut MetricRow) {
    for key in SIGN_FLIP_COLUMNS {
        let Some(value) = row.get(key) else { continue };
        if let Some(v) = value.as_f64() {
            row.insert(key.to_owned(), MetricValue::Float(-v));
        }
    }
}
