// Wire types for the pangu metrics endpoints.

use serde::{Deserialize, Serialize};

/// Request body for a metrics query.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRequest {
    /// Window start, milliseconds since epoch.
    pub start: i64,
    /// Window end, milliseconds since epoch.
    pub end: i64,
    /// Sampling bucket, e.g. `"10s"`.
    pub sample_by: String,
    /// Metric columns to fetch.
    pub columns: Vec<String>,
}

/// Columnar payload of a metrics response.
///
/// `columns` may contain duplicate names; `metadata` carries one type tag
/// per column position. Every field tolerates absence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsData {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    pub metadata: Vec<String>,
}

/// Response envelope. `data` may be absent or null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsResponse {
    #[serde(default)]
    pub data: Option<MetricsData>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_flat() {
        let request = MetricsRequest {
            start: 1,
            end: 2,
            sample_by: "10s".to_owned(),
            columns: vec!["ems_soc".to_owned()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "start": 1,
                "end": 2,
                "sample_by": "10s",
                "columns": ["ems_soc"],
            })
        );
    }

    #[test]
    fn envelope_tolerates_missing_and_null_data() {
        let missing: MetricsResponse = serde_json::from_str("{}").unwrap();
        assert!(missing.data.is_none());

        let null: MetricsResponse = serde_json::from_str(r#"{"data": null}"#).unwrap();
        assert!(null.data.is_none());
    }

    #[test]
    fn payload_fields_default_when_absent() {
        let resp: MetricsResponse = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        let data = resp.data.unwrap();
        assert!(data.columns.is_empty());
        assert!(data.rows.is_empty());
        assert!(data.metadata.is_empty());
    }

    #[test]
    fn full_payload_round_trips() {
        let resp: MetricsResponse = serde_json::from_str(
            r#"{"data": {"columns": ["a", "b"], "rows": [[1, "x"]], "metadata": ["DOUBLE", "VARCHAR"]}}"#,
        )
        .unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data.columns, vec!["a", "b"]);
        assert_eq!(data.rows.len(), 1);
        assert_eq!(data.metadata, vec!["DOUBLE", "VARCHAR"]);
    }
}
