//! Output formatting: snapshot tables, JSON, YAML.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`
//! over the measurement catalog, structured formats use serde.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use whes_core::points::{self, MeasurementPoint, Unit};
use whes_core::{MetricValue, Section, Snapshot};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a snapshot in the chosen format.
///
/// - `table`: one table per section, rows from the measurement catalog
/// - `json` / `yaml`: serializes the snapshot via serde
pub fn render_snapshot(format: OutputFormat, snapshot: &Snapshot, color: bool) -> String {
    match format {
        OutputFormat::Table => snapshot_tables(snapshot, color),
        OutputFormat::Json => render_json_pretty(snapshot),
        OutputFormat::Yaml => render_yaml(snapshot),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Table rendering ──────────────────────────────────────────────────

#[derive(Tabled)]
struct PointRow {
    #[tabled(rename = "Measurement")]
    label: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Key")]
    key: &'static str,
}

fn snapshot_tables(snapshot: &Snapshot, color: bool) -> String {
    let mut sections = Vec::new();
    for section in [Section::Ems, Section::Ammeter] {
        let rows: Vec<PointRow> = points::section_points(section)
            .map(|point| PointRow {
                label: point.label,
                value: format_reading(point, snapshot.reading(section, point.key)),
                key: point.key,
            })
            .collect();

        let heading = if color {
            section.label().bold().cyan().to_string()
        } else {
            section.label().to_string()
        };
        sections.push(format!("{heading}\n{}", render_table(&rows)));
    }
    sections.join("\n\n")
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// One table cell: rounded number with unit, plain text, or
/// "unavailable" when the reading is absent or null.
fn format_reading(point: &MeasurementPoint, reading: Option<&MetricValue>) -> String {
    let Some(value) = reading else {
        return "unavailable".into();
    };
    match value.as_f64() {
        Some(v) if point.unit == Unit::None => {
            format!("{v:.prec$}", prec = point.display_decimals())
        }
        Some(v) => format!(
            "{v:.prec$} {}",
            point.unit.symbol(),
            prec = point.display_decimals()
        ),
        None => value.to_string(),
    }
}

// ── Format-specific renderers ────────────────────────────────────────

/// Pretty-printed JSON.
pub fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

/// YAML output.
pub fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).expect("serialization should not fail")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            ems: [
                ("ems_soc".to_owned(), MetricValue::Float(55.55)),
                ("ems_ac_frequency".to_owned(), MetricValue::Float(49.987)),
                ("ems_soh".to_owned(), MetricValue::Null),
            ]
            .into_iter()
            .collect(),
            ammeter: [("ac_active_power".to_owned(), MetricValue::Float(-1200.0))]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn floats_round_per_point() {
        let soc = points::find("ems_soc").unwrap();
        let freq = points::find("ems_ac_frequency").unwrap();
        assert_eq!(
            format_reading(soc, Some(&MetricValue::Float(55.55))),
            "55.5 %"
        );
        assert_eq!(
            format_reading(freq, Some(&MetricValue::Float(49.987))),
            "49.99 Hz"
        );
    }

    #[test]
    fn absent_and_null_readings_render_unavailable() {
        let soc = points::find("ems_soc").unwrap();
        assert_eq!(format_reading(soc, None), "unavailable");
    }

    #[test]
    fn non_numeric_values_pass_through() {
        let state = points::find("ems_state").unwrap();
        assert_eq!(
            format_reading(state, Some(&MetricValue::Text("ready".into()))),
            "ready"
        );
    }

    #[test]
    fn tables_cover_both_sections() {
        let rendered = snapshot_tables(&snapshot(), false);
        assert!(rendered.contains("EMS"));
        assert!(rendered.contains("Ammeter"));
        assert!(rendered.contains("55.5 %"));
        assert!(rendered.contains("-1200.0 W"));
        // Null SOH and never-polled points show as unavailable.
        assert!(rendered.contains("unavailable"));
    }

    #[test]
    fn json_rendering_is_flat() {
        let rendered = render_snapshot(OutputFormat::Json, &snapshot(), false);
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["ems"]["ems_soc"], 55.55);
        assert_eq!(value["ammeter"]["ac_active_power"], -1200.0);
    }

    #[test]
    fn empty_snapshot_still_renders_sections() {
        let rendered = snapshot_tables(&Snapshot::default(), false);
        assert!(rendered.contains("EMS"));
        assert!(rendered.contains("Ammeter"));
    }
}
