// ── Measurement point catalog ──
//
// The fixed set of points the cloud exposes for one installation. The
// polled keys of a section become the `columns` of its metrics request;
// the labels and units drive presentation.

use serde::Serialize;

use crate::model::Section;

/// Unit of a measurement point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Percent,
    Kilowatt,
    Watt,
    Hertz,
    KilowattHour,
    None,
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Percent => "%",
            Self::Kilowatt => "kW",
            Self::Watt => "W",
            Self::Hertz => "Hz",
            Self::KilowattHour => "kWh",
            Self::None => "",
        }
    }
}

/// What a point measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    Battery,
    Power,
    Energy,
    Frequency,
    State,
}

/// One known measurement point.
#[derive(Debug, Clone, Copy)]
pub struct MeasurementPoint {
    /// Wire column name, also the snapshot key.
    pub key: &'static str,
    pub section: Section,
    pub label: &'static str,
    pub unit: Unit,
    pub kind: PointKind,
    /// Monotonically increasing lifetime counter.
    pub cumulative: bool,
    /// Whether the key is requested from the cloud. `ems_state` is
    /// catalog-only; the feed never returns it.
    pub polled: bool,
}

impl MeasurementPoint {
    /// Decimal places for float display (frequency gets an extra one).
    pub fn display_decimals(&self) -> usize {
        if self.kind == PointKind::Frequency { 2 } else { 1 }
    }
}

pub const POINTS: &[MeasurementPoint] = &[
    MeasurementPoint {
        key: "ems_soc",
        section: Section::Ems,
        label: "EMS State of Charge",
        unit: Unit::Percent,
        kind: PointKind::Battery,
        cumulative: false,
        polled: true,
    },
    MeasurementPoint {
        key: "ems_soh",
        section: Section::Ems,
        label: "EMS State of Health",
        unit: Unit::Percent,
        kind: PointKind::Battery,
        cumulative: false,
        polled: true,
    },
    MeasurementPoint {
        key: "ems_state",
        section: Section::Ems,
        label: "EMS Operating State",
        unit: Unit::None,
        kind: PointKind::State,
        cumulative: false,
        polled: false,
    },
    MeasurementPoint {
        key: "ems_dc_power_neg",
        section: Section::Ems,
        label: "Battery Charge (DC -)",
        unit: Unit::Kilowatt,
        kind: PointKind::Power,
        cumulative: false,
        polled: true,
    },
    MeasurementPoint {
        key: "ems_dc_power_pos",
        section: Section::Ems,
        label: "Battery Discharge (DC +)",
        unit: Unit::Kilowatt,
        kind: PointKind::Power,
        cumulative: false,
        polled: true,
    },
    MeasurementPoint {
        key: "ems_ac_active_power",
        section: Section::Ems,
        label: "EMS AC Active Power",
        unit: Unit::Kilowatt,
        kind: PointKind::Power,
        cumulative: false,
        polled: true,
    },
    MeasurementPoint {
        key: "ems_ac_frequency",
        section: Section::Ems,
        label: "EMS AC Frequency",
        unit: Unit::Hertz,
        kind: PointKind::Frequency,
        cumulative: false,
        polled: true,
    },
    MeasurementPoint {
        key: "ems_history_input_energy",
        section: Section::Ems,
        label: "EMS Energy In (hist)",
        unit: Unit::KilowattHour,
        kind: PointKind::Energy,
        cumulative: true,
        polled: true,
    },
    MeasurementPoint {
        key: "ems_history_output_energy",
        section: Section::Ems,
        label: "EMS Energy Out (hist)",
        unit: Unit::KilowattHour,
        kind: PointKind::Energy,
        cumulative: true,
        polled: true,
    },
    MeasurementPoint {
        key: "ems_ac_active_power_A",
        section: Section::Ems,
        label: "EMS Phase A Power",
        unit: Unit::Kilowatt,
        kind: PointKind::Power,
        cumulative: false,
        polled: true,
    },
    MeasurementPoint {
        key: "ems_ac_active_power_B",
        section: Section::Ems,
        label: "EMS Phase B Power",
        unit: Unit::Kilowatt,
        kind: PointKind::Power,
        cumulative: false,
        polled: true,
    },
    MeasurementPoint {
        key: "ems_ac_active_power_C",
        section: Section::Ems,
        label: "EMS Phase C Power",
        unit: Unit::Kilowatt,
        kind: PointKind::Power,
        cumulative: false,
        polled: true,
    },
    MeasurementPoint {
        key: "ac_active_power",
        section: Section::Ammeter,
        label: "Grid Active Power (sum)",
        unit: Unit::Watt,
        kind: PointKind::Power,
        cumulative: false,
        polled: true,
    },
    MeasurementPoint {
        key: "ac_active_powers_0",
        section: Section::Ammeter,
        label: "Grid Phase L1 Power",
        unit: Unit::Watt,
        kind: PointKind::Power,
        cumulative: false,
        polled: true,
    },
    MeasurementPoint {
        key: "ac_active_powers_1",
        section: Section::Ammeter,
        label: "Grid Phase L2 Power",
        unit: Unit::Watt,
        kind: PointKind::Power,
        cumulative: false,
        polled: true,
    },
    MeasurementPoint {
        key: "ac_active_powers_2",
        section: Section::Ammeter,
        label: "Grid Phase L3 Power",
        unit: Unit::Watt,
        kind: PointKind::Power,
        cumulative: false,
        polled: true,
    },
];

/// Points of one section, in declaration order.
pub fn section_points(section: Section) -> impl Iterator<Item = &'static MeasurementPoint> {
    POINTS.iter().filter(move |p| p.section == section)
}

/// Request columns for one section: the polled keys in catalog order.
pub fn columns(section: Section) -> Vec<String> {
    section_points(section)
        .filter(|p| p.polled)
        .map(|p| p.key.to_owned())
        .collect()
}

/// Look up a point by its column key.
pub fn find(key: &str) -> Option<&'static MeasurementPoint> {
    POINTS.iter().find(|p| p.key == key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = POINTS.iter().map(|p| p.key).collect();
        assert_eq!(keys.len(), POINTS.len());
    }

    #[test]
    fn request_columns_match_the_upstream_feed() {
        assert_eq!(
            columns(Section::Ems),
            [
                "ems_soc",
                "ems_soh",
                "ems_dc_power_neg",
                "ems_dc_power_pos",
                "ems_ac_active_power",
                "ems_ac_frequency",
                "ems_history_input_energy",
                "ems_history_output_energy",
                "ems_ac_active_power_A",
                "ems_ac_active_power_B",
                "ems_ac_active_power_C",
            ]
        );
        assert_eq!(
            columns(Section::Ammeter),
            [
                "ac_active_power",
                "ac_active_powers_0",
                "ac_active_powers_1",
                "ac_active_powers_2",
            ]
        );
    }

    #[test]
    fn unpolled_points_are_still_findable() {
        let state = find("ems_state").unwrap();
        assert!(!state.polled);
        assert_eq!(state.kind, PointKind::State);
    }

    #[test]
    fn frequency_gets_two_display_decimals() {
        assert_eq!(find("ems_ac_frequency").unwrap().display_decimals(), 2);
        assert_eq!(find("ems_soc").unwrap().display_decimals(), 1);
        assert_eq!(find("ac_active_power").unwrap().display_decimals(), 1);
    }

    #[test]
    fn sections_partition_the_catalog() {
        let ems = section_points(Section::Ems).count();
        let ammeter = section_points(Section::Ammeter).count();
        assert_eq!(ems + ammeter, POINTS.len());
        assert_eq!(ems, 12);
        assert_eq!(ammeter, 4);
    }
}
