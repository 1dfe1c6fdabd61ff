//! Range classification of lab values against reference intervals.

use clinitriage_common::RangeStatus;
use serde::Serialize;

use crate::lab::{analytes, LabRecord};

/// Reference interval for one analyte. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceInterval {
    pub analyte: &'static str,
    pub lower: f64,
    pub upper: f64,
    pub unit: &'static str,
}

impl ReferenceInterval {
    /// value < lower → Low, value > upper → High, otherwise Normal.
    pub fn classify(&self, value: f64) -> RangeStatus {
        if value < self.lower {
            RangeStatus::Low
        } else if value > self.upper {
            RangeStatus::High
        } else {
            RangeStatus::Normal
        }
    }
}

/// The fixed, ordered set of reference intervals.
#[derive(Debug, Clone)]
pub struct ReferenceIntervals {
    intervals: Vec<ReferenceInterval>,
}

impl ReferenceIntervals {
    pub fn standard() -> Self {
        let interval = |analyte, lower, upper, unit| ReferenceInterval { analyte, lower, upper, unit };
        Self {
            intervals: vec![
                interval(analytes::RED_BLOOD_CELLS,   4.5,      5.9,      "millones/mcL"),
                interval(analytes::WHITE_BLOOD_CELLS, 4500.0,   11000.0,  "células/mcL"),
                interval(analytes::PLATELETS,         150000.0, 450000.0, "por mcL"),
                interval(analytes::HEMOGLOBIN,        13.5,     17.5,     "g/dL"),
                interval(analytes::GLUCOSE,           70.0,     100.0,    "mg/dL"),
                // 0 = absent, 1 = present
                interval(analytes::BACTERIA_PRESENCE, 0.0,      0.0,      ""),
            ],
        }
    }

    pub fn get(&self, analyte: &str) -> Option<&ReferenceInterval> {
        self.intervals.iter().find(|i| i.analyte == analyte)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceInterval> {
        self.intervals.iter()
    }

    /// Classify every known analyte present in the record, in declaration order.
    /// Unknown and missing analytes are skipped.
    pub fn classify_record(&self, record: &LabRecord) -> Vec<AnalyteFinding> {
        self.intervals
            .iter()
            .filter_map(|interval| {
                let value = record.get(interval.analyte)?;
                let status = interval.classify(value);
                tracing::debug!(analyte = interval.analyte, value, status = %status, "classified analyte");
                Some(AnalyteFinding {
                    analyte: interval.analyte,
                    value,
                    unit: interval.unit,
                    status,
                })
            })
            .collect()
    }
}

/// Outcome of classifying one analyte.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyteFinding {
    pub analyte: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub status: RangeStatus,
}

impl AnalyteFinding {
    /// e.g. "Hemoglobin: 12 g/dL (Estado: Bajo)"
    pub fn detail_line(&self) -> String {
        let name = display_name(self.analyte);
        if self.unit.is_empty() {
            format!("{}: {} (Estado: {})", name, self.value, self.status)
        } else {
            format!("{}: {} {} (Estado: {})", name, self.value, self.unit, self.status)
        }
    }
}

/// "red_blood_cells" → "Red Blood Cells"
pub fn display_name(analyte: &str) -> String {
    analyte
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
