//! Per-request lab values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Analyte names understood by the reference intervals and syndrome rules.
pub mod analytes {
    pub const RED_BLOOD_CELLS: &str = "red_blood_cells";
    pub const WHITE_BLOOD_CELLS: &str = "white_blood_cells";
    pub const PLATELETS: &str = "platelets";
    pub const HEMOGLOBIN: &str = "hemoglobin";
    pub const GLUCOSE: &str = "glucose";
    pub const BACTERIA_PRESENCE: &str = "bacteria_presence";

    pub const ALL: [&str; 6] = [
        RED_BLOOD_CELLS,
        WHITE_BLOOD_CELLS,
        PLATELETS,
        HEMOGLOBIN,
        GLUCOSE,
        BACTERIA_PRESENCE,
    ];
}

/// Mapping from analyte name to measured value.
///
/// Need not cover every known analyte; absent analytes are skipped
/// downstream rather than treated as errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabRecord {
    values: BTreeMap<String, f64>,
}

impl LabRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, analyte: &str, value: f64) -> Self {
        self.insert(analyte, value);
        self
    }

    pub fn insert(&mut self, analyte: &str, value: f64) {
        self.values.insert(analyte.to_string(), value);
    }

    pub fn get(&self, analyte: &str) -> Option<f64> {
        self.values.get(analyte).copied()
    }

    pub fn contains(&self, analyte: &str) -> bool {
        self.values.contains_key(analyte)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for LabRecord {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
