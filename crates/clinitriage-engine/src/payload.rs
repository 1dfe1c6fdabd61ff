//! Parsing of structured payloads into engine inputs.
//!
//! Lab payloads arrive as a JSON object or a two-column `analyte,value` CSV.
//! Any syntax or type problem is reported as `MalformedInput` and nothing is
//! partially processed.

use clinitriage_common::{Result, TriageError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::attribution::AttributionGrid;
use crate::lab::{analytes, LabRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    Json,
    Csv,
}

impl PayloadFormat {
    /// Pick the format from a file extension (`json` or `csv`).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            _ => Err(TriageError::MalformedInput(format!(
                "unsupported lab payload file '{}': expected a .json or .csv file",
                path.display()
            ))),
        }
    }
}

pub fn parse_lab_payload(content: &str, format: PayloadFormat) -> Result<LabRecord> {
    match format {
        PayloadFormat::Json => parse_lab_json(content),
        PayloadFormat::Csv => parse_lab_csv(content),
    }
}

/// `{"hemoglobin": 12.0, "glucose": 95, ...}`
///
/// Known analytes must be numeric (`bacteria_presence` also accepts a boolean).
/// Unknown keys are kept when numeric and ignored otherwise.
pub fn parse_lab_json(content: &str) -> Result<LabRecord> {
    let doc: Value = serde_json::from_str(content)
        .map_err(|e| TriageError::MalformedInput(format!("payload is not valid JSON: {e}")))?;
    let Value::Object(map) = doc else {
        return Err(TriageError::MalformedInput(
            "payload must be a JSON object of analyte values".to_string(),
        ));
    };

    let mut record = LabRecord::new();
    for (key, value) in &map {
        let known = analytes::ALL.contains(&key.as_str());
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::Bool(b) if key == analytes::BACTERIA_PRESENCE => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        };
        match number {
            Some(v) => record.insert(key, v),
            None if known => {
                return Err(TriageError::MalformedInput(format!(
                    "analyte '{key}' must be numeric, got {value}"
                )));
            }
            None => tracing::debug!(key = %key, "ignoring non-numeric unknown field"),
        }
    }
    Ok(record)
}

/// Two columns, `analyte,value`, with an optional header row.
pub fn parse_lab_csv(content: &str) -> Result<LabRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut record = LabRecord::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row.map_err(|e| TriageError::MalformedInput(format!("invalid CSV: {e}")))?;
        let line = idx + 1;
        if row.len() != 2 {
            return Err(TriageError::MalformedInput(format!(
                "CSV line {line}: expected 2 fields (analyte,value), got {}",
                row.len()
            )));
        }
        let (analyte, raw_value) = (&row[0], &row[1]);
        match raw_value.parse::<f64>() {
            Ok(v) if v.is_finite() => record.insert(analyte, v),
            // first line may be a header such as "analyte,value"
            Err(_) if idx == 0 && !analytes::ALL.contains(&analyte) => continue,
            _ => {
                return Err(TriageError::MalformedInput(format!(
                    "CSV line {line}: value '{raw_value}' for '{analyte}' is not a finite number"
                )));
            }
        }
    }
    Ok(record)
}

/// What the external image model produced for one lesion image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageModelOutput {
    pub prob_malignant: f64,
    /// `None` when the explanation subsystem produced nothing.
    #[serde(default)]
    pub attribution: Option<AttributionGrid>,
}

impl ImageModelOutput {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| TriageError::MalformedInput(format!("invalid image model output: {e}")))
    }
}
