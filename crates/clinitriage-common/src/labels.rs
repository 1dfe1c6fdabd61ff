//! Labels shared by the blood-panel and skin-lesion paths.
//!
//! User-facing renderings are in Spanish, matching the wording the response
//! layer already displays.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-way outcome of the malignancy decision rules.
/// Derived per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionLabel {
    #[serde(rename = "maligno")]
    Malignant,
    #[serde(rename = "benigno")]
    Benign,
    #[serde(rename = "indeterminado")]
    Indeterminate,
}

impl DecisionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionLabel::Malignant => "maligno",
            DecisionLabel::Benign => "benigno",
            DecisionLabel::Indeterminate => "indeterminado",
        }
    }
}

impl fmt::Display for DecisionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a lab value relative to its reference interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeStatus {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Bajo")]
    Low,
    #[serde(rename = "Alto")]
    High,
}

impl RangeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeStatus::Normal => "Normal",
            RangeStatus::Low => "Bajo",
            RangeStatus::High => "Alto",
        }
    }

    /// Low and High count as anomalies.
    pub fn is_anomalous(&self) -> bool {
        !matches!(self, RangeStatus::Normal)
    }
}

impl fmt::Display for RangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_label_serializes_spanish() {
        let json = serde_json::to_string(&DecisionLabel::Malignant).unwrap();
        assert_eq!(json, "\"maligno\"");
        let parsed: DecisionLabel = serde_json::from_str("\"indeterminado\"").unwrap();
        assert_eq!(parsed, DecisionLabel::Indeterminate);
    }

    #[test]
    fn test_range_status_display() {
        assert_eq!(RangeStatus::Low.to_string(), "Bajo");
        assert_eq!(RangeStatus::High.to_string(), "Alto");
        assert!(!RangeStatus::Normal.is_anomalous());
        assert!(RangeStatus::High.is_anomalous());
    }
}
