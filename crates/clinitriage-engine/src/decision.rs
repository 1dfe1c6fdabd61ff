//! Malignancy decision rules.
//!
//! Ordered rules, first match wins:
//! 1. p >= extreme_high   → malignant
//! 2. p <= extreme_low    → benign
//! 3. p >= high_threshold → malignant
//! 4. p <= low_threshold  → benign
//! 5. otherwise           → indeterminate

use clinitriage_common::{DecisionLabel, Result, TriageError};
use clinitriage_config::DecisionThresholds;
use serde::{Deserialize, Serialize};

pub fn classify_malignancy(prob_malignant: f64, thresholds: &DecisionThresholds) -> DecisionLabel {
    if prob_malignant >= thresholds.extreme_high {
        DecisionLabel::Malignant
    } else if prob_malignant <= thresholds.extreme_low {
        DecisionLabel::Benign
    } else if prob_malignant >= thresholds.high_threshold {
        DecisionLabel::Malignant
    } else if prob_malignant <= thresholds.low_threshold {
        DecisionLabel::Benign
    } else {
        DecisionLabel::Indeterminate
    }
}

/// Reject probabilities that are NaN or outside [0, 1].
pub fn validate_probability(prob_malignant: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&prob_malignant) {
        Ok(prob_malignant)
    } else {
        Err(TriageError::InvalidProbability(prob_malignant))
    }
}

/// Binary class probabilities. Benign is always the complement of malignant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    #[serde(rename = "maligno")]
    pub malignant: f64,
    #[serde(rename = "benigno")]
    pub benign: f64,
}

impl ClassProbabilities {
    pub fn from_malignant(prob_malignant: f64) -> Self {
        Self {
            malignant: prob_malignant,
            benign: 1.0 - prob_malignant,
        }
    }

    /// Classes ranked by confidence, highest first.
    /// Ties keep benign ahead of malignant.
    pub fn ranked(&self) -> Vec<Diagnosis> {
        let mut ranked = vec![
            Diagnosis { label: DecisionLabel::Benign, confidence: self.benign },
            Diagnosis { label: DecisionLabel::Malignant, confidence: self.malignant },
        ];
        ranked.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

/// A class label with the model's confidence in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub label: DecisionLabel,
    pub confidence: f64,
}
