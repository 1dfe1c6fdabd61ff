//! One-step Markov risk projection.
//!
//! Returns the full next-state distribution for the primary state, exactly as
//! declared. No sampling and no multi-step chaining.

use clinitriage_common::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::syndrome::{
    ANEMIA, BACTERIAL_INFECTION, NORMAL_STATE, POSSIBLE_DIABETES, PRE_DIABETES, THROMBOSIS_RISK,
};

/// Allowed deviation of a row sum from 1.0.
pub const ROW_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub state: String,
    pub probability: f64,
}

impl Transition {
    pub fn new(state: &str, probability: f64) -> Self {
        Self { state: state.to_string(), probability }
    }
}

/// Current state → ordered next-state distribution.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    rows: BTreeMap<String, Vec<Transition>>,
}

impl TransitionTable {
    /// Build a table, rejecting any row whose probabilities do not sum to 1.0.
    pub fn new<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<Transition>)>,
    {
        let table = Self { rows: rows.into_iter().collect() };
        table.validate()?;
        Ok(table)
    }

    /// One-year transition estimates.
    pub fn standard() -> Self {
        let row = |state: &str, next: &[(&str, f64)]| {
            (
                state.to_string(),
                next.iter().map(|&(s, p)| Transition::new(s, p)).collect::<Vec<_>>(),
            )
        };

        Self {
            rows: [
                row(NORMAL_STATE, &[(NORMAL_STATE, 0.95), (PRE_DIABETES, 0.04), (ANEMIA, 0.01)]),
                row(ANEMIA, &[(ANEMIA, 0.80), (NORMAL_STATE, 0.20)]),
                // assumes the infection is treated
                row(BACTERIAL_INFECTION, &[(NORMAL_STATE, 0.90), (THROMBOSIS_RISK, 0.10)]),
                row(PRE_DIABETES, &[(PRE_DIABETES, 0.70), (POSSIBLE_DIABETES, 0.20), (NORMAL_STATE, 0.10)]),
                row(POSSIBLE_DIABETES, &[(POSSIBLE_DIABETES, 0.90), (THROMBOSIS_RISK, 0.10)]),
                row(THROMBOSIS_RISK, &[(THROMBOSIS_RISK, 0.85), (NORMAL_STATE, 0.15)]),
            ]
            .into_iter()
            .collect(),
        }
    }

    /// Declared transitions out of `state`; empty for states not in the table.
    pub fn transitions_from(&self, state: &str) -> &[Transition] {
        self.rows.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, state: &str) -> bool {
        self.rows.contains_key(state)
    }

    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn row_sum(&self, state: &str) -> Option<f64> {
        self.rows.get(state).map(|row| row.iter().map(|t| t.probability).sum())
    }

    /// Every row must sum to 1.0 within `ROW_SUM_TOLERANCE`.
    pub fn validate(&self) -> Result<()> {
        for (state, row) in &self.rows {
            let sum: f64 = row.iter().map(|t| t.probability).sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(TriageError::InvalidTransitionTable { state: state.clone(), sum });
            }
        }
        Ok(())
    }

    /// Project one step ahead from `primary_state`.
    pub fn project(&self, primary_state: &str) -> FutureProjection {
        let projections = self.transitions_from(primary_state).to_vec();
        if projections.is_empty() {
            tracing::debug!(state = primary_state, "state has no declared transitions");
        }
        FutureProjection {
            title: format!("Proyección a 1 año basada en el estado '{primary_state}'"),
            primary_state: primary_state.to_string(),
            projections,
        }
    }
}

/// One-step projection from the primary state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureProjection {
    pub title: String,
    pub primary_state: String,
    pub projections: Vec<Transition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_rows_sum_to_one() {
        let table = TransitionTable::standard();
        assert!(table.validate().is_ok());
        for state in table.states() {
            let sum = table.row_sum(state).unwrap();
            assert!((sum - 1.0).abs() < 1e-6, "row {state} sums to {sum}");
        }
    }

    #[test]
    fn test_normal_projection_keeps_declared_order() {
        let table = TransitionTable::standard();
        assert_eq!(
            table.transitions_from("Normal"),
            &[
                Transition::new("Normal", 0.95),
                Transition::new("Pre-diabetes", 0.04),
                Transition::new("Anemia", 0.01),
            ]
        );
    }

    #[test]
    fn test_declared_order_is_not_resorted() {
        let table = TransitionTable::standard();
        let states: Vec<&str> = table
            .transitions_from("Infeccion Bacteriana")
            .iter()
            .map(|t| t.state.as_str())
            .collect();
        assert_eq!(states, vec!["Normal", "Riesgo de Trombosis"]);
    }

    #[test]
    fn test_unknown_state_projects_nothing() {
        let table = TransitionTable::standard();
        assert!(table.transitions_from("Hipertension").is_empty());
        let projection = table.project("Hipertension");
        assert_eq!(projection.primary_state, "Hipertension");
        assert!(projection.projections.is_empty());
    }

    #[test]
    fn test_projection_title() {
        let projection = TransitionTable::standard().project("Anemia");
        assert_eq!(projection.title, "Proyección a 1 año basada en el estado 'Anemia'");
        assert_eq!(projection.projections.len(), 2);
    }

    #[test]
    fn test_new_rejects_unbalanced_row() {
        let result = TransitionTable::new(vec![(
            "Normal".to_string(),
            vec![Transition::new("Normal", 0.9), Transition::new("Anemia", 0.2)],
        )]);
        match result {
            Err(TriageError::InvalidTransitionTable { state, sum }) => {
                assert_eq!(state, "Normal");
                assert!((sum - 1.1).abs() < 1e-9);
            }
            other => panic!("expected InvalidTransitionTable, got {other:?}"),
        }
    }
}
