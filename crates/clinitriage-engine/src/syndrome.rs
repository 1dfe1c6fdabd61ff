//! Rule-based syndrome matching over a lab record.
//!
//! Rules are a fixed, ordered list of (name, predicate) pairs. Order decides
//! the primary state (first match) but every matching rule is reported.
//!
//! Missing analytes never fire a rule: each comparison that needs an absent
//! analyte is false. A predicate returns `None` when none of the analytes it
//! reads are present, which is reported the same as `Some(false)`.

use crate::lab::{analytes, LabRecord};

/// State reported when no rule fires.
pub const NORMAL_STATE: &str = "Normal";

pub const ANEMIA: &str = "Anemia";
pub const BACTERIAL_INFECTION: &str = "Infeccion Bacteriana";
pub const THROMBOSIS_RISK: &str = "Riesgo de Trombosis";
pub const PRE_DIABETES: &str = "Pre-diabetes";
pub const POSSIBLE_DIABETES: &str = "Posible Diabetes";

const HEMOGLOBIN_MIN: f64 = 13.5;
const WHITE_BLOOD_CELLS_MAX: f64 = 11000.0;
const PLATELETS_MAX: f64 = 450000.0;
const GLUCOSE_FASTING_MAX: f64 = 100.0;
const GLUCOSE_PRE_DIABETES_MAX: f64 = 125.0;

pub type SyndromePredicate = fn(&LabRecord) -> Option<bool>;

#[derive(Clone, Copy)]
pub struct SyndromeRule {
    pub name: &'static str,
    predicate: SyndromePredicate,
}

impl SyndromeRule {
    pub const fn new(name: &'static str, predicate: SyndromePredicate) -> Self {
        Self { name, predicate }
    }

    /// Evaluate against a record; a rule that cannot be evaluated does not fire.
    pub fn fires(&self, record: &LabRecord) -> bool {
        match (self.predicate)(record) {
            Some(fired) => fired,
            None => {
                tracing::debug!(rule = self.name, "required analytes missing, rule does not fire");
                false
            }
        }
    }
}

impl std::fmt::Debug for SyndromeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyndromeRule").field("name", &self.name).finish_non_exhaustive()
    }
}

fn anemia(record: &LabRecord) -> Option<bool> {
    Some(record.get(analytes::HEMOGLOBIN)? < HEMOGLOBIN_MIN)
}

fn bacterial_infection(record: &LabRecord) -> Option<bool> {
    let wbc = record.get(analytes::WHITE_BLOOD_CELLS);
    let bacteria = record.get(analytes::BACTERIA_PRESENCE);
    if wbc.is_none() && bacteria.is_none() {
        return None;
    }
    Some(wbc.is_some_and(|v| v > WHITE_BLOOD_CELLS_MAX) || bacteria.is_some_and(|v| v == 1.0))
}

fn thrombosis_risk(record: &LabRecord) -> Option<bool> {
    Some(record.get(analytes::PLATELETS)? > PLATELETS_MAX)
}

fn pre_diabetes(record: &LabRecord) -> Option<bool> {
    let glucose = record.get(analytes::GLUCOSE)?;
    Some(glucose > GLUCOSE_FASTING_MAX && glucose <= GLUCOSE_PRE_DIABETES_MAX)
}

fn possible_diabetes(record: &LabRecord) -> Option<bool> {
    Some(record.get(analytes::GLUCOSE)? > GLUCOSE_PRE_DIABETES_MAX)
}

/// The ordered rule set.
#[derive(Debug, Clone)]
pub struct SyndromeRules {
    rules: Vec<SyndromeRule>,
}

impl SyndromeRules {
    pub fn standard() -> Self {
        Self {
            rules: vec![
                SyndromeRule::new(ANEMIA, anemia),
                SyndromeRule::new(BACTERIAL_INFECTION, bacterial_infection),
                SyndromeRule::new(THROMBOSIS_RISK, thrombosis_risk),
                SyndromeRule::new(PRE_DIABETES, pre_diabetes),
                SyndromeRule::new(POSSIBLE_DIABETES, possible_diabetes),
            ],
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|r| r.name)
    }

    /// Matched syndrome names in declaration order, or `["Normal"]` if none fire.
    pub fn match_record(&self, record: &LabRecord) -> Vec<String> {
        let mut matched: Vec<String> = self
            .rules
            .iter()
            .filter(|rule| rule.fires(record))
            .map(|rule| rule.name.to_string())
            .collect();

        if matched.is_empty() {
            matched.push(NORMAL_STATE.to_string());
        }
        matched
    }
}

/// First matched syndrome; the input state for risk projection.
pub fn primary_state(matched: &[String]) -> &str {
    matched.first().map(String::as_str).unwrap_or(NORMAL_STATE)
}
