//! Report assembly for the blood-panel and skin-lesion paths.
//!
//! Reports are built fresh per request and carry no identity.

use clinitriage_common::{DecisionLabel, Result};
use clinitriage_config::TriageConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::attribution::{AttributionGrid, AttributionPeak, AttributionSource, Explanation, ExplanationSynthesizer};
use crate::decision::{classify_malignancy, validate_probability, ClassProbabilities, Diagnosis};
use crate::knowledge::KnowledgeBase;
use crate::lab::LabRecord;
use crate::markov::FutureProjection;
use crate::payload::{parse_lab_payload, PayloadFormat};
use crate::syndrome::primary_state;

pub const BLOOD_REPORT_TITLE: &str = "Informe de Análisis de Sangre";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodReport {
    pub title: String,
    /// One formatted line per known analyte present, in reference order
    pub details: Vec<String>,
    pub current_diagnoses: Vec<String>,
    pub future_projection: FutureProjection,
    /// Analytes classified Low or High
    pub anomalies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: String,
    pub recommendation: String,
}

impl RiskAssessment {
    pub fn for_decision(decision: DecisionLabel) -> Self {
        let (level, recommendation) = match decision {
            DecisionLabel::Malignant => (
                "Alto Riesgo",
                "Se recomienda consultar a un dermatólogo inmediatamente.",
            ),
            DecisionLabel::Benign => (
                "Probablemente Benigno",
                "Parece ser una lesión benigna, pero mantenga un monitoreo regular.",
            ),
            DecisionLabel::Indeterminate => (
                "Indeterminado",
                "La confianza está en un rango intermedio. Por favor recorta la lesión (centrar y acercar) y vuelva a subir la imagen, o consulte un profesional para una evaluación detallada.",
            ),
        };
        Self { level: level.to_string(), recommendation: recommendation.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReport {
    pub main_diagnosis: Diagnosis,
    pub differential_diagnoses: Vec<Diagnosis>,
    pub decision: DecisionLabel,
    pub explanation: String,
    pub probabilities: ClassProbabilities,
    pub risk: RiskAssessment,
    /// `None` when the fallback explanation was used
    pub attribution_peak: Option<AttributionPeak>,
}

/// Combines the components into the two public reports.
pub struct ReportAssembler<'a> {
    knowledge: &'a KnowledgeBase,
    config: &'a TriageConfig,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(knowledge: &'a KnowledgeBase, config: &'a TriageConfig) -> Self {
        Self { knowledge, config }
    }

    // ── Blood path ───────────────────────────────────────────────────────────

    pub fn blood_report(&self, record: &LabRecord) -> BloodReport {
        let findings = self.knowledge.intervals.classify_record(record);
        let details = findings.iter().map(|f| f.detail_line()).collect();
        let anomalies = findings
            .iter()
            .filter(|f| f.status.is_anomalous())
            .map(|f| f.analyte.to_string())
            .collect();

        let current_diagnoses = self.knowledge.rules.match_record(record);
        let primary = primary_state(&current_diagnoses);
        let future_projection = self.knowledge.transitions.project(primary);

        info!(
            analytes = findings.len(),
            diagnoses = ?current_diagnoses,
            primary_state = primary,
            "assembled blood report"
        );

        BloodReport {
            title: BLOOD_REPORT_TITLE.to_string(),
            details,
            current_diagnoses,
            future_projection,
            anomalies,
        }
    }

    /// Parse then assemble. Parse failures propagate; nothing is partially processed.
    pub fn blood_report_from_payload(&self, content: &str, format: PayloadFormat) -> Result<BloodReport> {
        let record = parse_lab_payload(content, format)?;
        Ok(self.blood_report(&record))
    }

    // ── Image path ───────────────────────────────────────────────────────────

    /// Assemble from a probability and an optional, already-computed grid.
    /// A missing or unusable grid degrades to the fallback explanation.
    pub fn image_report(&self, prob_malignant: f64, attribution: Option<&AttributionGrid>) -> Result<ImageReport> {
        let prob_malignant = validate_probability(prob_malignant)?;
        let decision = classify_malignancy(prob_malignant, &self.config.decision);
        let synthesizer = ExplanationSynthesizer::new(self.config.attribution);

        let explanation = match attribution {
            Some(grid) => synthesizer.synthesize(grid, decision).unwrap_or_else(|e| {
                warn!(error = %e, "attribution explanation failed, using fallback");
                Explanation::fallback()
            }),
            None => {
                warn!("no attribution grid supplied, using fallback explanation");
                Explanation::fallback()
            }
        };

        Ok(self.finish_image_report(prob_malignant, decision, explanation))
    }

    /// Same as [`image_report`](Self::image_report) but pulls the grid from a source.
    pub fn image_report_from_source(
        &self,
        prob_malignant: f64,
        source: &dyn AttributionSource,
    ) -> Result<ImageReport> {
        let prob_malignant = validate_probability(prob_malignant)?;
        let decision = classify_malignancy(prob_malignant, &self.config.decision);
        let explanation = ExplanationSynthesizer::new(self.config.attribution).explain_from(source, decision);
        Ok(self.finish_image_report(prob_malignant, decision, explanation))
    }

    fn finish_image_report(&self, prob_malignant: f64, decision: DecisionLabel, explanation: Explanation) -> ImageReport {
        let probabilities = ClassProbabilities::from_malignant(prob_malignant);
        let mut ranked = probabilities.ranked().into_iter();
        let main_diagnosis = ranked.next().unwrap_or(Diagnosis {
            label: DecisionLabel::Malignant,
            confidence: prob_malignant,
        });
        let differential_diagnoses: Vec<Diagnosis> = ranked.collect();

        info!(
            prob_malignant,
            decision = %decision,
            explained = explanation.peak.is_some(),
            "assembled image report"
        );

        ImageReport {
            main_diagnosis,
            differential_diagnoses,
            decision,
            explanation: explanation.text,
            probabilities,
            risk: RiskAssessment::for_decision(decision),
            attribution_peak: explanation.peak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution::{StaticAttribution, UnavailableAttribution, FALLBACK_EXPLANATION};
    use clinitriage_common::TriageError;
    use pretty_assertions::assert_eq;

    fn with_assembler<T>(f: impl FnOnce(&ReportAssembler<'_>) -> T) -> T {
        let kb = KnowledgeBase::standard();
        let config = TriageConfig::default();
        f(&ReportAssembler::new(&kb, &config))
    }

    #[test]
    fn test_blood_report_details_and_anomalies() {
        let record = LabRecord::new()
            .with("hemoglobin", 10.0)
            .with("glucose", 95.0)
            .with("platelets", 200000.0);
        let report = with_assembler(|a| a.blood_report(&record));
        assert_eq!(report.title, "Informe de Análisis de Sangre");
        assert_eq!(
            report.details,
            vec![
                "Platelets: 200000 por mcL (Estado: Normal)",
                "Hemoglobin: 10 g/dL (Estado: Bajo)",
                "Glucose: 95 mg/dL (Estado: Normal)",
            ]
        );
        assert_eq!(report.anomalies, vec!["hemoglobin"]);
        assert_eq!(report.current_diagnoses, vec!["Anemia"]);
    }

    #[test]
    fn test_blood_report_from_bad_payload() {
        let result = with_assembler(|a| a.blood_report_from_payload("not json", PayloadFormat::Json));
        assert!(matches!(result, Err(TriageError::MalformedInput(_))));
    }

    #[test]
    fn test_image_report_without_grid_uses_fallback() {
        let report = with_assembler(|a| a.image_report(0.5, None)).unwrap();
        assert_eq!(report.decision, DecisionLabel::Indeterminate);
        assert_eq!(report.explanation, FALLBACK_EXPLANATION);
        assert!(report.attribution_peak.is_none());
        assert_eq!(report.risk.level, "Indeterminado");
        assert!(report.risk.recommendation.contains("Por favor recorta la lesión"));
    }

    #[test]
    fn test_image_report_empty_grid_degrades() {
        let grid = AttributionGrid::new(0, 0, 1, vec![]).unwrap();
        let report = with_assembler(|a| a.image_report(0.1, Some(&grid))).unwrap();
        assert_eq!(report.decision, DecisionLabel::Benign);
        assert_eq!(report.explanation, FALLBACK_EXPLANATION);
    }

    #[test]
    fn test_image_report_rejects_invalid_probability() {
        let result = with_assembler(|a| a.image_report(1.5, None));
        assert!(matches!(result, Err(TriageError::InvalidProbability(_))));
    }

    #[test]
    fn test_image_report_from_sources() {
        let grid = AttributionGrid::from_rows(vec![vec![0.0, 0.0], vec![0.0, 0.7]]).unwrap();
        let report = with_assembler(|a| a.image_report_from_source(0.97, &StaticAttribution::new(grid))).unwrap();
        assert_eq!(report.decision, DecisionLabel::Malignant);
        let peak = report.attribution_peak.unwrap();
        assert_eq!((peak.row, peak.col), (1, 1));

        let report = with_assembler(|a| {
            a.image_report_from_source(0.02, &UnavailableAttribution::new("explainer offline"))
        })
        .unwrap();
        assert_eq!(report.decision, DecisionLabel::Benign);
        assert_eq!(report.main_diagnosis.label, DecisionLabel::Benign);
        assert_eq!(report.explanation, FALLBACK_EXPLANATION);
    }

    #[test]
    fn test_image_report_field_order() {
        let report = with_assembler(|a| a.image_report(0.85, None)).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        let positions: Vec<usize> = [
            "\"main_diagnosis\"",
            "\"differential_diagnoses\"",
            "\"decision\"",
            "\"explanation\"",
            "\"probabilities\"",
        ]
        .iter()
        .map(|key| json.find(key).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }
}
