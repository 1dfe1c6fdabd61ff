//! End-to-end report assembly through the public API.

use clinitriage_common::{DecisionLabel, TriageError};
use clinitriage_config::TriageConfig;
use clinitriage_engine::markov::Transition;
use clinitriage_engine::payload::{ImageModelOutput, PayloadFormat};
use clinitriage_engine::{KnowledgeBase, ReportAssembler};
use clinitriage_test_utils::{anemia_panel, hotspot_grid, in_range_panel, panel_json, zero_grid, MockAttribution};
use pretty_assertions::assert_eq;

#[test]
fn test_anemia_panel_projects_from_anemia() {
    let kb = KnowledgeBase::standard();
    let config = TriageConfig::default();
    let report = ReportAssembler::new(&kb, &config).blood_report(&anemia_panel());

    assert_eq!(report.current_diagnoses, vec!["Anemia"]);
    assert_eq!(report.future_projection.primary_state, "Anemia");
    assert_eq!(
        report.future_projection.projections,
        vec![Transition::new("Anemia", 0.80), Transition::new("Normal", 0.20)]
    );
    assert_eq!(report.anomalies, vec!["hemoglobin"]);
    assert_eq!(report.details.len(), 5);
}

#[test]
fn test_in_range_panel_is_normal() {
    let kb = KnowledgeBase::standard();
    let config = TriageConfig::default();
    let report = ReportAssembler::new(&kb, &config).blood_report(&in_range_panel());

    assert_eq!(report.current_diagnoses, vec!["Normal"]);
    assert!(report.anomalies.is_empty());
    assert_eq!(
        report.future_projection.projections,
        vec![
            Transition::new("Normal", 0.95),
            Transition::new("Pre-diabetes", 0.04),
            Transition::new("Anemia", 0.01),
        ]
    );
}

#[test]
fn test_json_payload_round_trip_through_assembler() {
    let kb = KnowledgeBase::standard();
    let config = TriageConfig::default();
    let payload = panel_json(&anemia_panel());
    let report = ReportAssembler::new(&kb, &config)
        .blood_report_from_payload(&payload, PayloadFormat::Json)
        .unwrap();
    assert_eq!(report.current_diagnoses, vec!["Anemia"]);
}

#[test]
fn test_csv_payload_without_glucose() {
    let kb = KnowledgeBase::standard();
    let config = TriageConfig::default();
    let report = ReportAssembler::new(&kb, &config)
        .blood_report_from_payload("hemoglobin,14\nwhite_blood_cells,12500\n", PayloadFormat::Csv)
        .unwrap();
    assert_eq!(report.current_diagnoses, vec!["Infeccion Bacteriana"]);
    assert_eq!(
        report.future_projection.projections,
        vec![Transition::new("Normal", 0.90), Transition::new("Riesgo de Trombosis", 0.10)]
    );
    assert_eq!(report.anomalies, vec!["white_blood_cells"]);
}

#[test]
fn test_malformed_payload_is_rejected() {
    let kb = KnowledgeBase::standard();
    let config = TriageConfig::default();
    let result = ReportAssembler::new(&kb, &config).blood_report_from_payload("{hemoglobin: 10}", PayloadFormat::Json);
    assert!(matches!(result, Err(TriageError::MalformedInput(_))));
}

#[test]
fn test_confident_malignant_with_grid() {
    let kb = KnowledgeBase::standard();
    let config = TriageConfig::default();
    let grid = hotspot_grid(16, 16, 3, 4, 0.9);
    let report = ReportAssembler::new(&kb, &config).image_report(0.85, Some(&grid)).unwrap();

    assert_eq!(report.decision, DecisionLabel::Malignant);
    assert_eq!(report.main_diagnosis.label, DecisionLabel::Malignant);
    assert!((report.main_diagnosis.confidence - 0.85).abs() < 1e-12);
    assert_eq!(report.differential_diagnoses.len(), 1);
    assert_eq!(report.differential_diagnoses[0].label, DecisionLabel::Benign);
    assert!((report.differential_diagnoses[0].confidence - 0.15).abs() < 1e-9);
    assert!(report.explanation.contains("(fila 3, columna 4)"), "{}", report.explanation);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["decision"], "maligno");
    assert_eq!(json["main_diagnosis"]["label"], "maligno");
    assert_eq!(json["differential_diagnoses"][0]["label"], "benigno");
    assert_eq!(json["risk"]["level"], "Alto Riesgo");
}

#[test]
fn test_zero_grid_explains_with_zero_ratio() {
    let kb = KnowledgeBase::standard();
    let config = TriageConfig::default();
    let report = ReportAssembler::new(&kb, &config)
        .image_report(0.2, Some(&zero_grid(4, 4)))
        .unwrap();
    assert_eq!(report.decision, DecisionLabel::Benign);
    let peak = report.attribution_peak.unwrap();
    assert_eq!(peak.ratio, 0.0);
}

#[test]
fn test_failing_source_still_reports() {
    let kb = KnowledgeBase::standard();
    let config = TriageConfig::default();
    let source = MockAttribution::failing("gradient explainer crashed");
    let report = ReportAssembler::new(&kb, &config)
        .image_report_from_source(0.75, &source)
        .unwrap();
    assert_eq!(source.calls(), 1);
    assert_eq!(report.decision, DecisionLabel::Malignant);
    assert!(report.attribution_peak.is_none());
}

#[test]
fn test_model_output_document() {
    let kb = KnowledgeBase::standard();
    let config = TriageConfig::default();
    let output = ImageModelOutput::from_json(
        r#"{"prob_malignant": 0.5, "attribution": {"height": 2, "width": 2, "channels": 2,
            "values": [0.1, 0.1, 0.2, 0.2, 0.9, -0.9, 0.0, 0.0]}}"#,
    )
    .unwrap();
    let report = ReportAssembler::new(&kb, &config)
        .image_report(output.prob_malignant, output.attribution.as_ref())
        .unwrap();
    assert_eq!(report.decision, DecisionLabel::Indeterminate);
    let peak = report.attribution_peak.unwrap();
    assert_eq!((peak.row, peak.col), (1, 0));
    assert!((peak.value - 0.9).abs() < 1e-12);
}

#[test]
fn test_tuned_thresholds_change_decision() {
    let kb = KnowledgeBase::standard();
    let config = TriageConfig::from_toml_str("[decision]\nhigh_threshold = 0.9\n").unwrap();
    let report = ReportAssembler::new(&kb, &config).image_report(0.85, None).unwrap();
    assert_eq!(report.decision, DecisionLabel::Indeterminate);
    // ranking follows confidence, not the decision
    assert_eq!(report.main_diagnosis.label, DecisionLabel::Malignant);
}
