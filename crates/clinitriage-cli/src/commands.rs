//! Subcommand bodies. Each returns the report rendered as pretty JSON.

use std::path::Path;

use anyhow::Context;
use clinitriage_engine::payload::{ImageModelOutput, PayloadFormat};
use clinitriage_engine::ReportAssembler;

pub fn blood(assembler: &ReportAssembler<'_>, path: &Path) -> anyhow::Result<String> {
    let format = PayloadFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let report = assembler.blood_report_from_payload(&content, format)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn image(assembler: &ReportAssembler<'_>, path: &Path) -> anyhow::Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let output = ImageModelOutput::from_json(&content)?;
    let report = assembler.image_report(output.prob_malignant, output.attribution.as_ref())?;
    Ok(serde_json::to_string_pretty(&report)?)
}
