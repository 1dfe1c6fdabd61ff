//! Attribution explanation synthesis.
//!
//! Consumes an attribution grid produced by an external explanation
//! subsystem and turns it into a one-sentence rationale naming the peak
//! location and how far it stands above the mean.

use clinitriage_common::{DecisionLabel, Result, TriageError};
use clinitriage_config::AttributionConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stock sentence used whenever no explanation can be synthesised.
pub const FALLBACK_EXPLANATION: &str =
    "Explicación no disponible: no se pudo calcular el mapa de atribución para esta imagen.";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AttributionError {
    #[error("attribution unavailable: {0}")]
    Unavailable(String),

    #[error("attribution grid has no cells")]
    EmptyGrid,
}

// ── Grid ──────────────────────────────────────────────────────────────────────

/// H×W×C attribution scores, row-major with channels innermost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid", into = "RawGrid")]
pub struct AttributionGrid {
    height: usize,
    width: usize,
    channels: usize,
    values: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct RawGrid {
    height: usize,
    width: usize,
    #[serde(default = "default_channels")]
    channels: usize,
    values: Vec<f64>,
}

fn default_channels() -> usize { 1 }

impl TryFrom<RawGrid> for AttributionGrid {
    type Error = TriageError;

    fn try_from(raw: RawGrid) -> Result<Self> {
        Self::new(raw.height, raw.width, raw.channels, raw.values)
    }
}

impl From<AttributionGrid> for RawGrid {
    fn from(grid: AttributionGrid) -> Self {
        Self {
            height: grid.height,
            width: grid.width,
            channels: grid.channels,
            values: grid.values,
        }
    }
}

impl AttributionGrid {
    pub fn new(height: usize, width: usize, channels: usize, values: Vec<f64>) -> Result<Self> {
        if channels == 0 {
            return Err(TriageError::InvalidGrid("channel count must be at least 1".to_string()));
        }
        let expected = height
            .checked_mul(width)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| TriageError::InvalidGrid("grid dimensions overflow".to_string()))?;
        if values.len() != expected {
            return Err(TriageError::InvalidGrid(format!(
                "expected {height}x{width}x{channels} = {expected} values, got {}",
                values.len()
            )));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(TriageError::InvalidGrid(format!("non-finite value at index {pos}")));
        }
        Ok(Self { height, width, channels, values })
    }

    /// Single-channel grid from rows; all rows must share a length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != width) {
            return Err(TriageError::InvalidGrid("rows have differing lengths".to_string()));
        }
        Self::new(height, width, 1, rows.into_iter().flatten().collect())
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    /// Collapse channels by averaging absolute attribution.
    pub fn magnitude_map(&self) -> MagnitudeMap {
        let values = self
            .values
            .chunks(self.channels)
            .map(|cell| cell.iter().map(|v| v.abs()).sum::<f64>() / self.channels as f64)
            .collect();
        MagnitudeMap { height: self.height, width: self.width, values }
    }
}

/// H×W per-cell magnitude.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeMap {
    height: usize,
    width: usize,
    values: Vec<f64>,
}

impl MagnitudeMap {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.height && col < self.width {
            self.values.get(row * self.width + col).copied()
        } else {
            None
        }
    }

    /// Full-grid argmax. Ties go to the first cell in row-major order.
    pub fn argmax(&self) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &v) in self.values.iter().enumerate() {
            match best {
                Some((_, max)) if v <= max => {}
                _ => best = Some((idx, v)),
            }
        }
        best.map(|(idx, v)| (idx / self.width, idx % self.width, v))
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}

// ── Explanation ───────────────────────────────────────────────────────────────

/// Peak location and its ratio to the mean magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributionPeak {
    pub row: usize,
    pub col: usize,
    pub value: f64,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub text: String,
    /// `None` when the fallback sentence was used.
    pub peak: Option<AttributionPeak>,
}

impl Explanation {
    pub fn fallback() -> Self {
        Self { text: FALLBACK_EXPLANATION.to_string(), peak: None }
    }
}

pub struct ExplanationSynthesizer {
    config: AttributionConfig,
}

impl ExplanationSynthesizer {
    pub fn new(config: AttributionConfig) -> Self {
        Self { config }
    }

    /// Locate the peak and compute `ratio = max / (mean + ε)`.
    pub fn peak(&self, grid: &AttributionGrid) -> std::result::Result<AttributionPeak, AttributionError> {
        let magnitude = grid.magnitude_map();
        let (row, col, value) = magnitude.argmax().ok_or(AttributionError::EmptyGrid)?;
        let ratio = value / (magnitude.mean() + self.config.epsilon);
        Ok(AttributionPeak { row, col, value, ratio })
    }

    pub fn synthesize(
        &self,
        grid: &AttributionGrid,
        label: DecisionLabel,
    ) -> std::result::Result<Explanation, AttributionError> {
        let peak = self.peak(grid)?;
        tracing::debug!(row = peak.row, col = peak.col, value = peak.value, ratio = peak.ratio, "attribution peak");
        Ok(Explanation { text: self.render(&peak, label), peak: Some(peak) })
    }

    /// Pull a grid from `source` and synthesise, degrading to the fallback
    /// sentence on any failure.
    pub fn explain_from(&self, source: &dyn AttributionSource, label: DecisionLabel) -> Explanation {
        match source.attribution().and_then(|grid| self.synthesize(&grid, label)) {
            Ok(explanation) => explanation,
            Err(e) => {
                tracing::warn!(error = %e, "attribution explanation unavailable, using fallback");
                Explanation::fallback()
            }
        }
    }

    fn render(&self, peak: &AttributionPeak, label: DecisionLabel) -> String {
        let p = self.config.precision;
        match label {
            DecisionLabel::Malignant | DecisionLabel::Benign => format!(
                "El modelo favorece '{label}' debido a un pico de importancia de {:.p$} en (fila {}, columna {}), {:.p$}× el promedio.",
                peak.value, peak.row, peak.col, peak.ratio,
            ),
            DecisionLabel::Indeterminate => format!(
                "El modelo no es concluyente ('{label}'); el pico de importancia de {:.p$} en (fila {}, columna {}) es {:.p$}× el promedio.",
                peak.value, peak.row, peak.col, peak.ratio,
            ),
        }
    }
}

// ── Source ────────────────────────────────────────────────────────────────────

/// Access to the external attribution subsystem.
///
/// Implementations can wrap:
/// - a grid already computed upstream
/// - a subsystem that is down or not configured
/// - mock data (testing)
pub trait AttributionSource: Send + Sync {
    fn attribution(&self) -> std::result::Result<AttributionGrid, AttributionError>;
}

/// A grid computed before the engine runs.
pub struct StaticAttribution {
    grid: AttributionGrid,
}

impl StaticAttribution {
    pub fn new(grid: AttributionGrid) -> Self {
        Self { grid }
    }
}

impl AttributionSource for StaticAttribution {
    fn attribution(&self) -> std::result::Result<AttributionGrid, AttributionError> {
        Ok(self.grid.clone())
    }
}

/// Subsystem absent or failed upstream.
pub struct UnavailableAttribution {
    reason: String,
}

impl UnavailableAttribution {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl AttributionSource for UnavailableAttribution {
    fn attribution(&self) -> std::result::Result<AttributionGrid, AttributionError> {
        Err(AttributionError::Unavailable(self.reason.clone()))
    }
}
