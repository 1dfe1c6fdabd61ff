//! Runtime configuration for clinitriage.
//!
//! Reads clinitriage.toml from the current directory or the path in the
//! CLINITRIAGE_CONFIG env var. Every field has a default, so a missing file
//! simply yields `TriageConfig::default()`.
//!
//! Reference intervals, syndrome rules and the transition table are not
//! configurable; they live in the engine's knowledge base.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Env var naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CLINITRIAGE_CONFIG";

/// File looked up in the working directory when the env var is unset.
pub const DEFAULT_CONFIG_FILE: &str = "clinitriage.toml";

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Malignancy decision thresholds
    #[serde(default)]
    pub decision: DecisionThresholds,

    /// Attribution explanation options
    #[serde(default)]
    pub attribution: AttributionConfig,

    /// Logging options
    #[serde(default)]
    pub logging: LoggingConfig,
}

// ── Decision Thresholds ──────────────────────────────────────────────────────

/// Hysteresis thresholds for the malignancy decision rules.
///
/// Rule order is fixed by the classifier; only the boundaries are tunable.
/// All comparisons are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionThresholds {
    /// At or above this the model is trusted outright (malignant)
    #[serde(default = "default_extreme_high")]
    pub extreme_high: f64,

    /// At or below this the model is trusted outright (benign)
    #[serde(default = "default_extreme_low")]
    pub extreme_low: f64,

    /// HIGH_THRESHOLD: lower edge of the malignant band
    #[serde(default = "default_high_threshold")]
    pub high_threshold: f64,

    /// LOW_THRESHOLD: upper edge of the benign band
    #[serde(default = "default_low_threshold")]
    pub low_threshold: f64,
}

fn default_extreme_high() -> f64 { 0.96 }
fn default_extreme_low() -> f64 { 0.04 }
fn default_high_threshold() -> f64 { 0.70 }
fn default_low_threshold() -> f64 { 0.30 }

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            extreme_high: default_extreme_high(),
            extreme_low: default_extreme_low(),
            high_threshold: default_high_threshold(),
            low_threshold: default_low_threshold(),
        }
    }
}

impl DecisionThresholds {
    /// Check `0 <= extreme_low <= low < high <= extreme_high <= 1`.
    pub fn validate(&self) -> anyhow::Result<()> {
        let ordered = 0.0 <= self.extreme_low
            && self.extreme_low <= self.low_threshold
            && self.low_threshold < self.high_threshold
            && self.high_threshold <= self.extreme_high
            && self.extreme_high <= 1.0;
        if !ordered {
            anyhow::bail!(
                "decision thresholds must satisfy 0 <= extreme_low ({}) <= low_threshold ({}) \
                 < high_threshold ({}) <= extreme_high ({}) <= 1",
                self.extreme_low,
                self.low_threshold,
                self.high_threshold,
                self.extreme_high
            );
        }
        Ok(())
    }
}

// ── Attribution ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributionConfig {
    /// Added to the mean magnitude before dividing
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Decimal places for the peak value and ratio in the rendered sentence
    #[serde(default = "default_precision")]
    pub precision: usize,
}

fn default_epsilon() -> f64 { 1e-8 }
fn default_precision() -> usize { 4 }

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            precision: default_precision(),
        }
    }
}

// ── Logging ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilter directive used when RUST_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String { "clinitriage=info,warn".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_filter() }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl TriageConfig {
    /// Load configuration.
    /// Checks CLINITRIAGE_CONFIG first, then clinitriage.toml in the current directory.
    /// Falls back to defaults when neither exists.
    pub fn load() -> anyhow::Result<Self> {
        match Self::discover() {
            Some(path) => Self::from_path(path),
            None => {
                tracing::debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// The file `load` reads, or `None` when it does not exist.
    pub fn discover() -> Option<PathBuf> {
        discover_from(std::env::var(CONFIG_ENV_VAR).ok())
    }

    /// Load from an explicit file, picking the format from its extension.
    /// Unknown extensions are read as TOML.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let config = match ext.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml(path)?,
            Some("json") => Self::from_json(path)?,
            _ => {
                let content = std::fs::read_to_string(path)?;
                Self::from_toml_str(&content)?
            }
        };

        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_json(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.decision.validate()?;
        if !(self.attribution.epsilon > 0.0) {
            anyhow::bail!("attribution.epsilon must be positive, got {}", self.attribution.epsilon);
        }
        Ok(())
    }
}

fn discover_from(env_value: Option<String>) -> Option<PathBuf> {
    let path = PathBuf::from(env_value.unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string()));
    path.exists().then_some(path)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
