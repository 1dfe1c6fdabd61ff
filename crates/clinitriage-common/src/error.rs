use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriageError {
    /// The blood-panel payload could not be turned into a lab record.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Probability out of range [0, 1]: {0}")]
    InvalidProbability(f64),

    #[error("Transition row for '{state}' sums to {sum}, expected 1.0")]
    InvalidTransitionTable { state: String, sum: f64 },

    #[error("Invalid attribution grid: {0}")]
    InvalidGrid(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;
