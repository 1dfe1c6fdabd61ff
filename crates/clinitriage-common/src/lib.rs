//! clinitriage-common: Shared error type and diagnostic vocabulary used across all clinitriage crates.

pub mod error;
pub mod labels;

// Re-export commonly used types
pub use error::{Result, TriageError};
pub use labels::{DecisionLabel, RangeStatus};
