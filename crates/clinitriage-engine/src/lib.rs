//! clinitriage-engine: Clinical decision and risk-projection engine.
//!
//! Turns raw numeric inputs (a malignancy probability, an attribution grid,
//! or a set of lab values) into structured, explainable reports. Everything
//! here is a pure function over its inputs plus the read-only
//! [`KnowledgeBase`]; model inference and attribution computation happen
//! upstream.

pub mod lab;
pub mod range;
pub mod syndrome;
pub mod markov;
pub mod decision;
pub mod attribution;
pub mod knowledge;
pub mod payload;
pub mod report;

pub use knowledge::KnowledgeBase;
pub use lab::LabRecord;
pub use report::{BloodReport, ImageReport, ReportAssembler};
