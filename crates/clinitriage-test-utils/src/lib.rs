//! Shared fixtures for clinitriage tests.

use clinitriage_engine::attribution::{AttributionError, AttributionGrid, AttributionSource};
use clinitriage_engine::LabRecord;
use std::sync::atomic::{AtomicUsize, Ordering};

// ── Lab panels ───────────────────────────────────────────────────────────────

/// Every known analyte inside its reference interval.
pub fn in_range_panel() -> LabRecord {
    LabRecord::new()
        .with("red_blood_cells", 5.0)
        .with("white_blood_cells", 6000.0)
        .with("platelets", 200000.0)
        .with("hemoglobin", 15.0)
        .with("glucose", 90.0)
        .with("bacteria_presence", 0.0)
}

/// Low hemoglobin, everything else in range, no bacteria reading.
pub fn anemia_panel() -> LabRecord {
    LabRecord::new()
        .with("hemoglobin", 10.0)
        .with("glucose", 95.0)
        .with("platelets", 200000.0)
        .with("white_blood_cells", 6000.0)
        .with("red_blood_cells", 5.0)
}

/// JSON payload form of a record.
pub fn panel_json(record: &LabRecord) -> String {
    serde_json::to_string(record).expect("lab record serializes")
}

// ── Attribution grids ────────────────────────────────────────────────────────

/// Single-channel grid at 0.01 with one cell raised to `value`.
pub fn hotspot_grid(height: usize, width: usize, row: usize, col: usize, value: f64) -> AttributionGrid {
    let mut rows = vec![vec![0.01; width]; height];
    rows[row][col] = value;
    AttributionGrid::from_rows(rows).expect("valid hotspot grid")
}

pub fn zero_grid(height: usize, width: usize) -> AttributionGrid {
    AttributionGrid::from_rows(vec![vec![0.0; width]; height]).expect("valid zero grid")
}

// ── Mock attribution source ──────────────────────────────────────────────────

/// Attribution source returning a canned result and counting calls.
pub struct MockAttribution {
    result: Result<AttributionGrid, AttributionError>,
    calls: AtomicUsize,
}

impl MockAttribution {
    pub fn with_grid(grid: AttributionGrid) -> Self {
        Self { result: Ok(grid), calls: AtomicUsize::new(0) }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            result: Err(AttributionError::Unavailable(reason.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AttributionSource for MockAttribution {
    fn attribution(&self) -> Result<AttributionGrid, AttributionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
