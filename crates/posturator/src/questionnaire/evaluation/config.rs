use serde::{Deserialize, Serialize};

/// Closed interval in canonical units. Values equal to either bound are inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRange {
    pub min: f64,
    pub max: f64,
}

impl MeasurementRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        !(value < self.min || value > self.max)
    }
}

/// Eligibility thresholds applied by the questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    pub minimum_age: i64,
    pub height_cm: MeasurementRange,
    pub weight_kg: MeasurementRange,
    pub waist_cm: MeasurementRange,
}

impl EligibilityConfig {
    pub const fn standard() -> Self {
        Self {
            minimum_age: 12,
            height_cm: MeasurementRange::new(140.0, 210.0),
            weight_kg: MeasurementRange::new(45.0, 120.0),
            waist_cm: MeasurementRange::new(60.0, 120.0),
        }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self::standard()
    }
}
