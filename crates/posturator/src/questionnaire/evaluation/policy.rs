use super::super::domain::{Node, StepId, Terminal};
use super::config::MeasurementRange;
use serde::{Deserialize, Serialize};

/// Decision for one submitted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Continue { next: Node },
    Reject { reason: RejectReason },
    Invalid { error: InvalidInput },
}

impl Verdict {
    /// Node the flow sits on after this verdict is applied at `current`.
    pub fn destination(&self, current: StepId) -> Node {
        match self {
            Verdict::Continue { next } => *next,
            Verdict::Reject { reason } => Node::Terminal(reason.exit()),
            Verdict::Invalid { .. } => Node::Step(current),
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Verdict::Invalid { .. })
    }

    pub fn summary(&self) -> String {
        match self {
            Verdict::Continue { next } => format!("continue to {}", next.label()),
            Verdict::Reject { reason } => reason.summary(),
            Verdict::Invalid { error } => format!("invalid input: {error}"),
        }
    }
}

/// Measurement that fell outside the eligible range. Each maps to its own exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    AgeBelowMinimum {
        age: i64,
        minimum: i64,
    },
    HeightOutOfRange {
        height_cm: f64,
        range: MeasurementRange,
    },
    WeightOutOfRange {
        weight_kg: f64,
        range: MeasurementRange,
    },
    WaistOutOfRange {
        waist_cm: f64,
        range: MeasurementRange,
    },
}

impl RejectReason {
    pub const fn exit(&self) -> Terminal {
        match self {
            RejectReason::AgeBelowMinimum { .. } => Terminal::AgeExit,
            RejectReason::HeightOutOfRange { .. } => Terminal::HeightExit,
            RejectReason::WeightOutOfRange { .. } => Terminal::WeightExit,
            RejectReason::WaistOutOfRange { .. } => Terminal::WaistExit,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            RejectReason::AgeBelowMinimum { age, minimum } => {
                format!("age {age} is below the minimum of {minimum}")
            }
            RejectReason::HeightOutOfRange { height_cm, range } => format!(
                "height {:.1} cm outside {:.0}-{:.0} cm",
                height_cm, range.min, range.max
            ),
            RejectReason::WeightOutOfRange { weight_kg, range } => format!(
                "weight {:.1} kg outside {:.0}-{:.0} kg",
                weight_kg, range.min, range.max
            ),
            RejectReason::WaistOutOfRange { waist_cm, range } => format!(
                "waist {:.1} cm outside {:.0}-{:.0} cm",
                waist_cm, range.min, range.max
            ),
        }
    }
}

/// Input that could not be evaluated. The user stays on the same step and retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum InvalidInput {
    #[error("Please enter your age")]
    MissingAge,
    #[error("Please enter your height")]
    MissingHeight,
    #[error("Please enter feet")]
    MissingFeet,
    #[error("Please enter your weight")]
    MissingWeight,
    #[error("Please enter your waist size")]
    MissingWaist,
    #[error("Please enter a valid number")]
    NotANumber,
    #[error("Please enter valid numbers")]
    NotNumbers,
    #[error("Please select an option")]
    ChoiceRequired,
    #[error("Please select your pain level")]
    PainLevelRequired,
    #[error("Pain level must be between 1 and 10")]
    PainLevelOutOfRange { level: u8 },
    #[error("Please upload at least one document")]
    DocumentsRequired,
}
