mod config;
mod policy;
pub(crate) mod rules;

pub use config::{EligibilityConfig, MeasurementRange};
pub use policy::{InvalidInput, RejectReason, Verdict};

use super::domain::{AcceptedAnswer, Answer};
use tracing::debug;

/// Stateless evaluator applying the eligibility thresholds to one answer at a time.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEvaluator {
    config: EligibilityConfig,
}

impl EligibilityEvaluator {
    pub fn new(config: EligibilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    pub fn evaluate(&self, answer: &Answer) -> Verdict {
        self.assess(answer).verdict
    }

    /// Evaluates and also hands back the normalized value when the input parsed.
    pub fn assess(&self, answer: &Answer) -> Assessment {
        let step = answer.step();
        match rules::normalize(answer) {
            Ok(accepted) => {
                let verdict = rules::route(step, &accepted, &self.config);
                Assessment {
                    verdict,
                    accepted: Some(accepted),
                }
            }
            Err(error) => {
                debug!(step = step.label(), %error, "answer failed input validation");
                Assessment {
                    verdict: Verdict::Invalid { error },
                    accepted: None,
                }
            }
        }
    }
}

/// Evaluation output: the verdict plus the canonical value behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub verdict: Verdict,
    pub accepted: Option<AcceptedAnswer>,
}
