use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{Answer, Node, ScreeningProfile, StepId, Terminal};
use super::evaluation::{EligibilityConfig, EligibilityEvaluator, Verdict};

/// Answers collected so far and the node currently shown. One per questionnaire session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    current: Node,
    answers: BTreeMap<StepId, Answer>,
    path: Vec<StepId>,
    profile: ScreeningProfile,
}

impl FlowState {
    fn new() -> Self {
        Self {
            current: Node::Step(StepId::ENTRY),
            answers: BTreeMap::new(),
            path: Vec::new(),
            profile: ScreeningProfile::default(),
        }
    }

    pub fn current(&self) -> Node {
        self.current
    }

    pub fn current_step(&self) -> Option<StepId> {
        self.current.step()
    }

    pub fn terminal(&self) -> Option<Terminal> {
        self.current.terminal()
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn answer(&self, step: StepId) -> Option<&Answer> {
        self.answers.get(&step)
    }

    pub fn answers(&self) -> impl Iterator<Item = (&StepId, &Answer)> {
        self.answers.iter()
    }

    /// Steps accepted on the way to the current node, oldest first.
    pub fn path(&self) -> &[StepId] {
        &self.path
    }

    pub fn profile(&self) -> &ScreeningProfile {
        &self.profile
    }
}

/// Outcome of applying one answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition {
    pub from: StepId,
    pub verdict: Verdict,
    pub node: Node,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("questionnaire already ended at {}", .0.label())]
    Finished(Terminal),
    #[error("answer for {} submitted while {} is current", .submitted.label(), .current.label())]
    StepMismatch { current: StepId, submitted: StepId },
    #[error("already at the first question")]
    AtEntry,
}

/// Sequences evaluator calls over the questionnaire graph.
#[derive(Debug, Clone, Default)]
pub struct FlowController {
    evaluator: EligibilityEvaluator,
}

impl FlowController {
    pub fn new(config: EligibilityConfig) -> Self {
        Self {
            evaluator: EligibilityEvaluator::new(config),
        }
    }

    pub fn evaluator(&self) -> &EligibilityEvaluator {
        &self.evaluator
    }

    pub fn start(&self) -> FlowState {
        FlowState::new()
    }

    /// Applies `answer` to the current step. `Invalid` leaves the state untouched.
    pub fn submit(&self, state: &mut FlowState, answer: Answer) -> Result<Transition, FlowError> {
        let current = match state.current {
            Node::Terminal(terminal) => return Err(FlowError::Finished(terminal)),
            Node::Step(step) => step,
        };

        let submitted = answer.step();
        if submitted != current {
            return Err(FlowError::StepMismatch { current, submitted });
        }

        let assessment = self.evaluator.assess(&answer);
        let node = assessment.verdict.destination(current);

        if let Some(accepted) = &assessment.accepted {
            state.profile.record(accepted);
            state.answers.insert(current, answer);
            state.path.push(current);
            state.current = node;

            match &assessment.verdict {
                Verdict::Reject { reason } => {
                    info!(step = current.label(), exit = node.label(), reason = %reason.summary(), "questionnaire rejected");
                }
                _ => {
                    debug!(step = current.label(), next = node.label(), "step accepted");
                }
            }
            if node == Node::Terminal(Terminal::Complete) {
                info!(steps = state.path.len(), "questionnaire completed");
            }
        }

        Ok(Transition {
            from: current,
            verdict: assessment.verdict,
            node,
        })
    }

    /// Returns to the previously answered step. Stored answers are kept until resubmitted.
    pub fn back(&self, state: &mut FlowState) -> Result<StepId, FlowError> {
        if let Node::Terminal(terminal) = state.current {
            return Err(FlowError::Finished(terminal));
        }

        let previous = state.path.pop().ok_or(FlowError::AtEntry)?;
        state.current = Node::Step(previous);
        Ok(previous)
    }
}
