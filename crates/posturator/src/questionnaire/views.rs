use serde::Serialize;

use crate::catalog::{self, Product};

use super::blueprint::QuestionnaireBlueprint;
use super::domain::{Answer, Node, PainAnswer, PainSeverity, ScreeningProfile, StepId, Terminal};
use super::evaluation::Verdict;
use super::flow::{FlowState, Transition};
use super::repository::SessionId;

/// Serializable snapshot of a questionnaire session for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub node: Node,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal: Option<TerminalView>,
    pub answered: Vec<StepId>,
    pub can_go_back: bool,
    pub profile: ScreeningProfile,
}

impl SessionView {
    pub fn from_state(
        session_id: Option<SessionId>,
        state: &FlowState,
        blueprint: &QuestionnaireBlueprint,
    ) -> Self {
        let node = state.current();
        let step = node.step().map(|step| StepView::new(step, state, blueprint));
        let terminal = node
            .terminal()
            .map(|terminal| TerminalView::new(terminal, state.profile(), blueprint));

        Self {
            session_id,
            node,
            step,
            terminal,
            answered: state.path().to_vec(),
            can_go_back: !node.is_terminal() && !state.path().is_empty(),
            profile: state.profile().clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub id: StepId,
    pub title: &'static str,
    pub prompt: &'static str,
    pub progress_percent: u8,
    pub accepts_units: bool,
    /// Answer stored from an earlier pass, shown when the user navigated back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_answer: Option<Answer>,
}

impl StepView {
    fn new(step: StepId, state: &FlowState, blueprint: &QuestionnaireBlueprint) -> Self {
        let template = blueprint.step(step);
        Self {
            id: step,
            title: template.title,
            prompt: template.prompt,
            progress_percent: template.progress_percent,
            accepts_units: template.accepts_units,
            previous_answer: state.answer(step).cloned(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TerminalView {
    pub id: Terminal,
    pub title: &'static str,
    pub message: &'static str,
    pub rejected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pain: Option<PainSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<Product>,
}

impl TerminalView {
    fn new(terminal: Terminal, profile: &ScreeningProfile, blueprint: &QuestionnaireBlueprint) -> Self {
        let template = blueprint.terminal(terminal);
        let complete = terminal == Terminal::Complete;
        Self {
            id: terminal,
            title: template.title,
            message: template.message,
            rejected: terminal.is_rejection(),
            pain: if complete {
                profile.pain.and_then(PainSummary::from_answer)
            } else {
                None
            },
            products: if complete {
                catalog::products().to_vec()
            } else {
                Vec::new()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PainSummary {
    pub level: u8,
    pub severity: PainSeverity,
    pub label: &'static str,
    pub description: &'static str,
}

impl PainSummary {
    pub fn from_answer(answer: PainAnswer) -> Option<Self> {
        match answer {
            PainAnswer::None => None,
            PainAnswer::Rated(level) => {
                let severity = level.severity();
                Some(Self {
                    level: level.value(),
                    severity,
                    label: severity.label(),
                    description: severity.description(),
                })
            }
        }
    }
}

/// Result of one submission: the verdict plus the session as it now stands.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionView {
    pub from: StepId,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub finished: bool,
    pub session: SessionView,
}

impl TransitionView {
    pub fn new(transition: &Transition, session: SessionView) -> Self {
        let message = match &transition.verdict {
            Verdict::Invalid { error } => Some(error.to_string()),
            Verdict::Reject { reason } => Some(reason.summary()),
            Verdict::Continue { .. } => None,
        };

        Self {
            from: transition.from,
            verdict: transition.verdict.clone(),
            message,
            finished: transition.node.is_terminal(),
            session,
        }
    }
}
