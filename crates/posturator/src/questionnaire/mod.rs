//! Posture-support eligibility questionnaire.
//!
//! Answers are evaluated one step at a time against fixed thresholds. The flow
//! controller walks the step graph, and the service hosts sessions behind a
//! repository so they can be driven over HTTP or from a terminal.

pub mod blueprint;
pub mod domain;
pub mod evaluation;
pub mod flow;
pub mod repository;
pub mod router;
pub mod service;
pub mod units;
pub mod views;

#[cfg(test)]
mod tests;

pub use blueprint::{QuestionnaireBlueprint, StepTemplate, TerminalTemplate};
pub use domain::{
    AcceptedAnswer, Answer, DocumentDescriptor, GirthInput, LengthInput, MassInput, Node,
    PainAnswer, PainLevel, PainLevelError, PainSeverity, ParseChoiceError, RawValue,
    ScreeningProfile, StepId, Terminal, UnitSystem, YesNo,
};
pub use evaluation::{
    Assessment, EligibilityConfig, EligibilityEvaluator, InvalidInput, MeasurementRange,
    RejectReason, Verdict,
};
pub use flow::{FlowController, FlowError, FlowState, Transition};
pub use repository::{
    RecordChange, RepositoryError, SessionId, SessionRecord, SessionRepository,
};
pub use router::questionnaire_router;
pub use service::{QuestionnaireService, QuestionnaireServiceError};
pub use views::{PainSummary, SessionView, StepView, TerminalView, TransitionView};
