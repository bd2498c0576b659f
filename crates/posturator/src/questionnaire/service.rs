use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::blueprint::QuestionnaireBlueprint;
use super::domain::{Answer, StepId};
use super::evaluation::{EligibilityConfig, Verdict};
use super::flow::{FlowController, FlowError};
use super::repository::{
    RecordChange, RepositoryError, SessionId, SessionRecord, SessionRepository,
};
use super::views::{SessionView, TransitionView};

/// Service hosting questionnaire sessions on top of a session repository.
pub struct QuestionnaireService<R> {
    repository: Arc<R>,
    controller: Arc<FlowController>,
    blueprint: Arc<QuestionnaireBlueprint>,
}

impl<R> QuestionnaireService<R>
where
    R: SessionRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: EligibilityConfig) -> Self {
        Self {
            repository,
            controller: Arc::new(FlowController::new(config)),
            blueprint: Arc::new(QuestionnaireBlueprint::standard()),
        }
    }

    pub fn blueprint(&self) -> &QuestionnaireBlueprint {
        &self.blueprint
    }

    /// Open a new session positioned at the entry step.
    pub fn start(&self) -> Result<SessionView, QuestionnaireServiceError> {
        let now = Utc::now();
        let record = SessionRecord {
            id: SessionId::generate(),
            state: self.controller.start(),
            started_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(record)?;
        info!(session = %stored.id, "questionnaire session started");
        Ok(stored.view(&self.blueprint))
    }

    /// Apply an answer to the session's current step.
    ///
    /// Invalid input leaves the stored session untouched. Reaching a terminal
    /// node discards the session.
    pub fn submit(
        &self,
        id: &SessionId,
        answer: Answer,
    ) -> Result<TransitionView, QuestionnaireServiceError> {
        let outcome = self.repository.modify(id, |record| {
            let transition = match self.controller.submit(&mut record.state, answer) {
                Ok(transition) => transition,
                Err(error) => return (RecordChange::Unchanged, Err(error)),
            };

            let change = match &transition.verdict {
                Verdict::Invalid { .. } => RecordChange::Unchanged,
                _ if transition.node.is_terminal() => RecordChange::Removed,
                _ => {
                    record.updated_at = Utc::now();
                    RecordChange::Updated
                }
            };
            let view = TransitionView::new(&transition, record.view(&self.blueprint));
            (change, Ok(view))
        })?;

        let view = outcome?;
        if view.finished {
            info!(session = %id, terminal = view.session.node.label(), "questionnaire session closed");
        }
        Ok(view)
    }

    /// Step back to the previously answered question.
    pub fn back(&self, id: &SessionId) -> Result<(StepId, SessionView), QuestionnaireServiceError> {
        let outcome = self.repository.modify(id, |record| {
            match self.controller.back(&mut record.state) {
                Ok(step) => {
                    record.updated_at = Utc::now();
                    (RecordChange::Updated, Ok((step, record.view(&self.blueprint))))
                }
                Err(error) => (RecordChange::Unchanged, Err(error)),
            }
        })?;
        Ok(outcome?)
    }

    pub fn get(&self, id: &SessionId) -> Result<SessionView, QuestionnaireServiceError> {
        Ok(self.load(id)?.view(&self.blueprint))
    }

    fn load(&self, id: &SessionId) -> Result<SessionRecord, QuestionnaireServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QuestionnaireServiceError {
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
