use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::questionnaire::domain::{Answer, DocumentDescriptor, YesNo};
use crate::questionnaire::repository::{
    RecordChange, RepositoryError, SessionId, SessionRecord, SessionRepository,
};
use crate::questionnaire::{
    questionnaire_router, EligibilityConfig, EligibilityEvaluator, QuestionnaireService,
};

pub(super) fn eligibility_config() -> EligibilityConfig {
    EligibilityConfig::standard()
}

pub(super) fn evaluator() -> EligibilityEvaluator {
    EligibilityEvaluator::new(eligibility_config())
}

pub(super) fn build_service() -> (QuestionnaireService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = QuestionnaireService::new(repository.clone(), eligibility_config());
    (service, repository)
}

pub(super) fn router_with_service(service: QuestionnaireService<MemoryRepository>) -> axum::Router {
    questionnaire_router(Arc::new(service))
}

/// Answers that carry a session from Age to the spine history question.
pub(super) fn measurements() -> Vec<Answer> {
    vec![
        Answer::age("25"),
        Answer::height_cm("175"),
        Answer::weight_kg("70"),
        Answer::waist_cm("80"),
    ]
}

pub(super) fn yes(step: crate::questionnaire::StepId) -> Answer {
    Answer::choice(step, Some(YesNo::Yes)).expect("choice step")
}

pub(super) fn no(step: crate::questionnaire::StepId) -> Answer {
    Answer::choice(step, Some(YesNo::No)).expect("choice step")
}

pub(super) fn report() -> DocumentDescriptor {
    DocumentDescriptor {
        name: "mri-lumbar.pdf".to_string(),
        size_bytes: 482_113,
        uploaded_on: NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"),
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
}

impl MemoryRepository {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl SessionRepository for MemoryRepository {
    fn insert(&self, record: SessionRecord) -> Result<SessionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn modify<T, F>(&self, id: &SessionId, apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut SessionRecord) -> (RecordChange, T),
    {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let mut working = guard.get(id).cloned().ok_or(RepositoryError::NotFound)?;
        let (change, value) = apply(&mut working);
        match change {
            RecordChange::Unchanged => {}
            RecordChange::Updated => {
                guard.insert(*id, working);
            }
            RecordChange::Removed => {
                guard.remove(id);
            }
        }
        Ok(value)
    }
}

pub(super) struct ConflictRepository;

impl SessionRepository for ConflictRepository {
    fn insert(&self, _record: SessionRecord) -> Result<SessionRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        Ok(None)
    }

    fn modify<T, F>(&self, _id: &SessionId, _apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut SessionRecord) -> (RecordChange, T),
    {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl SessionRepository for UnavailableRepository {
    fn insert(&self, _record: SessionRecord) -> Result<SessionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<SessionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn modify<T, F>(&self, _id: &SessionId, _apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut SessionRecord) -> (RecordChange, T),
    {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
