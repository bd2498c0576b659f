use metrics_exporter_prometheus::PrometheusHandle;
use posturator::questionnaire::{
    EligibilityConfig, RecordChange, RepositoryError, SessionId, SessionRecord, SessionRepository,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Live questionnaire sessions. Nothing survives a restart.
#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    records: Arc<Mutex<HashMap<SessionId, SessionRecord>>>,
}

impl SessionRepository for InMemorySessionRepository {
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

#[cfg(test)]
impl InMemorySessionRepository {
    pub(crate) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

pub(crate) fn default_eligibility_config() -> EligibilityConfig {
    EligibilityConfig::standard()
}
