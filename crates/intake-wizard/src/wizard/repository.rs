use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::domain::{StepKind, StepState, StepStates};

/// Identifier wrapper for an in-flight submission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

/// Storage seam for per-step state. Callers serialize writes per submission.
pub trait StepStateStore: Send + Sync {
    fn load(&self, id: &SubmissionId, step: StepKind) -> Result<Option<StepState>, StoreError>;
    fn load_all(&self, id: &SubmissionId) -> Result<StepStates, StoreError>;
    fn save(&self, id: &SubmissionId, step: StepKind, state: StepState) -> Result<(), StoreError>;
    fn discard(&self, id: &SubmissionId) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("submission not found")]
    NotFound,
    #[error("step state store unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store for tests and command-line walkthroughs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStepStateStore {
    submissions: Arc<Mutex<HashMap<SubmissionId, StepStates>>>,
}

impl InMemoryStepStateStore {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<SubmissionId, StepStates>>, StoreError> {
        self.submissions
            .lock()
            .map_err(|_| StoreError::Unavailable("step state mutex poisoned".to_string()))
    }
}

impl StepStateStore for InMemoryStepStateStore {
    fn load(&self, id: &SubmissionId, step: StepKind) -> Result<Option<StepState>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.get(id).and_then(|states| states.get(&step)).cloned())
    }

    fn load_all(&self, id: &SubmissionId) -> Result<StepStates, StoreError> {
        let guard = self.lock()?;
        Ok(guard.get(id).cloned().unwrap_or_default())
    }

    fn save(&self, id: &SubmissionId, step: StepKind, state: StepState) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        guard.entry(id.clone()).or_default().insert(step, state);
        Ok(())
    }

    fn discard(&self, id: &SubmissionId) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}
