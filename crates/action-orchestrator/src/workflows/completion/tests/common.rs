use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::clock::FixedClock;
use crate::workflows::completion::domain::{MicroAction, TransitionPayload};
use crate::workflows::completion::lifecycle::MicroActionStatus;
use crate::workflows::completion::record::CompletionDraft;
use crate::workflows::completion::repository::MicroActionRepository;
use crate::workflows::completion::service::CompletionService;
use crate::workflows::evidence::EvidencePolicy;
use crate::workflows::orchestration::{ActionId, PropertyId};
use crate::workflows::storage::RepositoryError;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap()
}

pub(super) fn action_id(id: &str) -> ActionId {
    ActionId(id.to_string())
}

pub(super) fn pending(id: &str) -> MicroAction {
    MicroAction::pending(
        action_id(id),
        PropertyId("prop-1".to_string()),
        format!("Action {id}"),
        "High risk severity",
        60,
    )
}

pub(super) fn hired_draft() -> CompletionDraft {
    CompletionDraft {
        completed_at: now() - Duration::hours(1),
        cost: Some(180.0),
        did_it_myself: false,
        service_provider_name: Some("Acme Gutters".to_string()),
        service_provider_rating: Some(5),
        notes: "Cleared downspouts".to_string(),
        photo_ids: vec!["ph-1".to_string()],
    }
}

pub(super) fn build_service(
    actions: Vec<MicroAction>,
) -> (CompletionService<MemoryMicroActions>, Arc<MemoryMicroActions>) {
    let repository = Arc::new(MemoryMicroActions::with(actions));
    let service = CompletionService::new(
        repository.clone(),
        EvidencePolicy::default(),
        Arc::new(FixedClock(now())),
    );
    (service, repository)
}

#[derive(Default)]
pub(super) struct MemoryMicroActions {
    records: Mutex<HashMap<ActionId, MicroAction>>,
    commits: Mutex<usize>,
}

impl MemoryMicroActions {
    pub(super) fn with(actions: Vec<MicroAction>) -> Self {
        let repository = Self::default();
        {
            let mut guard = repository.records.lock().expect("repository mutex poisoned");
            for action in actions {
                guard.insert(action.id.clone(), action);
            }
        }
        repository
    }

    pub(super) fn stored(&self, id: &str) -> Option<MicroAction> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&action_id(id))
            .cloned()
    }

    pub(super) fn commits(&self) -> usize {
        *self.commits.lock().expect("commit mutex poisoned")
    }

    /// Simulates another writer finishing the action first.
    pub(super) fn overwrite_status(&self, id: &str, status: MicroActionStatus) {
        if let Some(action) = self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .get_mut(&action_id(id))
        {
            action.status = status;
        }
    }
}

impl MicroActionRepository for MemoryMicroActions {
    fn insert(&self, action: MicroAction) -> Result<MicroAction, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&action.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(action.id.clone(), action.clone());
        Ok(action)
    }

    fn fetch(&self, id: &ActionId) -> Result<Option<MicroAction>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn commit_transition(
        &self,
        id: &ActionId,
        from: MicroActionStatus,
        payload: TransitionPayload,
    ) -> Result<MicroAction, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let action = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if action.status != from {
            return Err(RepositoryError::Conflict);
        }

        action.status = payload.target();
        match payload {
            TransitionPayload::Completion(record) => action.completion = Some(record),
            TransitionPayload::Dismissal { dismissed_at } => {
                action.dismissed_at = Some(dismissed_at)
            }
        }
        *self.commits.lock().expect("commit mutex poisoned") += 1;
        Ok(action.clone())
    }
}

pub(super) struct UnavailableMicroActions;

impl MicroActionRepository for UnavailableMicroActions {
    fn insert(&self, _action: MicroAction) -> Result<MicroAction, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ActionId) -> Result<Option<MicroAction>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn commit_transition(
        &self,
        _id: &ActionId,
        _from: MicroActionStatus,
        _payload: TransitionPayload,
    ) -> Result<MicroAction, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
