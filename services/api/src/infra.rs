use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use action_orchestrator::workflows::claims::{Claim, ClaimId, ClaimRepository};
use action_orchestrator::workflows::completion::{
    MicroAction, MicroActionRepository, MicroActionStatus, TransitionPayload,
};
use action_orchestrator::workflows::evidence::{
    PhotoFile, PhotoId, PhotoUploader, UploadError, UploadedPhoto,
};
use action_orchestrator::workflows::orchestration::{
    ActionId, CandidateSignals, PropertyId, SignalRepository,
};
use action_orchestrator::workflows::RepositoryError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn guard<'a, T>(
    mutex: &'a Mutex<T>,
    store: &str,
) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{store} store lock poisoned")))
}

#[derive(Default)]
pub(crate) struct InMemorySignalRepository {
    by_property: Mutex<HashMap<PropertyId, CandidateSignals>>,
}

impl InMemorySignalRepository {
    /// Replace the candidate set for a property, as an upstream ingestion run would.
    pub(crate) fn replace(
        &self,
        property_id: PropertyId,
        signals: CandidateSignals,
    ) -> Result<(), RepositoryError> {
        guard(&self.by_property, "signal")?.insert(property_id, signals);
        Ok(())
    }
}

impl SignalRepository for InMemorySignalRepository {
    fn load_candidate_signals(
        &self,
        property_id: &PropertyId,
    ) -> Result<CandidateSignals, RepositoryError> {
        guard(&self.by_property, "signal")?
            .get(property_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default)]
pub(crate) struct InMemoryMicroActionRepository {
    records: Mutex<HashMap<ActionId, MicroAction>>,
}

impl MicroActionRepository for InMemoryMicroActionRepository {
    fn insert(&self, action: MicroAction) -> Result<MicroAction, RepositoryError> {
        let mut records = guard(&self.records, "micro-action")?;
        if records.contains_key(&action.id) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(action.id.clone(), action.clone());
        Ok(action)
    }

    fn fetch(&self, id: &ActionId) -> Result<Option<MicroAction>, RepositoryError> {
        Ok(guard(&self.records, "micro-action")?.get(id).cloned())
    }

    fn commit_transition(
        &self,
        id: &ActionId,
        from: MicroActionStatus,
        payload: TransitionPayload,
    ) -> Result<MicroAction, RepositoryError> {
        let mut records = guard(&self.records, "micro-action")?;
        let action = records.get_mut(id).ok_or(RepositoryError::NotFound)?;
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
        Ok(action.clone())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryClaimRepository {
    records: Mutex<HashMap<ClaimId, Claim>>,
}

impl ClaimRepository for InMemoryClaimRepository {
    fn insert(&self, claim: Claim) -> Result<Claim, RepositoryError> {
        let mut records = guard(&self.records, "claim")?;
        if records.contains_key(&claim.id) {
            return Err(RepositoryError::Conflict);
        }
        records.insert(claim.id.clone(), claim.clone());
        Ok(claim)
    }

    fn load_claim(&self, id: &ClaimId) -> Result<Option<Claim>, RepositoryError> {
        Ok(guard(&self.records, "claim")?.get(id).cloned())
    }

    fn commit(&self, mut claim: Claim, expected_revision: u64) -> Result<Claim, RepositoryError> {
        let mut records = guard(&self.records, "claim")?;
        let stored = records.get(&claim.id).ok_or(RepositoryError::NotFound)?;
        if stored.revision != expected_revision {
            return Err(RepositoryError::Conflict);
        }
        claim.revision = expected_revision + 1;
        records.insert(claim.id.clone(), claim.clone());
        Ok(claim)
    }
}

/// Stand-in for the photo storage service: assigns ids and thumbnail URLs without persisting
/// the bytes.
#[derive(Debug, Clone)]
pub(crate) struct DemoPhotoUploader {
    base_url: String,
}

impl Default for DemoPhotoUploader {
    fn default() -> Self {
        Self {
            base_url: "https://evidence.local/thumbnails".to_string(),
        }
    }
}

#[async_trait]
impl PhotoUploader for DemoPhotoUploader {
    async fn upload(
        &self,
        file: PhotoFile,
        order_index: usize,
    ) -> Result<UploadedPhoto, UploadError> {
        let extension = mime_guess::get_mime_extensions_str(&file.content_type)
            .and_then(|extensions| extensions.first())
            .copied()
            .unwrap_or("img");
        let id = Uuid::new_v4();

        Ok(UploadedPhoto {
            id: PhotoId(format!("photo-{id}")),
            thumbnail_url: format!("{}/{order_index}-{id}.{extension}", self.base_url),
        })
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD"))
}
