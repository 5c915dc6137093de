use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::clock::FixedClock;
use crate::workflows::claims::domain::{Claim, ClaimId, ClaimType};
use crate::workflows::claims::repository::ClaimRepository;
use crate::workflows::claims::service::ClaimService;
use crate::workflows::orchestration::PropertyId;
use crate::workflows::storage::RepositoryError;

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 2, 15, 30, 0).unwrap()
}

pub(super) fn property() -> PropertyId {
    PropertyId("prop-1".to_string())
}

pub(super) fn build_service() -> (ClaimService<MemoryClaims>, Arc<MemoryClaims>) {
    let repository = Arc::new(MemoryClaims::default());
    let service = ClaimService::new(repository.clone(), Arc::new(FixedClock(now())));
    (service, repository)
}

/// Opens a claim of `claim_type` and returns its id.
pub(super) fn open(service: &ClaimService<MemoryClaims>, claim_type: ClaimType) -> ClaimId {
    service
        .open_claim(property(), claim_type)
        .expect("claim opens")
        .claim
        .id
}

#[derive(Default)]
pub(super) struct MemoryClaims {
    records: Mutex<HashMap<ClaimId, Claim>>,
}

impl MemoryClaims {
    pub(super) fn stored(&self, id: &ClaimId) -> Claim {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
            .expect("claim stored")
    }

    /// Simulates a concurrent writer committing first.
    pub(super) fn bump_revision(&self, id: &ClaimId) {
        if let Some(claim) = self
            .records
            .lock()
            .expect("repository mutex poisoned")
            .get_mut(id)
        {
            claim.revision += 1;
        }
    }
}

impl ClaimRepository for MemoryClaims {
    fn insert(&self, claim: Claim) -> Result<Claim, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&claim.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(claim.id.clone(), claim.clone());
        Ok(claim)
    }

    fn load_claim(&self, id: &ClaimId) -> Result<Option<Claim>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn commit(&self, mut claim: Claim, expected_revision: u64) -> Result<Claim, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard.get(&claim.id).ok_or(RepositoryError::NotFound)?;
        if stored.revision != expected_revision {
            return Err(RepositoryError::Conflict);
        }
        claim.revision = expected_revision + 1;
        guard.insert(claim.id.clone(), claim.clone());
        Ok(claim)
    }
}
