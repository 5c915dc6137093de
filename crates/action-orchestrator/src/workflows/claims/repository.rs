use super::domain::{ChecklistInstance, Claim, ClaimId};
use crate::workflows::storage::RepositoryError;

/// Storage seam for claims.
///
/// `commit` is a compare-and-set on `revision`: it stores `claim` with `expected_revision + 1`
/// only while the stored revision still equals `expected_revision`, and returns
/// `RepositoryError::Conflict` otherwise.
pub trait ClaimRepository: Send + Sync {
    fn insert(&self, claim: Claim) -> Result<Claim, RepositoryError>;
    fn load_claim(&self, id: &ClaimId) -> Result<Option<Claim>, RepositoryError>;
    fn commit(&self, claim: Claim, expected_revision: u64) -> Result<Claim, RepositoryError>;

    fn load_checklist(&self, id: &ClaimId) -> Result<ChecklistInstance, RepositoryError> {
        self.load_claim(id)?
            .map(|claim| claim.checklist)
            .ok_or(RepositoryError::NotFound)
    }
}
