use super::domain::{MicroAction, TransitionPayload};
use super::lifecycle::MicroActionStatus;
use crate::workflows::orchestration::ActionId;
use crate::workflows::storage::RepositoryError;

/// Storage seam for micro-actions.
///
/// `commit_transition` must behave as a compare-and-set: it applies `payload` only while the
/// stored status still equals `from`, and returns `RepositoryError::Conflict` otherwise.
pub trait MicroActionRepository: Send + Sync {
    fn insert(&self, action: MicroAction) -> Result<MicroAction, RepositoryError>;
    fn fetch(&self, id: &ActionId) -> Result<Option<MicroAction>, RepositoryError>;
    fn commit_transition(
        &self,
        id: &ActionId,
        from: MicroActionStatus,
        payload: TransitionPayload,
    ) -> Result<MicroAction, RepositoryError>;
}
