/// Failure reported by a storage collaborator.
///
/// `Conflict` is the compare-and-set rejection raised when a concurrent transition already moved
/// the record; callers surface it as "retry after refresh" and never resolve it themselves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record changed concurrently; retry after refresh")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
