//! Micro-action completion.
//!
//! Surfaced actions become pending micro-actions. Each one completes or dismisses exactly once;
//! retries of the same terminal move are answered from storage, and any other move out of a
//! terminal state is refused.

pub mod domain;
pub mod lifecycle;
mod planner;
pub mod record;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{MicroAction, TransitionPayload};
pub use lifecycle::{
    ChecklistItemStatus, LifecycleState, MicroActionStatus, TransitionCheck, TransitionError,
};
pub use planner::plan_micro_actions;
pub use record::{CompletionDraft, CompletionRecord, CompletionValidationError, MAX_NOTES_CHARS};
pub use repository::MicroActionRepository;
pub use router::completion_router;
pub use service::{ActionTransition, CompletionService, CompletionServiceError};
