use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{MicroAction, TransitionPayload};
use super::lifecycle::{LifecycleState, MicroActionStatus, TransitionCheck, TransitionError};
use super::planner::plan_micro_actions;
use super::record::{CompletionDraft, CompletionRecord, CompletionValidationError};
use super::repository::MicroActionRepository;
use crate::clock::Clock;
use crate::workflows::evidence::EvidencePolicy;
use crate::workflows::notice::Notice;
use crate::workflows::orchestration::{ActionId, OrchestrationSummary};
use crate::workflows::storage::RepositoryError;

/// Result of a complete/dismiss call. `changed` is false for an idempotent retry.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTransition {
    pub action: MicroAction,
    pub changed: bool,
    pub notice: Notice,
}

/// Applies the micro-action lifecycle against the repository.
pub struct CompletionService<R> {
    repository: Arc<R>,
    policy: EvidencePolicy,
    clock: Arc<dyn Clock>,
}

impl<R> CompletionService<R>
where
    R: MicroActionRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: EvidencePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            policy,
            clock,
        }
    }

    /// Insert pending micro-actions for the top of a freshly computed summary.
    /// Actions that already exist keep their stored state.
    pub fn seed_from_summary(
        &self,
        summary: &OrchestrationSummary,
        limit: usize,
    ) -> Result<Vec<MicroAction>, CompletionServiceError> {
        let mut seeded = Vec::new();
        for planned in plan_micro_actions(summary, limit) {
            match self.repository.fetch(&planned.id)? {
                Some(existing) => seeded.push(existing),
                None => seeded.push(self.repository.insert(planned)?),
            }
        }
        Ok(seeded)
    }

    pub fn complete_action(
        &self,
        action_id: &ActionId,
        draft: CompletionDraft,
    ) -> Result<ActionTransition, CompletionServiceError> {
        let action = self.fetch(action_id)?;

        if action.status.check(MicroActionStatus::Completed)? == TransitionCheck::AlreadyApplied {
            info!(%action_id, "completion retried on completed action");
            return Ok(ActionTransition {
                action,
                changed: false,
                notice: Notice::info("Action was already marked complete"),
            });
        }

        let record = match CompletionRecord::validate(draft, &self.policy, self.clock.now()) {
            Ok(record) => record,
            Err(error) => {
                warn!(%action_id, %error, "completion rejected");
                return Err(error.into());
            }
        };

        let committed = self.repository.commit_transition(
            action_id,
            action.status,
            TransitionPayload::Completion(record),
        )?;
        info!(%action_id, "action completed");

        Ok(ActionTransition {
            action: committed,
            changed: true,
            notice: Notice::success("Action marked complete"),
        })
    }

    pub fn dismiss_action(
        &self,
        action_id: &ActionId,
    ) -> Result<ActionTransition, CompletionServiceError> {
        let action = self.fetch(action_id)?;

        if action.status.check(MicroActionStatus::Dismissed)? == TransitionCheck::AlreadyApplied {
            return Ok(ActionTransition {
                action,
                changed: false,
                notice: Notice::info("Action was already dismissed"),
            });
        }

        let committed = self.repository.commit_transition(
            action_id,
            action.status,
            TransitionPayload::Dismissal {
                dismissed_at: self.clock.now(),
            },
        )?;
        info!(%action_id, "action dismissed");

        Ok(ActionTransition {
            action: committed,
            changed: true,
            notice: Notice::info("Action dismissed"),
        })
    }

    pub fn get(&self, action_id: &ActionId) -> Result<MicroAction, CompletionServiceError> {
        self.fetch(action_id)
    }

    fn fetch(&self, action_id: &ActionId) -> Result<MicroAction, CompletionServiceError> {
        let action = self
            .repository
            .fetch(action_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(action)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompletionServiceError {
    #[error(transparent)]
    Validation(#[from] CompletionValidationError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
