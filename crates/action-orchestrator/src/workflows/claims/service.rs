use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{BlockingItem, ChecklistInstance, Claim, ClaimId, ClaimStatus, ClaimType};
use super::gating::{gate_submission, SubmissionOutcome};
use super::repository::ClaimRepository;
use crate::clock::Clock;
use crate::workflows::completion::lifecycle::{
    ChecklistItemStatus, LifecycleState, TransitionCheck, TransitionError,
};
use crate::workflows::notice::Notice;
use crate::workflows::orchestration::PropertyId;
use crate::workflows::storage::RepositoryError;

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimUpdate {
    pub claim: Claim,
    pub changed: bool,
    pub notice: Notice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub outcome: SubmissionOutcome,
    pub notice: Notice,
}

/// Claim lifecycle and checklist gating.
pub struct ClaimService<R> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ClaimService<R>
where
    R: ClaimRepository + 'static,
{
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub fn open_claim(
        &self,
        property_id: PropertyId,
        claim_type: ClaimType,
    ) -> Result<ClaimUpdate, ClaimServiceError> {
        let claim = self
            .repository
            .insert(Claim::draft(ClaimId::generate(), property_id, claim_type))?;
        info!(claim_id = %claim.id, claim_type = claim_type.label(), "claim opened");

        Ok(ClaimUpdate {
            claim,
            changed: true,
            notice: Notice::success(format!("{} claim started", claim_type.label())),
        })
    }

    pub fn get_claim(&self, claim_id: &ClaimId) -> Result<Claim, ClaimServiceError> {
        self.fetch(claim_id)
    }

    /// Move the claim to `Submitted` if no required checklist item is blocking. A blocked
    /// attempt leaves the stored claim untouched.
    pub fn attempt_claim_submission(
        &self,
        claim_id: &ClaimId,
    ) -> Result<SubmissionResult, ClaimServiceError> {
        let mut claim = self.fetch(claim_id)?;

        if claim.status.check(ClaimStatus::Submitted)? == TransitionCheck::AlreadyApplied {
            return Ok(SubmissionResult {
                outcome: SubmissionOutcome::Submitted(claim),
                notice: Notice::info("Claim was already submitted"),
            });
        }

        if let Err(blocking) = gate_submission(&claim) {
            warn!(%claim_id, blocking = blocking.len(), "claim submission blocked");
            let notice = Notice::warning(blocked_message(&blocking));
            return Ok(SubmissionResult {
                outcome: SubmissionOutcome::blocked(blocking),
                notice,
            });
        }

        let expected = claim.revision;
        claim.status = ClaimStatus::Submitted;
        claim.submitted_at = Some(self.clock.now());
        let claim = self.repository.commit(claim, expected)?;
        info!(%claim_id, "claim submitted");

        Ok(SubmissionResult {
            outcome: SubmissionOutcome::Submitted(claim),
            notice: Notice::success("Claim submitted"),
        })
    }

    /// Replace the checklist with a fresh instance of the new type's template. Nothing from the
    /// previous checklist is carried over.
    pub fn change_claim_type(
        &self,
        claim_id: &ClaimId,
        claim_type: ClaimType,
    ) -> Result<ClaimUpdate, ClaimServiceError> {
        let mut claim = self.fetch_editable(claim_id)?;
        if claim.claim_type == claim_type {
            return Ok(unchanged(claim, "Claim type is unchanged"));
        }

        let expected = claim.revision;
        let previous = claim.claim_type;
        claim.claim_type = claim_type;
        claim.checklist = ChecklistInstance::instantiate(claim_type);
        let claim = self.repository.commit(claim, expected)?;
        info!(
            %claim_id,
            from = previous.label(),
            to = claim_type.label(),
            "claim type changed; checklist replaced"
        );

        Ok(ClaimUpdate {
            claim,
            changed: true,
            notice: Notice::info(format!(
                "Checklist reset for {} claim",
                claim_type.label().to_lowercase()
            )),
        })
    }

    /// Toggle a checklist item. Marking done stamps `completedAt`; undo clears it.
    pub fn set_item_status(
        &self,
        claim_id: &ClaimId,
        item_id: &str,
        status: ChecklistItemStatus,
    ) -> Result<ClaimUpdate, ClaimServiceError> {
        let mut claim = self.fetch_editable(claim_id)?;
        let now = self.clock.now();
        let expected = claim.revision;

        let item = claim
            .checklist
            .item_mut(item_id)
            .ok_or_else(|| ClaimServiceError::ItemNotFound(item_id.to_string()))?;
        if item.status.check(status)? == TransitionCheck::AlreadyApplied {
            let message = format!("{} is already {}", item.title, status.label());
            return Ok(unchanged(claim, message));
        }

        item.status = status;
        item.completed_at = match status {
            ChecklistItemStatus::Done => Some(now),
            ChecklistItemStatus::Open => None,
        };
        let notice = match status {
            ChecklistItemStatus::Done => Notice::success(format!("{} marked done", item.title)),
            ChecklistItemStatus::Open => Notice::info(format!("{} reopened", item.title)),
        };

        let claim = self.repository.commit(claim, expected)?;
        Ok(ClaimUpdate {
            claim,
            changed: true,
            notice,
        })
    }

    /// Record one received document against an item's outstanding count.
    pub fn record_document(
        &self,
        claim_id: &ClaimId,
        item_id: &str,
    ) -> Result<ClaimUpdate, ClaimServiceError> {
        let mut claim = self.fetch_editable(claim_id)?;
        let expected = claim.revision;

        let item = claim
            .checklist
            .item_mut(item_id)
            .ok_or_else(|| ClaimServiceError::ItemNotFound(item_id.to_string()))?;
        if item.missing_docs == 0 {
            let message = format!("{} has no outstanding documents", item.title);
            return Ok(unchanged(claim, message));
        }

        item.missing_docs -= 1;
        let notice = match item.missing_docs {
            0 => Notice::success(format!("All documents received for {}", item.title)),
            remaining => Notice::info(format!(
                "Document recorded for {}; {remaining} still missing",
                item.title
            )),
        };

        let claim = self.repository.commit(claim, expected)?;
        Ok(ClaimUpdate {
            claim,
            changed: true,
            notice,
        })
    }

    /// Move the claim forward along its progression. `Submitted` is only reachable through
    /// `attempt_claim_submission`.
    pub fn advance_status(
        &self,
        claim_id: &ClaimId,
        target: ClaimStatus,
    ) -> Result<ClaimUpdate, ClaimServiceError> {
        let mut claim = self.fetch(claim_id)?;

        if claim.status.check(target)? == TransitionCheck::AlreadyApplied {
            let message = format!("Claim is already {}", target.label());
            return Ok(unchanged(claim, message));
        }
        if target == ClaimStatus::Submitted {
            return Err(ClaimServiceError::GatedTransition);
        }

        let expected = claim.revision;
        let previous = claim.status;
        claim.status = target;
        let claim = self.repository.commit(claim, expected)?;
        info!(%claim_id, from = %previous, to = %target, "claim status advanced");

        Ok(ClaimUpdate {
            claim,
            changed: true,
            notice: Notice::success(format!("Claim moved to {}", target.label())),
        })
    }

    fn fetch(&self, claim_id: &ClaimId) -> Result<Claim, ClaimServiceError> {
        let claim = self
            .repository
            .load_claim(claim_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(claim)
    }

    fn fetch_editable(&self, claim_id: &ClaimId) -> Result<Claim, ClaimServiceError> {
        let claim = self.fetch(claim_id)?;
        if !claim.status.is_editable() {
            return Err(ClaimServiceError::Locked {
                status: claim.status,
            });
        }
        Ok(claim)
    }
}

fn unchanged(claim: Claim, message: impl Into<String>) -> ClaimUpdate {
    ClaimUpdate {
        claim,
        changed: false,
        notice: Notice::info(message),
    }
}

fn blocked_message(blocking: &[BlockingItem]) -> String {
    let titles: Vec<&str> = blocking.iter().map(|item| item.title.as_str()).collect();
    format!(
        "Finish {} checklist item(s) before submitting: {}",
        blocking.len(),
        titles.join(", ")
    )
}

#[derive(Debug, thiserror::Error)]
pub enum ClaimServiceError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("claim is {status} and can no longer be edited")]
    Locked { status: ClaimStatus },
    #[error("checklist item {0} not found")]
    ItemNotFound(String),
    #[error("SUBMITTED is reached through claim submission")]
    GatedTransition,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
