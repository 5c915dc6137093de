use serde::Serialize;

use super::domain::{BlockingItem, Claim, ClaimStatus};

/// Result of a submission attempt. A block is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SubmissionOutcome {
    Submitted(Claim),
    Blocked {
        blocked: bool,
        blocking: Vec<BlockingItem>,
    },
}

impl SubmissionOutcome {
    pub fn blocked(blocking: Vec<BlockingItem>) -> Self {
        SubmissionOutcome::Blocked {
            blocked: true,
            blocking,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, SubmissionOutcome::Blocked { .. })
    }
}

/// Decide whether `claim` may enter `Submitted`. Returns the full ordered blocking set when not.
pub fn gate_submission(claim: &Claim) -> Result<(), Vec<BlockingItem>> {
    if claim.status == ClaimStatus::Submitted {
        return Ok(());
    }

    let blocking = claim.checklist.blocking_items();
    if blocking.is_empty() {
        Ok(())
    } else {
        Err(blocking)
    }
}
