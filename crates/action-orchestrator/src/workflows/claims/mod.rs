//! Insurance claims with checklist-gated submission.
//!
//! A claim carries one checklist instance built from its type's template. Submission is refused
//! while any required item is open or missing documents, and the refusal lists every blocking
//! item. Changing the claim type discards the checklist and instantiates the new template.

pub mod domain;
pub mod gating;
pub mod repository;
pub mod router;
pub mod service;
pub mod templates;

#[cfg(test)]
mod tests;

pub use domain::{
    BlockingItem, ChecklistInstance, ChecklistItem, Claim, ClaimId, ClaimStatus, ClaimType,
};
pub use gating::{gate_submission, SubmissionOutcome};
pub use repository::ClaimRepository;
pub use router::claim_router;
pub use service::{ClaimService, ClaimServiceError, ClaimUpdate, SubmissionResult};
pub use templates::{ChecklistTemplate, ItemTemplate};
