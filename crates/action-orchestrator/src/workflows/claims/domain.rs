use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::templates::ChecklistTemplate;
use crate::workflows::completion::lifecycle::{
    ChecklistItemStatus, LifecycleState, TransitionCheck, TransitionError,
};
use crate::workflows::orchestration::PropertyId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimId(pub String);

impl ClaimId {
    pub fn generate() -> Self {
        Self(format!("claim-{}", Uuid::new_v4()))
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimType {
    WaterDamage,
    Fire,
    Theft,
    WindHail,
    Liability,
    Other,
}

impl ClaimType {
    pub fn label(self) -> &'static str {
        match self {
            ClaimType::WaterDamage => "Water damage",
            ClaimType::Fire => "Fire",
            ClaimType::Theft => "Theft",
            ClaimType::WindHail => "Wind / hail",
            ClaimType::Liability => "Liability",
            ClaimType::Other => "Other",
        }
    }
}

/// Claim progression. Only forward moves are accepted, and the move into `Submitted` is gated
/// by the checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    Draft,
    InProgress,
    Submitted,
    UnderReview,
    Approved,
    Denied,
    Closed,
}

impl ClaimStatus {
    fn successors(self) -> &'static [ClaimStatus] {
        match self {
            ClaimStatus::Draft => &[ClaimStatus::InProgress, ClaimStatus::Submitted],
            ClaimStatus::InProgress => &[ClaimStatus::Submitted],
            ClaimStatus::Submitted => &[ClaimStatus::UnderReview],
            ClaimStatus::UnderReview => &[ClaimStatus::Approved, ClaimStatus::Denied],
            ClaimStatus::Approved | ClaimStatus::Denied => &[ClaimStatus::Closed],
            ClaimStatus::Closed => &[],
        }
    }

    /// Checklist and claim type may change only before submission.
    pub fn is_editable(self) -> bool {
        matches!(self, ClaimStatus::Draft | ClaimStatus::InProgress)
    }
}

impl LifecycleState for ClaimStatus {
    fn label(self) -> &'static str {
        match self {
            ClaimStatus::Draft => "DRAFT",
            ClaimStatus::InProgress => "IN_PROGRESS",
            ClaimStatus::Submitted => "SUBMITTED",
            ClaimStatus::UnderReview => "UNDER_REVIEW",
            ClaimStatus::Approved => "APPROVED",
            ClaimStatus::Denied => "DENIED",
            ClaimStatus::Closed => "CLOSED",
        }
    }

    fn check(self, target: Self) -> Result<TransitionCheck, TransitionError> {
        if self == target {
            Ok(TransitionCheck::AlreadyApplied)
        } else if self.successors().contains(&target) {
            Ok(TransitionCheck::Apply)
        } else {
            Err(self.refuse(target))
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "ChecklistItemView")]
pub struct ChecklistItem {
    pub id: String,
    pub title: String,
    pub required: bool,
    pub status: ChecklistItemStatus,
    pub missing_docs: u32,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ChecklistItem {
    /// Required for submission and either not done or still missing documents.
    pub fn blocking(&self) -> bool {
        self.required && (self.status != ChecklistItemStatus::Done || self.missing_docs > 0)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChecklistItemView {
    id: String,
    title: String,
    required: bool,
    status: ChecklistItemStatus,
    missing_docs: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    blocking: bool,
}

impl From<ChecklistItem> for ChecklistItemView {
    fn from(item: ChecklistItem) -> Self {
        let blocking = item.blocking();
        Self {
            id: item.id,
            title: item.title,
            required: item.required,
            status: item.status,
            missing_docs: item.missing_docs,
            completed_at: item.completed_at,
            blocking,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockingItem {
    pub id: String,
    pub title: String,
    pub missing_docs: u32,
}

/// One instantiation of a claim type's template. Replaced wholesale when the type changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistInstance {
    pub instance_id: Uuid,
    pub claim_type: ClaimType,
    pub items: Vec<ChecklistItem>,
}

impl ChecklistInstance {
    pub fn instantiate(claim_type: ClaimType) -> Self {
        let template = ChecklistTemplate::for_claim_type(claim_type);
        let items = template
            .items
            .iter()
            .map(|item| ChecklistItem {
                id: item.key.to_string(),
                title: item.title.to_string(),
                required: item.required,
                status: ChecklistItemStatus::Open,
                missing_docs: item.required_docs,
                completed_at: None,
            })
            .collect();

        Self {
            instance_id: Uuid::new_v4(),
            claim_type,
            items,
        }
    }

    /// Blocking items in checklist order.
    pub fn blocking_items(&self) -> Vec<BlockingItem> {
        self.items
            .iter()
            .filter(|item| item.blocking())
            .map(|item| BlockingItem {
                id: item.id.clone(),
                title: item.title.clone(),
                missing_docs: item.missing_docs,
            })
            .collect()
    }

    pub fn item(&self, item_id: &str) -> Option<&ChecklistItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut ChecklistItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: ClaimId,
    pub property_id: PropertyId,
    pub claim_type: ClaimType,
    pub status: ClaimStatus,
    pub checklist: ChecklistInstance,
    /// Storage revision; bumped on every committed change.
    pub revision: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Claim {
    pub fn draft(id: ClaimId, property_id: PropertyId, claim_type: ClaimType) -> Self {
        Self {
            id,
            property_id,
            claim_type,
            status: ClaimStatus::Draft,
            checklist: ChecklistInstance::instantiate(claim_type),
            revision: 0,
            submitted_at: None,
        }
    }
}
