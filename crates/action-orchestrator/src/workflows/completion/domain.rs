use chrono::{DateTime, Utc};
use serde::Serialize;

use super::lifecycle::MicroActionStatus;
use super::record::CompletionRecord;
use crate::workflows::orchestration::{ActionId, PropertyId};

/// Small, one-way completable task derived from a surfaced action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MicroAction {
    pub id: ActionId,
    pub property_id: PropertyId,
    pub status: MicroActionStatus,
    pub title: String,
    pub detail: String,
    pub eta_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl MicroAction {
    pub fn pending(
        id: ActionId,
        property_id: PropertyId,
        title: impl Into<String>,
        detail: impl Into<String>,
        eta_minutes: u32,
    ) -> Self {
        Self {
            id,
            property_id,
            status: MicroActionStatus::Pending,
            title: title.into(),
            detail: detail.into(),
            eta_minutes,
            completion: None,
            dismissed_at: None,
        }
    }
}

/// Data stored alongside a committed transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionPayload {
    Completion(CompletionRecord),
    Dismissal { dismissed_at: DateTime<Utc> },
}

impl TransitionPayload {
    pub fn target(&self) -> MicroActionStatus {
        match self {
            TransitionPayload::Completion(_) => MicroActionStatus::Completed,
            TransitionPayload::Dismissal { .. } => MicroActionStatus::Dismissed,
        }
    }
}
