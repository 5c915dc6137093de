use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::evidence::{EvidencePolicy, PhotoId, LOCAL_ID_PREFIX};

pub const MAX_NOTES_CHARS: usize = 1000;
const MIN_RATING: u8 = 1;
const MAX_RATING: u8 = 5;

/// Completion evidence exactly as submitted by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompletionDraft {
    pub completed_at: DateTime<Utc>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub did_it_myself: bool,
    #[serde(default)]
    pub service_provider_name: Option<String>,
    #[serde(default)]
    pub service_provider_rating: Option<u8>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub photo_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompletionValidationError {
    #[error("completion time {completed_at} is in the future")]
    FutureCompletion { completed_at: DateTime<Utc> },
    #[error("cost must be a non-negative amount")]
    InvalidCost,
    #[error("self-performed work cannot carry a cost")]
    SelfPerformedWithCost,
    #[error("self-performed work cannot name a service provider")]
    SelfPerformedWithProvider,
    #[error("self-performed work cannot rate a service provider")]
    SelfPerformedWithRating,
    #[error("service provider rating {0} is outside 1..=5")]
    RatingOutOfRange(u8),
    #[error("notes are {length} characters; the limit is {max}")]
    NotesTooLong { length: usize, max: usize },
    #[error("{count} photos attached; the limit is {max}")]
    TooManyPhotos { count: usize, max: usize },
    #[error("photo {0} is attached more than once")]
    DuplicatePhoto(String),
    #[error("photo {0} has not finished uploading")]
    UncommittedPhoto(String),
}

/// Validated completion evidence. Only `validate` builds one, so every instance holds the
/// self-performed invariant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    completed_at: DateTime<Utc>,
    cost: Option<f64>,
    did_it_myself: bool,
    service_provider_name: Option<String>,
    service_provider_rating: Option<u8>,
    notes: String,
    photo_ids: Vec<PhotoId>,
}

impl CompletionRecord {
    /// All-or-nothing validation: any failure rejects the whole draft.
    pub fn validate(
        draft: CompletionDraft,
        policy: &EvidencePolicy,
        now: DateTime<Utc>,
    ) -> Result<Self, CompletionValidationError> {
        let CompletionDraft {
            completed_at,
            cost,
            did_it_myself,
            service_provider_name,
            service_provider_rating,
            notes,
            photo_ids,
        } = draft;

        if completed_at > now {
            return Err(CompletionValidationError::FutureCompletion { completed_at });
        }

        if cost.is_some_and(|amount| !amount.is_finite() || amount < 0.0) {
            return Err(CompletionValidationError::InvalidCost);
        }

        let service_provider_name = service_provider_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let cost = if did_it_myself {
            if cost.is_some_and(|amount| amount != 0.0) {
                return Err(CompletionValidationError::SelfPerformedWithCost);
            }
            if service_provider_name.is_some() {
                return Err(CompletionValidationError::SelfPerformedWithProvider);
            }
            if service_provider_rating.is_some() {
                return Err(CompletionValidationError::SelfPerformedWithRating);
            }
            Some(0.0)
        } else {
            if let Some(rating) = service_provider_rating {
                if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                    return Err(CompletionValidationError::RatingOutOfRange(rating));
                }
            }
            cost
        };

        let length = notes.chars().count();
        if length > MAX_NOTES_CHARS {
            return Err(CompletionValidationError::NotesTooLong {
                length,
                max: MAX_NOTES_CHARS,
            });
        }

        if photo_ids.len() > policy.max_photos {
            return Err(CompletionValidationError::TooManyPhotos {
                count: photo_ids.len(),
                max: policy.max_photos,
            });
        }

        let mut seen = HashSet::new();
        let mut committed = Vec::with_capacity(photo_ids.len());
        for id in photo_ids {
            let id = id.trim().to_string();
            if id.is_empty() || id.starts_with(LOCAL_ID_PREFIX) {
                return Err(CompletionValidationError::UncommittedPhoto(id));
            }
            if !seen.insert(id.clone()) {
                return Err(CompletionValidationError::DuplicatePhoto(id));
            }
            committed.push(PhotoId(id));
        }

        Ok(Self {
            completed_at,
            cost,
            did_it_myself,
            service_provider_name,
            service_provider_rating,
            notes,
            photo_ids: committed,
        })
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    pub fn cost(&self) -> Option<f64> {
        self.cost
    }

    pub fn did_it_myself(&self) -> bool {
        self.did_it_myself
    }

    pub fn service_provider_name(&self) -> Option<&str> {
        self.service_provider_name.as_deref()
    }

    pub fn service_provider_rating(&self) -> Option<u8> {
        self.service_provider_rating
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn photo_ids(&self) -> &[PhotoId] {
        &self.photo_ids
    }
}
