use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix carried by every client-local photo identity.
pub const LOCAL_ID_PREFIX: &str = "temp-";

const DEFAULT_MAX_PHOTOS: usize = 5;
const DEFAULT_MAX_PHOTO_BYTES: u64 = 10 * 1024 * 1024;

/// Server-assigned identity of a committed upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(pub String);

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-local identity used for previews until the upload commits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LocalPhotoId(String);

impl LocalPhotoId {
    pub fn generate() -> Self {
        Self(format!("{LOCAL_ID_PREFIX}{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalPhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvidencePolicy {
    pub max_photos: usize,
    pub max_photo_bytes: u64,
}

impl Default for EvidencePolicy {
    fn default() -> Self {
        Self {
            max_photos: DEFAULT_MAX_PHOTOS,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedPhoto {
    pub id: PhotoId,
    pub thumbnail_url: String,
}

/// Why a file never entered the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhotoRejection {
    #[error("{file_name}: {content_type} is not an image type")]
    UnsupportedType {
        file_name: String,
        content_type: String,
    },
    #[error("{file_name} is empty")]
    Empty { file_name: String },
    #[error("{file_name} is {size} bytes; the limit is {max}")]
    TooLarge { file_name: String, size: u64, max: u64 },
    #[error("{file_name} was not added: maximum of {max} photos reached")]
    MaximumReached { file_name: String, max: usize },
}

impl PhotoRejection {
    pub fn is_maximum_reached(&self) -> bool {
        matches!(self, PhotoRejection::MaximumReached { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Rejected(#[from] PhotoRejection),
    #[error("photo storage failed: {0}")]
    Storage(String),
}

/// Per-slot upload state: `Draft -> Committed | Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SlotState {
    Draft,
    Committed(UploadedPhoto),
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceSlot {
    pub local_id: LocalPhotoId,
    pub file_name: String,
    pub preview_url: String,
    #[serde(flatten)]
    pub state: SlotState,
}

impl EvidenceSlot {
    pub fn committed_id(&self) -> Option<&PhotoId> {
        match &self.state {
            SlotState::Committed(photo) => Some(&photo.id),
            _ => None,
        }
    }
}
