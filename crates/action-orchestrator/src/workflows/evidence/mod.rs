//! Evidence photo capture.
//!
//! Files are validated before they take a slot, uploaded concurrently, and reconciled into an
//! ordered list of committed ids. Local ids (`temp-*`) and server ids are distinct types, so a
//! draft id cannot reach a completion record.

pub mod domain;
pub mod pipeline;
pub mod router;
pub mod service;
pub mod uploader;
mod validation;


pub use domain::{
    EvidencePolicy, EvidenceSlot, LocalPhotoId, PhotoFile, PhotoId, PhotoRejection, SlotState,
    UploadError, UploadedPhoto, LOCAL_ID_PREFIX,
};
pub use pipeline::{AddFilesReport, EvidencePipeline};
pub use router::evidence_router;
pub use service::EvidenceService;
pub use uploader::{MemoryPreviewStore, PhotoUploader, PreviewStore};
pub use validation::validate_photo;
