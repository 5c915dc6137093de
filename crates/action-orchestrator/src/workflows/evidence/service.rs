use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{EvidencePolicy, PhotoFile, PhotoRejection, UploadError, UploadedPhoto};
use super::pipeline::EvidencePipeline;
use super::uploader::{PhotoUploader, PreviewStore};
use super::validation::validate_photo;

/// Single-file upload entry point plus a factory for per-attempt pipelines.
pub struct EvidenceService<U> {
    uploader: Arc<U>,
    policy: EvidencePolicy,
}

impl<U> EvidenceService<U>
where
    U: PhotoUploader + 'static,
{
    pub fn new(uploader: Arc<U>, policy: EvidencePolicy) -> Self {
        Self { uploader, policy }
    }

    pub fn policy(&self) -> &EvidencePolicy {
        &self.policy
    }

    /// Upload one file. Callers parallelize by issuing one call per file.
    pub async fn upload_evidence_photo(
        &self,
        file: PhotoFile,
        order_index: usize,
    ) -> Result<UploadedPhoto, UploadError> {
        validate_photo(&file, &self.policy)?;
        if order_index >= self.policy.max_photos {
            return Err(PhotoRejection::MaximumReached {
                file_name: file.file_name,
                max: self.policy.max_photos,
            }
            .into());
        }

        let file_name = file.file_name.clone();
        match self.uploader.upload(file, order_index).await {
            Ok(photo) => {
                info!(%file_name, order_index, photo_id = %photo.id, "evidence photo uploaded");
                Ok(photo)
            }
            Err(error) => {
                warn!(%file_name, order_index, %error, "evidence photo upload failed");
                Err(error)
            }
        }
    }

    pub fn pipeline<P>(&self, previews: Arc<P>) -> EvidencePipeline<U, P>
    where
        P: PreviewStore + 'static,
    {
        EvidencePipeline::new(Arc::clone(&self.uploader), previews, self.policy)
    }
}
