use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use super::domain::{LocalPhotoId, PhotoFile, UploadError, UploadedPhoto};

/// Photo storage collaborator. One call per file; the pipeline runs calls concurrently.
#[async_trait]
pub trait PhotoUploader: Send + Sync {
    async fn upload(
        &self,
        file: PhotoFile,
        order_index: usize,
    ) -> Result<UploadedPhoto, UploadError>;
}

/// Allocates local preview resources. Every created preview must eventually be revoked.
pub trait PreviewStore: Send + Sync {
    fn create(&self, local_id: &LocalPhotoId, file: &PhotoFile) -> String;
    fn revoke(&self, preview_url: &str);
}

/// Tracks live previews in memory.
#[derive(Debug, Default)]
pub struct MemoryPreviewStore {
    live: Mutex<HashSet<String>>,
}

impl MemoryPreviewStore {
    pub fn live_count(&self) -> usize {
        self.live
            .lock()
            .map(|live| live.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }
}

impl PreviewStore for MemoryPreviewStore {
    fn create(&self, local_id: &LocalPhotoId, _file: &PhotoFile) -> String {
        let url = format!("preview://{local_id}");
        let mut live = self
            .live
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        live.insert(url.clone());
        url
    }

    fn revoke(&self, preview_url: &str) {
        let mut live = self
            .live
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        live.remove(preview_url);
    }
}
