use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, info, warn};

use super::domain::{
    EvidencePolicy, EvidenceSlot, LocalPhotoId, PhotoFile, PhotoId, PhotoRejection, SlotState,
};
use super::uploader::{PhotoUploader, PreviewStore};
use super::validation::validate_photo;

/// Outcome of one `add_files` batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddFilesReport {
    pub accepted: Vec<LocalPhotoId>,
    pub rejected: Vec<PhotoRejection>,
}

impl AddFilesReport {
    pub fn maximum_reached(&self) -> bool {
        self.rejected.iter().any(PhotoRejection::is_maximum_reached)
    }
}

struct Slot {
    view: EvidenceSlot,
    upload: Option<AbortHandle>,
}

type Slots = Arc<Mutex<Vec<Slot>>>;

fn lock(slots: &Slots) -> MutexGuard<'_, Vec<Slot>> {
    slots
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Photo attachments for one completion attempt.
///
/// Each accepted file gets a local id and a preview at once, then uploads on its own task.
/// Must be used from within a tokio runtime. Dropping the pipeline aborts outstanding uploads
/// and revokes every preview it still holds.
pub struct EvidencePipeline<U, P>
where
    U: PhotoUploader + 'static,
    P: PreviewStore + 'static,
{
    uploader: Arc<U>,
    previews: Arc<P>,
    policy: EvidencePolicy,
    slots: Slots,
    uploads: JoinSet<()>,
}

impl<U, P> EvidencePipeline<U, P>
where
    U: PhotoUploader + 'static,
    P: PreviewStore + 'static,
{
    pub fn new(uploader: Arc<U>, previews: Arc<P>, policy: EvidencePolicy) -> Self {
        Self {
            uploader,
            previews,
            policy,
            slots: Arc::new(Mutex::new(Vec::new())),
            uploads: JoinSet::new(),
        }
    }

    pub fn remaining_slots(&self) -> usize {
        self.policy.max_photos.saturating_sub(lock(&self.slots).len())
    }

    /// Validate and enqueue files in order. Invalid files never take a slot; valid files past
    /// the cap are rejected with `MaximumReached`.
    pub fn add_files(&mut self, files: Vec<PhotoFile>) -> AddFilesReport {
        self.reap_finished();
        let mut report = AddFilesReport::default();

        for file in files {
            if let Err(rejection) = validate_photo(&file, &self.policy) {
                debug!(%rejection, "photo rejected before upload");
                report.rejected.push(rejection);
                continue;
            }

            let slots = Arc::clone(&self.slots);
            let mut slots = lock(&slots);
            if slots.len() >= self.policy.max_photos {
                report.rejected.push(PhotoRejection::MaximumReached {
                    file_name: file.file_name,
                    max: self.policy.max_photos,
                });
                continue;
            }

            // The upload task waits on this lock, so the slot holds its handle before the
            // task can settle it.
            let local_id = LocalPhotoId::generate();
            let order_index = slots.len();
            let file_name = file.file_name.clone();
            let preview_url = self.previews.create(&local_id, &file);
            let upload = self.spawn_upload(local_id.clone(), file, order_index);
            slots.push(Slot {
                view: EvidenceSlot {
                    local_id: local_id.clone(),
                    file_name,
                    preview_url,
                    state: SlotState::Draft,
                },
                upload: Some(upload),
            });
            report.accepted.push(local_id);
        }

        if report.maximum_reached() {
            info!(max = self.policy.max_photos, "evidence photo limit reached");
        }
        report
    }

    /// Drop join results of uploads that already finished.
    fn reap_finished(&mut self) {
        while let Some(joined) = self.uploads.try_join_next() {
            if let Err(error) = joined {
                if !error.is_cancelled() {
                    warn!(%error, "evidence upload task panicked");
                }
            }
        }
    }

    fn spawn_upload(
        &mut self,
        local_id: LocalPhotoId,
        file: PhotoFile,
        order_index: usize,
    ) -> AbortHandle {
        let uploader = Arc::clone(&self.uploader);
        let slots = Arc::clone(&self.slots);

        self.uploads.spawn(async move {
            let outcome = uploader.upload(file, order_index).await;

            let mut slots = lock(&slots);
            // Removed while in flight.
            let Some(slot) = slots.iter_mut().find(|slot| slot.view.local_id == local_id) else {
                return;
            };
            slot.upload = None;
            slot.view.state = match outcome {
                Ok(photo) => {
                    info!(%local_id, photo_id = %photo.id, "evidence photo committed");
                    SlotState::Committed(photo)
                }
                Err(error) => {
                    warn!(%local_id, %error, "evidence photo upload failed");
                    SlotState::Failed {
                        reason: error.to_string(),
                    }
                }
            };
        })
    }

    /// Remove a photo in any state. Cancels its upload if still in flight and releases its
    /// preview. Returns false for an unknown id.
    pub fn remove(&mut self, local_id: &LocalPhotoId) -> bool {
        self.reap_finished();
        let removed = {
            let mut slots = lock(&self.slots);
            slots
                .iter()
                .position(|slot| &slot.view.local_id == local_id)
                .map(|index| slots.remove(index))
        };

        match removed {
            Some(slot) => {
                if let Some(upload) = slot.upload {
                    upload.abort();
                    debug!(%local_id, "in-flight upload cancelled");
                }
                self.previews.revoke(&slot.view.preview_url);
                true
            }
            None => false,
        }
    }

    /// Drop every failed slot and release its preview. Returns how many were cleared.
    pub fn clear_failed(&mut self) -> usize {
        let failed: Vec<Slot> = {
            let mut slots = lock(&self.slots);
            let (failed, kept) = slots
                .drain(..)
                .partition(|slot| matches!(slot.view.state, SlotState::Failed { .. }));
            *slots = kept;
            failed
        };

        for slot in &failed {
            self.previews.revoke(&slot.view.preview_url);
        }
        failed.len()
    }

    /// Server ids of uploads that have committed, in slot order. Drafts and failures are
    /// never included.
    pub fn committed_ids(&self) -> Vec<PhotoId> {
        lock(&self.slots)
            .iter()
            .filter_map(|slot| slot.view.committed_id().cloned())
            .collect()
    }

    pub fn snapshot(&self) -> Vec<EvidenceSlot> {
        lock(&self.slots)
            .iter()
            .map(|slot| slot.view.clone())
            .collect()
    }

    pub fn in_flight(&self) -> usize {
        lock(&self.slots)
            .iter()
            .filter(|slot| slot.view.state == SlotState::Draft)
            .count()
    }

    /// Wait until every upload still running has reached a terminal state.
    pub async fn settle(&mut self) {
        while let Some(joined) = self.uploads.join_next().await {
            match joined {
                Ok(()) => {}
                Err(error) if error.is_cancelled() => {}
                Err(error) => warn!(%error, "evidence upload task panicked"),
            }
        }

        // A panicked task leaves its slot in draft.
        for slot in lock(&self.slots).iter_mut() {
            if slot.view.state == SlotState::Draft {
                slot.upload = None;
                slot.view.state = SlotState::Failed {
                    reason: "upload ended unexpectedly".to_string(),
                };
            }
        }
    }
}

impl<U, P> Drop for EvidencePipeline<U, P>
where
    U: PhotoUploader + 'static,
    P: PreviewStore + 'static,
{
    fn drop(&mut self) {
        self.uploads.abort_all();
        for slot in lock(&self.slots).drain(..) {
            self.previews.revoke(&slot.view.preview_url);
        }
    }
}
