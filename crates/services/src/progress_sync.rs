use std::sync::Arc;

use log::{info, warn};
use remote::ProgressRepository;
use studyflow_core::model::{MaterialId, ProgressRecord};

use crate::error::ProgressSyncError;

/// Persists completion state on behalf of the workflows.
///
/// Each call is exactly one upsert; callers decide what a failure means for
/// their own flow.
#[derive(Clone)]
pub struct ProgressSync {
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressSync {
    #[must_use]
    pub fn new(progress: Arc<dyn ProgressRepository>) -> Self {
        Self { progress }
    }

    /// Upsert `record` for its material.
    ///
    /// # Errors
    ///
    /// Returns `ProgressSyncError::Persist` if the progress store rejects the record.
    pub async fn complete(&self, record: ProgressRecord) -> Result<(), ProgressSyncError> {
        let material_id = record.material_id();
        match self.progress.upsert_progress(&record).await {
            Ok(()) => {
                info!(
                    "progress for material {material_id} set to {:?} (score {:?})",
                    record.status(),
                    record.score()
                );
                Ok(())
            }
            Err(err) => {
                warn!("progress upsert for material {material_id} failed: {err}");
                Err(ProgressSyncError::Persist(err))
            }
        }
    }

    /// Mark a material completed without a score, as done from the material page.
    ///
    /// # Errors
    ///
    /// Returns `ProgressSyncError::Persist` if the progress store rejects the record.
    pub async fn mark_material_complete(
        &self,
        material_id: MaterialId,
    ) -> Result<(), ProgressSyncError> {
        self.complete(ProgressRecord::completed(material_id)).await
    }
}
