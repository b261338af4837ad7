use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{info, warn};
use remote::{MaterialGenerator, MaterialRepository};
use studyflow_core::model::{
    GeneratedMaterial, GenerationDraft, GenerationRequest, MaterialId, NewMaterial,
    PersistedMaterial,
};
use tokio::task::JoinHandle;

use super::state::{GenerationEvent, GenerationState, GenerationStep};
use crate::error::GenerationError;

/// Time the generated material stays on screen before it is saved.
pub const REVIEW_DELAY: Duration = Duration::from_millis(2000);

type SharedState = Arc<Mutex<GenerationState>>;

/// Handle to the save scheduled after a successful generation.
///
/// The save cannot be cancelled. Dropping this handle (or the workflow)
/// detaches the task and the save still runs.
#[derive(Debug)]
pub struct ScheduledSave {
    material: GeneratedMaterial,
    task: JoinHandle<Result<PersistedMaterial, GenerationError>>,
}

impl ScheduledSave {
    /// The generated material being reviewed.
    #[must_use]
    pub fn material(&self) -> &GeneratedMaterial {
        &self.material
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the save to complete.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Persist` if the content store rejected the
    /// material, or `GenerationError::SaveAborted` if the task did not finish.
    pub async fn outcome(self) -> Result<PersistedMaterial, GenerationError> {
        self.task
            .await
            .map_err(|e| GenerationError::SaveAborted(e.to_string()))?
    }
}

/// Drives AI-assisted material creation: configure, generate, review & save.
pub struct GenerationWorkflow {
    generator: Arc<dyn MaterialGenerator>,
    materials: Arc<dyn MaterialRepository>,
    state: SharedState,
}

impl GenerationWorkflow {
    #[must_use]
    pub fn new(
        generator: Arc<dyn MaterialGenerator>,
        materials: Arc<dyn MaterialRepository>,
    ) -> Self {
        Self {
            generator,
            materials,
            state: Arc::new(Mutex::new(GenerationState::Configuring)),
        }
    }

    /// Snapshot of the current state.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::StatePoisoned` if the state lock is poisoned.
    pub fn state(&self) -> Result<GenerationState, GenerationError> {
        let guard = self
            .state
            .lock()
            .map_err(|_| GenerationError::StatePoisoned)?;
        Ok(guard.clone())
    }

    /// # Errors
    ///
    /// Returns `GenerationError::StatePoisoned` if the state lock is poisoned.
    pub fn step(&self) -> Result<GenerationStep, GenerationError> {
        Ok(self.state()?.step())
    }

    /// Id of the saved material, once the scheduled save succeeded.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::StatePoisoned` if the state lock is poisoned.
    pub fn navigation_target(&self) -> Result<Option<MaterialId>, GenerationError> {
        Ok(self.state()?.navigation_target())
    }

    /// Validate `draft`, generate material and schedule its save.
    ///
    /// Validation failures leave the state untouched and call no collaborator.
    /// A generation failure resets the workflow to `Configuring`, and so does
    /// dropping this future before the generator answers.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Validation` for invalid input,
    /// `GenerationError::Busy` while a previous submission is in flight and
    /// `GenerationError::Generation` if the generator fails.
    pub async fn submit(&self, draft: GenerationDraft) -> Result<ScheduledSave, GenerationError> {
        let request = draft.validate()?;
        let pending = self.begin(&request)?;
        info!(
            "generating material for course {} topic {:?} ({})",
            request.course_id(),
            request.topic(),
            request.difficulty_level()
        );

        let generated = self.generator.generate_material(&request).await;
        pending.disarm();

        let material = match generated {
            Ok(material) => material,
            Err(err) => {
                warn!("material generation failed: {err}");
                apply(&self.state, GenerationEvent::GenerationFailed)?;
                return Err(GenerationError::Generation(err));
            }
        };

        apply(&self.state, GenerationEvent::Generated(material.clone()))?;
        let payload = NewMaterial::from_generated(&request, material.clone());
        let task = tokio::spawn(save_after_review(
            Arc::clone(&self.materials),
            Arc::clone(&self.state),
            payload,
        ));

        Ok(ScheduledSave { material, task })
    }

    /// Move to `Generating` unless a submission is already in flight.
    fn begin(&self, request: &GenerationRequest) -> Result<PendingGeneration<'_>, GenerationError> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| GenerationError::StatePoisoned)?;
        if guard.step().is_in_flight() {
            return Err(GenerationError::Busy);
        }
        *guard = guard.transition(GenerationEvent::Submitted(request.clone()))?;
        Ok(PendingGeneration {
            state: &self.state,
            armed: true,
        })
    }
}

/// Puts an abandoned `Generating` state back to `Configuring` on drop.
struct PendingGeneration<'a> {
    state: &'a SharedState,
    armed: bool,
}

impl PendingGeneration<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGeneration<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(mut guard) = self.state.lock() else {
            return;
        };
        if let Ok(next) = guard.transition(GenerationEvent::GenerationFailed) {
            warn!("generation abandoned before the generator answered");
            *guard = next;
        }
    }
}

async fn save_after_review(
    materials: Arc<dyn MaterialRepository>,
    state: SharedState,
    payload: NewMaterial,
) -> Result<PersistedMaterial, GenerationError> {
    tokio::time::sleep(REVIEW_DELAY).await;

    match materials.persist_material(&payload).await {
        Ok(persisted) => {
            info!("material {} saved", persisted.id);
            apply(&state, GenerationEvent::Saved(persisted.clone()))?;
            Ok(persisted)
        }
        Err(err) => {
            warn!("saving generated material failed: {err}");
            apply(&state, GenerationEvent::SaveFailed(err.to_string()))?;
            Err(GenerationError::Persist(err))
        }
    }
}

fn apply(state: &SharedState, event: GenerationEvent) -> Result<GenerationStep, GenerationError> {
    let mut guard = state.lock().map_err(|_| GenerationError::StatePoisoned)?;
    let next = guard.transition(event)?;
    let step = next.step();
    *guard = next;
    Ok(step)
}
