mod state;
mod workflow;

// Public API of the generation subsystem.
pub use crate::error::GenerationError;
pub use state::{GenerationEvent, GenerationState, GenerationStep, InvalidTransition};
pub use workflow::{GenerationWorkflow, REVIEW_DELAY, ScheduledSave};
