#![forbid(unsafe_code)]

pub mod error;
pub mod generation;
pub mod progress_sync;
pub mod quiz;

pub use studyflow_core::Clock;

pub use error::{GenerationError, ProgressSyncError, QuizError};
pub use generation::{GenerationState, GenerationStep, GenerationWorkflow, ScheduledSave};
pub use progress_sync::ProgressSync;
pub use quiz::{QuizLoopService, QuizProgress, QuizSession, QuizState};
