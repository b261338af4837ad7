//! Shared error types for the services crate.

use thiserror::Error;

use remote::RemoteError;
use studyflow_core::model::{AnswerId, QuestionId, QuizId, SelectionError, ValidationError};

use crate::generation::InvalidTransition;

/// Errors emitted by `ProgressSync`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressSyncError {
    #[error("failed to persist progress: {0}")]
    Persist(#[source] RemoteError),
}

/// Errors emitted by `GenerationWorkflow` and its scheduled save.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a generation is already in progress")]
    Busy,
    #[error("failed to generate material: {0}")]
    Generation(#[source] RemoteError),
    #[error("failed to save material: {0}")]
    Persist(#[source] RemoteError),
    #[error("scheduled save did not complete: {0}")]
    SaveAborted(String),
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error("generation state lock poisoned")]
    StatePoisoned,
}

/// Errors emitted by quiz sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz {0} not found")]
    NotFound(QuizId),
    #[error("quiz has no questions")]
    Empty,
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),
    #[error("answer {answer} does not belong to question {question}")]
    UnknownAnswer {
        question: QuestionId,
        answer: AnswerId,
    },
    #[error("answers are locked while the quiz is submitted")]
    Locked,
    #[error("{missing} question(s) still need an answer")]
    IncompleteAnswers { missing: usize },
    #[error("quiz already scored")]
    AlreadyScored,
    #[error("quiz has not been scored yet")]
    NotScored,
    #[error("failed to fetch quiz: {0}")]
    Fetch(#[source] RemoteError),
    #[error("failed to evaluate quiz: {0}")]
    Evaluation(#[source] RemoteError),
    #[error(transparent)]
    Progress(#[from] ProgressSyncError),
}

impl From<SelectionError> for QuizError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::UnknownQuestion(question) => Self::UnknownQuestion(question),
            SelectionError::UnknownAnswer { question, answer } => {
                Self::UnknownAnswer { question, answer }
            }
        }
    }
}
