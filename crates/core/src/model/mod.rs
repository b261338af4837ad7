mod ids;
mod material;
mod progress;
mod quiz;

pub use ids::{AnswerId, CourseId, MaterialId, ParseIdError, QuestionId, QuizId};

pub use material::{
    ContentType, DEFAULT_ESTIMATED_MINUTES, DifficultyLevel, GeneratedMaterial, GenerationDraft,
    GenerationRequest, MIN_TOPIC_CHARS, NewMaterial, PersistedMaterial, ValidationError,
};
pub use progress::{ProgressRecord, ProgressStatus};
pub use quiz::{
    Answer, AnswerSelection, Question, QuestionReview, Quiz, QuizResult, SelectionError,
};
