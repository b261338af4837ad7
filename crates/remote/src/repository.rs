use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use studyflow_core::model::{
    AnswerSelection, GeneratedMaterial, GenerationRequest, MaterialId, NewMaterial,
    PersistedMaterial, ProgressRecord, Quiz, QuizId,
};
use thiserror::Error;

use crate::http::{ApiConfig, HttpClient};

/// Errors surfaced by data-access adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    #[error("not found")]
    NotFound,

    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// AI generation collaborator.
#[async_trait]
pub trait MaterialGenerator: Send + Sync {
    /// Generate learning material for a validated request.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the generation service fails.
    async fn generate_material(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedMaterial, RemoteError>;
}

#[async_trait]
pub trait MaterialRepository: Send + Sync {
    /// Persist generated material and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the material cannot be stored.
    async fn persist_material(&self, material: &NewMaterial)
    -> Result<PersistedMaterial, RemoteError>;
}

#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Fetch a quiz by ID.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` if missing, or other transport errors.
    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, RemoteError>;

    /// Score a complete answer selection. The result is on a 0–100 scale.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the evaluation service fails.
    async fn evaluate_quiz(
        &self,
        id: QuizId,
        answers: &AnswerSelection,
    ) -> Result<f64, RemoteError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Insert or update the progress record for its material.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the record cannot be stored.
    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), RemoteError>;
}

/// Simple in-memory backend for testing and prototyping.
///
/// Generation echoes the request, evaluation scores exact matches against the
/// quiz's answer key.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    materials: Arc<Mutex<HashMap<MaterialId, PersistedMaterial>>>,
    quizzes: Arc<Mutex<HashMap<QuizId, Quiz>>>,
    progress: Arc<Mutex<HashMap<MaterialId, ProgressRecord>>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a quiz so it can be fetched.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Connection` if the store lock is poisoned.
    pub fn insert_quiz(&self, quiz: Quiz) -> Result<(), RemoteError> {
        let mut guard = self.quizzes.lock().map_err(poisoned)?;
        guard.insert(quiz.id(), quiz);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` if no material has this id.
    pub fn material(&self, id: MaterialId) -> Result<PersistedMaterial, RemoteError> {
        let guard = self.materials.lock().map_err(poisoned)?;
        guard.get(&id).cloned().ok_or(RemoteError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` if no progress exists for this material.
    pub fn progress(&self, material_id: MaterialId) -> Result<ProgressRecord, RemoteError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        guard.get(&material_id).cloned().ok_or(RemoteError::NotFound)
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> RemoteError {
    RemoteError::Connection(e.to_string())
}

#[async_trait]
impl MaterialGenerator for InMemoryBackend {
    async fn generate_material(
        &self,
        request: &GenerationRequest,
    ) -> Result<GeneratedMaterial, RemoteError> {
        let mut content = format!("# {}\n\nLevel: {}", request.topic(), request.difficulty_level());
        if !request.preferences().is_empty() {
            content.push_str("\n\nNotes: ");
            content.push_str(request.preferences());
        }
        Ok(GeneratedMaterial {
            title: request.topic().to_owned(),
            content,
            estimated_time_minutes: None,
            model_used: Some("in-memory".to_owned()),
        })
    }
}

#[async_trait]
impl MaterialRepository for InMemoryBackend {
    async fn persist_material(
        &self,
        material: &NewMaterial,
    ) -> Result<PersistedMaterial, RemoteError> {
        let mut guard = self.materials.lock().map_err(poisoned)?;
        let next = guard.keys().map(MaterialId::value).max().unwrap_or(0) + 1;
        let persisted = material.clone().into_persisted(MaterialId::new(next));
        guard.insert(persisted.id, persisted.clone());
        Ok(persisted)
    }
}

#[async_trait]
impl QuizRepository for InMemoryBackend {
    async fn fetch_quiz(&self, id: QuizId) -> Result<Quiz, RemoteError> {
        let guard = self.quizzes.lock().map_err(poisoned)?;
        guard.get(&id).cloned().ok_or(RemoteError::NotFound)
    }

    async fn evaluate_quiz(
        &self,
        id: QuizId,
        answers: &AnswerSelection,
    ) -> Result<f64, RemoteError> {
        let quiz = self.fetch_quiz(id).await?;
        let review = quiz.review(answers);
        if review.is_empty() {
            return Ok(0.0);
        }
        let correct = review.iter().filter(|q| q.is_correct).count();
        #[allow(clippy::cast_precision_loss)]
        let score = correct as f64 * 100.0 / review.len() as f64;
        Ok(score)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryBackend {
    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), RemoteError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.insert(record.material_id(), record.clone());
        Ok(())
    }
}

/// Aggregates the collaborators behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct DataAccess {
    pub generator: Arc<dyn MaterialGenerator>,
    pub materials: Arc<dyn MaterialRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub progress: Arc<dyn ProgressRepository>,
}

impl DataAccess {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_backend(InMemoryBackend::new())
    }

    /// Build collaborators talking to the remote service over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Connection` if the HTTP client cannot be built.
    pub fn http(config: ApiConfig) -> Result<Self, RemoteError> {
        Ok(Self::from_backend(HttpClient::new(config)?))
    }

    fn from_backend<B>(backend: B) -> Self
    where
        B: MaterialGenerator
            + MaterialRepository
            + QuizRepository
            + ProgressRepository
            + Clone
            + 'static,
    {
        Self {
            generator: Arc::new(backend.clone()),
            materials: Arc::new(backend.clone()),
            quizzes: Arc::new(backend.clone()),
            progress: Arc::new(backend),
        }
    }
}
