use std::sync::Arc;

use log::{info, warn};
use remote::{QuizRepository, RemoteError};
use studyflow_core::model::{ProgressRecord, QuizId, QuizResult};
use studyflow_core::time::elapsed_minutes;

use super::session::QuizSession;
use crate::error::QuizError;
use crate::progress_sync::ProgressSync;
use crate::Clock;

/// Orchestrates quiz loading and scored submission.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    quizzes: Arc<dyn QuizRepository>,
    progress: ProgressSync,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, quizzes: Arc<dyn QuizRepository>, progress: ProgressSync) -> Self {
        Self {
            clock,
            quizzes,
            progress,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Fetch a quiz and start a fresh attempt at it.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotFound` if the quiz does not exist, `QuizError::Empty`
    /// if it has no questions and `QuizError::Fetch` for other remote failures.
    pub async fn load(&self, quiz_id: QuizId) -> Result<QuizSession, QuizError> {
        let quiz = self.quizzes.fetch_quiz(quiz_id).await.map_err(|err| match err {
            RemoteError::NotFound => QuizError::NotFound(quiz_id),
            other => QuizError::Fetch(other),
        })?;
        let session = QuizSession::new(quiz, self.clock.now())?;
        info!(
            "quiz {quiz_id} loaded with {} question(s)",
            session.question_count()
        );
        Ok(session)
    }

    /// Evaluate the attempt, record completion progress and move to `Scored`.
    ///
    /// An incomplete selection is rejected before any remote call. If
    /// evaluation or progress persistence fails the session stays in
    /// `Submitting` and this method may be called again.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::IncompleteAnswers`, `QuizError::AlreadyScored`,
    /// `QuizError::Evaluation` or `QuizError::Progress`.
    pub async fn submit(&self, session: &mut QuizSession) -> Result<QuizResult, QuizError> {
        session.begin_submit()?;

        let quiz_id = session.quiz_id();
        let score = self
            .quizzes
            .evaluate_quiz(quiz_id, session.selection())
            .await
            .map_err(|err| {
                warn!("evaluation of quiz {quiz_id} failed: {err}");
                QuizError::Evaluation(err)
            })?;

        let minutes = elapsed_minutes(session.started_at(), self.clock.now());
        self.progress
            .complete(
                ProgressRecord::completed(session.material_id())
                    .with_score(score)
                    .with_completion_time(minutes),
            )
            .await?;

        session.record_score(score, minutes);
        info!("quiz {quiz_id} scored {score:.1} in {minutes} min");
        session.review()
    }
}
