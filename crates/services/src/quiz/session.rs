use chrono::{DateTime, Utc};
use std::fmt;
use studyflow_core::model::{
    Answer, AnswerId, AnswerSelection, MaterialId, QuestionId, Quiz, QuizId, QuizResult,
};

use super::progress::QuizProgress;
use crate::error::QuizError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where an attempt currently stands, for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuizState {
    Answering { question_index: usize },
    Submitting,
    Scored { score: f64, completion_time_minutes: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Answering,
    Submitting,
    Scored { score: f64, completion_time_minutes: u32 },
}

/// A question as shown before scoring, without the answer key.
#[derive(Debug, Clone, Copy)]
pub struct QuestionView<'a> {
    pub id: QuestionId,
    pub text: &'a str,
    pub answers: &'a [Answer],
    pub selected: Option<AnswerId>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory attempt at a single quiz.
///
/// Navigation and answer capture happen here; evaluation and progress
/// persistence are driven by `QuizLoopService`.
pub struct QuizSession {
    quiz: Quiz,
    selection: AnswerSelection,
    current: usize,
    phase: Phase,
    started_at: DateTime<Utc>,
}

impl QuizSession {
    /// Start an attempt at `quiz`.
    ///
    /// `started_at` should come from the services layer clock to keep time deterministic.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` if the quiz has no questions.
    pub fn new(quiz: Quiz, started_at: DateTime<Utc>) -> Result<Self, QuizError> {
        if quiz.questions().is_empty() {
            return Err(QuizError::Empty);
        }

        Ok(Self {
            quiz,
            selection: AnswerSelection::new(),
            current: 0,
            phase: Phase::Answering,
            started_at,
        })
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz.id()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.quiz.title()
    }

    #[must_use]
    pub fn material_id(&self) -> MaterialId {
        self.quiz.material_id()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn selection(&self) -> &AnswerSelection {
        &self.selection
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.quiz.questions().len()
    }

    #[must_use]
    pub fn question_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        match self.phase {
            Phase::Answering => QuizState::Answering {
                question_index: self.current,
            },
            Phase::Submitting => QuizState::Submitting,
            Phase::Scored {
                score,
                completion_time_minutes,
            } => QuizState::Scored {
                score,
                completion_time_minutes,
            },
        }
    }

    #[must_use]
    pub fn current_question(&self) -> QuestionView<'_> {
        let question = &self.quiz.questions()[self.current];
        QuestionView {
            id: question.id(),
            text: question.text(),
            answers: question.answers(),
            selected: self.selection.get(question.id()),
        }
    }

    #[must_use]
    pub fn selected_answer(&self, question: QuestionId) -> Option<AnswerId> {
        self.selection.get(question)
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress::new(self.current, self.question_count(), self.selection.len())
    }

    /// Questions still waiting for an answer, in quiz order.
    #[must_use]
    pub fn missing_answers(&self) -> Vec<QuestionId> {
        self.quiz.missing_answers(&self.selection)
    }

    /// Record an answer, replacing any earlier choice for the question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Locked` once the quiz has been submitted, and
    /// `UnknownQuestion`/`UnknownAnswer` for ids outside this quiz.
    pub fn select_answer(&mut self, question: QuestionId, answer: AnswerId) -> Result<(), QuizError> {
        if self.phase != Phase::Answering {
            return Err(QuizError::Locked);
        }
        self.quiz
            .select_answer(&mut self.selection, question, answer)?;
        Ok(())
    }

    /// Move to the next question; stays put on the last one.
    pub fn next(&mut self) {
        if self.current + 1 < self.question_count() {
            self.current += 1;
        }
    }

    /// Move to the previous question; stays put on the first one.
    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    /// Per-question review of a scored attempt. Repeated calls return the same result.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotScored` before the attempt has been scored.
    pub fn review(&self) -> Result<QuizResult, QuizError> {
        let Phase::Scored {
            score,
            completion_time_minutes,
        } = self.phase
        else {
            return Err(QuizError::NotScored);
        };

        Ok(QuizResult {
            score,
            completion_time_minutes,
            questions: self.quiz.review(&self.selection),
        })
    }

    /// Lock answers for submission.
    ///
    /// Re-entering from `Submitting` is allowed so a failed submit can be retried.
    pub(crate) fn begin_submit(&mut self) -> Result<(), QuizError> {
        match self.phase {
            Phase::Scored { .. } => Err(QuizError::AlreadyScored),
            Phase::Submitting => Ok(()),
            Phase::Answering => {
                let missing = self.missing_answers().len();
                if missing > 0 {
                    return Err(QuizError::IncompleteAnswers { missing });
                }
                self.phase = Phase::Submitting;
                Ok(())
            }
        }
    }

    pub(crate) fn record_score(&mut self, score: f64, completion_time_minutes: u32) {
        self.phase = Phase::Scored {
            score,
            completion_time_minutes,
        };
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("quiz_id", &self.quiz.id())
            .field("questions_len", &self.question_count())
            .field("current", &self.current)
            .field("answered", &self.selection.len())
            .field("phase", &self.phase)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use studyflow_core::model::Question;
    use studyflow_core::time::fixed_now;

    fn quiz(questions: u64) -> Quiz {
        let questions = (1..=questions)
            .map(|q| {
                Question::new(
                    QuestionId::new(q),
                    format!("Q{q}"),
                    vec![
                        Answer::new(AnswerId::new(q * 10 + 1), "right").correct(None),
                        Answer::new(AnswerId::new(q * 10 + 2), "wrong"),
                    ],
                )
            })
            .collect();
        Quiz::new(QuizId::new(1), "Generics", MaterialId::new(5), questions)
    }

    fn session(questions: u64) -> QuizSession {
        QuizSession::new(quiz(questions), fixed_now()).unwrap()
    }

    #[test]
    fn empty_quiz_returns_error() {
        let err = QuizSession::new(quiz(0), fixed_now()).unwrap_err();
        assert!(matches!(err, QuizError::Empty));
    }

    #[test]
    fn new_session_starts_on_first_question() {
        let session = session(3);
        assert_eq!(session.state(), QuizState::Answering { question_index: 0 });
        assert!(session.selection().is_empty());
        assert_eq!(session.current_question().id, QuestionId::new(1));
    }

    #[test]
    fn navigation_never_leaves_bounds() {
        // every next/previous sequence up to eight calls, for several lengths
        for len in 1..=4u64 {
            for calls in 0..=8u32 {
                for pattern in 0..(1u32 << calls) {
                    let mut session = session(len);
                    for bit in 0..calls {
                        if pattern & (1 << bit) == 0 {
                            session.next();
                        } else {
                            session.previous();
                        }
                        let index = session.question_index();
                        assert!(index < session.question_count(), "len {len} pattern {pattern:b}");
                        assert_eq!(session.current_question().id, QuestionId::new(index as u64 + 1));
                    }
                }
            }
        }
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut session = session(3);
        session.previous();
        assert_eq!(session.question_index(), 0);
        for _ in 0..10 {
            session.next();
        }
        assert_eq!(session.question_index(), 2);
    }

    #[test]
    fn question_view_does_not_leak_answer_key() {
        let mut session = QuizSession::new(
            Quiz::new(
                QuizId::new(2),
                "Traits",
                MaterialId::new(5),
                vec![Question::new(
                    QuestionId::new(1),
                    "Which trait enables `?`",
                    vec![
                        Answer::new(AnswerId::new(1), "Display"),
                        Answer::new(AnswerId::new(2), "From").correct(Some("conversion".into())),
                    ],
                )],
            ),
            fixed_now(),
        )
        .unwrap();
        session
            .select_answer(QuestionId::new(1), AnswerId::new(1))
            .unwrap();

        let rendered = format!("{:?}", session.current_question());
        assert!(rendered.contains("From"));
        assert!(!rendered.contains("correct"));
        assert!(!rendered.contains("conversion"));
    }

    #[test]
    fn single_question_navigation_is_a_no_op() {
        let mut session = session(1);
        session.next();
        session.previous();
        assert_eq!(session.question_index(), 0);
    }

    #[test]
    fn select_answer_rejects_foreign_ids() {
        let mut session = session(2);
        let err = session
            .select_answer(QuestionId::new(9), AnswerId::new(11))
            .unwrap_err();
        assert!(matches!(err, QuizError::UnknownQuestion(_)));

        let err = session
            .select_answer(QuestionId::new(1), AnswerId::new(21))
            .unwrap_err();
        assert!(matches!(err, QuizError::UnknownAnswer { .. }));
        assert!(session.selection().is_empty());
    }

    #[test]
    fn current_question_reflects_selection() {
        let mut session = session(2);
        session
            .select_answer(QuestionId::new(1), AnswerId::new(12))
            .unwrap();
        assert_eq!(session.current_question().selected, Some(AnswerId::new(12)));
        assert_eq!(session.progress().answered, 1);
    }

    #[test]
    fn begin_submit_requires_every_answer() {
        let mut session = session(2);
        session
            .select_answer(QuestionId::new(1), AnswerId::new(11))
            .unwrap();

        let err = session.begin_submit().unwrap_err();
        assert!(matches!(err, QuizError::IncompleteAnswers { missing: 1 }));
        assert_eq!(session.state(), QuizState::Answering { question_index: 0 });
    }

    #[test]
    fn answers_lock_once_submitting() {
        let mut session = session(1);
        session
            .select_answer(QuestionId::new(1), AnswerId::new(11))
            .unwrap();
        session.begin_submit().unwrap();
        assert_eq!(session.state(), QuizState::Submitting);

        let err = session
            .select_answer(QuestionId::new(1), AnswerId::new(12))
            .unwrap_err();
        assert!(matches!(err, QuizError::Locked));
        // retry after a failed submit is allowed
        session.begin_submit().unwrap();
    }

    #[test]
    fn review_requires_scored_state_and_is_repeatable() {
        let mut session = session(2);
        assert!(matches!(session.review(), Err(QuizError::NotScored)));

        session
            .select_answer(QuestionId::new(1), AnswerId::new(11))
            .unwrap();
        session
            .select_answer(QuestionId::new(2), AnswerId::new(22))
            .unwrap();
        session.begin_submit().unwrap();
        session.record_score(50.0, 3);

        let first = session.review().unwrap();
        let second = session.review().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.correct_count(), 1);
        assert!(matches!(session.begin_submit(), Err(QuizError::AlreadyScored)));
    }
}
