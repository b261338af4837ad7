use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::model::ids::{AnswerId, MaterialId, QuestionId, QuizId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),

    #[error("answer {answer} does not belong to question {question}")]
    UnknownAnswer {
        question: QuestionId,
        answer: AnswerId,
    },
}

//
// ─── QUIZ CONTENT ──────────────────────────────────────────────────────────────
//

/// One selectable answer.
///
/// Whether the answer is correct is kept private; it only surfaces through
/// [`Quiz::review`]. `Debug` leaves the key out as well.
#[derive(Clone, PartialEq, Eq)]
pub struct Answer {
    id: AnswerId,
    text: String,
    correct: bool,
    explanation: Option<String>,
}

impl Answer {
    #[must_use]
    pub fn new(id: AnswerId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            correct: false,
            explanation: None,
        }
    }

    /// Mark this answer as the correct one, with an optional explanation.
    #[must_use]
    pub fn correct(mut self, explanation: Option<String>) -> Self {
        self.correct = true;
        self.explanation = explanation;
        self
    }

    #[must_use]
    pub fn id(&self) -> AnswerId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Debug for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Answer")
            .field("id", &self.id)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    answers: Vec<Answer>,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, text: impl Into<String>, answers: Vec<Answer>) -> Self {
        Self {
            id,
            text: text.into(),
            answers,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    fn answer(&self, id: AnswerId) -> Option<&Answer> {
        self.answers.iter().find(|a| a.id == id)
    }

    fn correct_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|a| a.correct)
    }
}

/// A quiz as fetched for a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    title: String,
    material_id: MaterialId,
    questions: Vec<Question>,
}

impl Quiz {
    #[must_use]
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        material_id: MaterialId,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            material_id,
            questions,
        }
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn material_id(&self) -> MaterialId {
        self.material_id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Record `answer` for `question`, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError` if the question is not in this quiz or the
    /// answer does not belong to it.
    pub fn select_answer(
        &self,
        selection: &mut AnswerSelection,
        question: QuestionId,
        answer: AnswerId,
    ) -> Result<(), SelectionError> {
        let q = self
            .question(question)
            .ok_or(SelectionError::UnknownQuestion(question))?;
        if q.answer(answer).is_none() {
            return Err(SelectionError::UnknownAnswer { question, answer });
        }
        selection.choices.insert(question, answer);
        Ok(())
    }

    /// Questions in quiz order that have no entry in `selection`.
    #[must_use]
    pub fn missing_answers(&self, selection: &AnswerSelection) -> Vec<QuestionId> {
        self.questions
            .iter()
            .map(Question::id)
            .filter(|id| !selection.contains(*id))
            .collect()
    }

    /// Per-question correctness of `selection` against the answer key.
    ///
    /// A question without a flagged-correct answer is never correct.
    #[must_use]
    pub fn review(&self, selection: &AnswerSelection) -> Vec<QuestionReview> {
        self.questions
            .iter()
            .map(|question| {
                let selected = selection
                    .get(question.id)
                    .and_then(|id| question.answer(id));
                let correct = question.correct_answer();
                let is_correct = matches!(
                    (selected, correct),
                    (Some(s), Some(c)) if s.id == c.id
                );
                QuestionReview {
                    question_id: question.id,
                    question_text: question.text.clone(),
                    selected_answer: selected.map(|a| a.id),
                    selected_text: selected.map(|a| a.text.clone()),
                    correct_answer: correct.map(|a| a.id),
                    correct_text: correct.map(|a| a.text.clone()),
                    explanation: correct.and_then(|a| a.explanation.clone()),
                    is_correct,
                }
            })
            .collect()
    }
}

//
// ─── ANSWER SELECTION ──────────────────────────────────────────────────────────
//

/// The user's answer per question; only [`Quiz::select_answer`] can add entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSelection {
    choices: HashMap<QuestionId, AnswerId>,
}

impl AnswerSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, question: QuestionId) -> Option<AnswerId> {
        self.choices.get(&question).copied()
    }

    #[must_use]
    pub fn contains(&self, question: QuestionId) -> bool {
        self.choices.contains_key(&question)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, AnswerId)> + '_ {
        self.choices.iter().map(|(q, a)| (*q, *a))
    }
}

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    pub question_id: QuestionId,
    pub question_text: String,
    pub selected_answer: Option<AnswerId>,
    pub selected_text: Option<String>,
    pub correct_answer: Option<AnswerId>,
    pub correct_text: Option<String>,
    pub explanation: Option<String>,
    pub is_correct: bool,
}

/// Outcome of a scored attempt.
///
/// `score` comes from the evaluation service; `questions` is computed locally
/// and may not agree with it.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub score: f64,
    pub completion_time_minutes: u32,
    pub questions: Vec<QuestionReview>,
}

impl QuizResult {
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_correct).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_question_quiz() -> Quiz {
        Quiz::new(
            QuizId::new(1),
            "Ownership basics",
            MaterialId::new(10),
            vec![
                Question::new(
                    QuestionId::new(1),
                    "Q1",
                    vec![
                        Answer::new(AnswerId::new(11), "A1").correct(None),
                        Answer::new(AnswerId::new(12), "B1"),
                    ],
                ),
                Question::new(
                    QuestionId::new(2),
                    "Q2",
                    vec![
                        Answer::new(AnswerId::new(21), "A2"),
                        Answer::new(AnswerId::new(22), "B2")
                            .correct(Some("moves transfer ownership".into())),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn answer_debug_hides_answer_key() {
        let quiz = two_question_quiz();
        let rendered = format!("{:?}", quiz.questions()[1].answers());

        assert!(rendered.contains("B2"));
        assert!(!rendered.contains("correct"));
        assert!(!rendered.contains("moves transfer ownership"));
    }

    #[test]
    fn select_answer_rejects_foreign_question() {
        let quiz = two_question_quiz();
        let mut selection = AnswerSelection::new();
        let err = quiz
            .select_answer(&mut selection, QuestionId::new(99), AnswerId::new(11))
            .unwrap_err();
        assert_eq!(err, SelectionError::UnknownQuestion(QuestionId::new(99)));
        assert!(selection.is_empty());
    }

    #[test]
    fn select_answer_rejects_answer_from_other_question() {
        let quiz = two_question_quiz();
        let mut selection = AnswerSelection::new();
        let err = quiz
            .select_answer(&mut selection, QuestionId::new(1), AnswerId::new(21))
            .unwrap_err();
        assert!(matches!(err, SelectionError::UnknownAnswer { .. }));
    }

    #[test]
    fn select_answer_upserts() {
        let quiz = two_question_quiz();
        let mut selection = AnswerSelection::new();
        quiz.select_answer(&mut selection, QuestionId::new(1), AnswerId::new(11))
            .unwrap();
        quiz.select_answer(&mut selection, QuestionId::new(1), AnswerId::new(12))
            .unwrap();
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.get(QuestionId::new(1)), Some(AnswerId::new(12)));
    }

    #[test]
    fn missing_answers_in_quiz_order() {
        let quiz = two_question_quiz();
        let mut selection = AnswerSelection::new();
        assert_eq!(
            quiz.missing_answers(&selection),
            vec![QuestionId::new(1), QuestionId::new(2)]
        );
        quiz.select_answer(&mut selection, QuestionId::new(2), AnswerId::new(21))
            .unwrap();
        assert_eq!(quiz.missing_answers(&selection), vec![QuestionId::new(1)]);
    }

    #[test]
    fn review_marks_exact_matches_and_shows_explanation() {
        let quiz = two_question_quiz();
        let mut selection = AnswerSelection::new();
        quiz.select_answer(&mut selection, QuestionId::new(1), AnswerId::new(11))
            .unwrap();
        quiz.select_answer(&mut selection, QuestionId::new(2), AnswerId::new(21))
            .unwrap();

        let review = quiz.review(&selection);
        assert!(review[0].is_correct);
        assert!(!review[1].is_correct);
        assert_eq!(review[1].correct_text.as_deref(), Some("B2"));
        assert_eq!(review[1].selected_text.as_deref(), Some("A2"));
        assert_eq!(
            review[1].explanation.as_deref(),
            Some("moves transfer ownership")
        );
    }

    #[test]
    fn question_without_correct_answer_is_never_correct() {
        let quiz = Quiz::new(
            QuizId::new(2),
            "Broken",
            MaterialId::new(1),
            vec![Question::new(
                QuestionId::new(1),
                "No key",
                vec![Answer::new(AnswerId::new(1), "only")],
            )],
        );
        let mut selection = AnswerSelection::new();
        quiz.select_answer(&mut selection, QuestionId::new(1), AnswerId::new(1))
            .unwrap();

        let review = quiz.review(&selection);
        assert!(!review[0].is_correct);
        assert_eq!(review[0].correct_answer, None);
    }
}
