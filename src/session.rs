//! State of a single quiz run.

use thiserror::Error;

use crate::models::Question;

/// Points awarded for each correct answer.
pub const AWARD_PER_QUESTION: u32 = 10;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("question index {index} out of range ({len} questions loaded)")]
    OutOfRange { index: usize, len: usize },
}

/// Questions, position and score of the current run.
///
/// The session token outlives runs: [`reset`](Self::reset) keeps it.
#[derive(Debug, Default)]
pub struct SessionState {
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    token: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear questions, index and score.
    pub fn reset(&mut self) {
        self.questions.clear();
        self.current_index = 0;
        self.score = 0;
    }

    pub fn append_batch(&mut self, questions: Vec<Question>) {
        self.questions.extend(questions);
    }

    pub fn advance(&mut self) {
        self.current_index += 1;
    }

    pub fn current_question(&self) -> Result<&Question, SessionError> {
        self.questions
            .get(self.current_index)
            .ok_or(SessionError::OutOfRange {
                index: self.current_index,
                len: self.questions.len(),
            })
    }

    pub fn record_correct(&mut self) {
        self.score += AWARD_PER_QUESTION;
    }

    /// Drop the question list but keep score and index readable.
    pub fn clear_questions(&mut self) {
        self.questions.clear();
    }

    /// True when another loaded question follows the current one.
    pub fn has_next(&self) -> bool {
        self.current_index + 1 < self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }
}
