//! Rendering surface.
//!
//! The controller produces a [`ViewModel`]; anything implementing [`View`]
//! can display it and feed user input back.

use std::io;
use std::time::Duration;

/// Which screen is active. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Start,
    Quiz,
    Result,
}

/// Input the controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserEvent {
    StartRequested,
    OptionSelected(usize),
    NextRequested,
    RestartRequested,
    HomeRequested,
}

/// Input produced by a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    User(UserEvent),
    Quit,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartView {
    /// The first batch of a run is being fetched.
    pub loading: bool,
    /// A fetch from an abandoned run has not returned yet; starting is
    /// refused until it does.
    pub busy: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    /// 1-based position in the run.
    pub number: usize,
    pub prompt_text: String,
    pub options: Vec<String>,
    pub question_number_label: String,
    pub score_label: String,
    /// Progress within the current batch, `0.0 <= p < 100.0`.
    pub progress_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackView {
    pub correct_option_index: Option<usize>,
    pub selected_option_index: usize,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub final_score: u32,
    pub total_played_label: String,
    pub tier_message: &'static str,
    pub percentage: f64,
}

/// Everything a view needs to draw the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub screen: Screen,
    pub start: StartView,
    pub question: Option<QuestionView>,
    pub feedback: Option<FeedbackView>,
    pub result: Option<ResultView>,
    /// A follow-up batch is being fetched.
    pub loading_more: bool,
}

pub trait View {
    fn render(&mut self, model: &ViewModel) -> io::Result<()>;

    /// Wait up to `timeout` for the next input.
    fn next_input(&mut self, timeout: Duration) -> io::Result<Option<Input>>;
}
