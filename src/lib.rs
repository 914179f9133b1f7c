//! # trivia-quiz
//!
//! A terminal trivia quiz backed by the Open Trivia DB.
//!
//! Questions are fetched in batches of up to 50; when a batch runs out the
//! next one is fetched on demand, and the run ends when the provider has
//! nothing more to give.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use trivia_quiz::{Quiz, QuizError, TriviaConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), QuizError> {
//!     let config = TriviaConfig::load(None)?;
//!     config.validate()?;
//!     Quiz::from_config(&config)?.run().await
//! }
//! ```
//!
//! The state machine is usable on its own with any [`QuestionSource`]:
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use trivia_quiz::*;
//! # async fn demo(source: Arc<dyn QuestionSource>) -> Result<(), ControllerError> {
//! let mut controller = QuizController::new(source, ControllerSettings::default());
//! controller.start().await?;
//! let feedback = controller.submit_answer(0)?;
//! println!("correct: {}", feedback.is_correct);
//! controller.next().await?;
//! # Ok(())
//! # }
//! ```

mod app;
pub mod config;
mod controller;
mod decode;
mod models;
mod session;
mod shuffle;
pub mod source;
pub mod terminal;
mod ui;
mod view;

use std::io;
use std::sync::Arc;

use thiserror::Error;

pub use app::App;
pub use config::{ConfigError, TriviaConfig};
pub use controller::{
    ControllerError, ControllerSettings, FetchCompletion, Outcome, PendingFetch, Phase,
    QuizController, Tier,
};
pub use decode::decode_entities;
pub use models::{NUM_OPTIONS, Question};
pub use session::{AWARD_PER_QUESTION, SessionError, SessionState};
pub use shuffle::shuffle;
pub use source::{FetchError, OpenTdbSource, QuestionSource, TokenError};
pub use ui::TerminalView;
pub use view::{
    FeedbackView, Input, QuestionView, ResultView, Screen, StartView, UserEvent, View, ViewModel,
};

/// Error type for quiz operations.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("quiz state error: {0}")]
    Controller(#[from] ControllerError),
}

/// A quiz wired to a question source, ready to run in the terminal.
pub struct Quiz {
    controller: QuizController,
}

impl Quiz {
    pub fn new(source: Arc<dyn QuestionSource>, settings: ControllerSettings) -> Self {
        Self {
            controller: QuizController::new(source, settings),
        }
    }

    /// Build a quiz against the Open Trivia DB endpoints in `config`.
    pub fn from_config(config: &TriviaConfig) -> Result<Self, QuizError> {
        let source = OpenTdbSource::new(&config.api)?;
        Ok(Self::new(
            Arc::new(source),
            ControllerSettings::from(&config.api),
        ))
    }

    /// Run the quiz in the terminal.
    ///
    /// This will take over the terminal, display the quiz UI, and return
    /// when the user quits.
    pub async fn run(self) -> Result<(), QuizError> {
        let view = TerminalView::new()?;
        let mut app = App::new(self.controller, view);
        let result = app.run().await;
        app.into_view().restore()?;
        result
    }

    pub fn controller(&self) -> &QuizController {
        &self.controller
    }
}
