//! Quiz state machine.
//!
//! ```text
//! Idle ──start──▶ Loading ──batch──▶ InProgress ──answer──▶ AwaitingNext
//!   ▲                │                   ▲                      │
//!   │             failure                └────────next──────────┤
//!   │                ▼                                          │ out of questions
//!   └──────home── (resume) ◀──────── Finished ◀─────────────────┘
//! ```
//!
//! Network work is split in two halves so the caller decides where it runs:
//! `begin_*` performs the state transition and hands out a [`PendingFetch`],
//! [`QuizController::complete`] applies its [`FetchCompletion`]. Completions
//! issued before the last start or home are stale and ignored.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::ApiConfig;
use crate::decode::decode_entities;
use crate::models::Question;
use crate::session::{AWARD_PER_QUESTION, SessionError, SessionState};
use crate::source::{FetchError, QuestionSource, acquire_token};
use crate::view::{FeedbackView, QuestionView, ResultView, Screen, StartView, UserEvent, ViewModel};

const TOP_TIER_PERCENT: f64 = 80.0;
const MIDDLE_TIER_PERCENT: f64 = 50.0;

const LOAD_FAILED_MESSAGE: &str = "Failed to load questions. Please check your internet connection.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    InProgress,
    /// An answer was recorded for the current question.
    AwaitingNext,
    Finished,
}

impl Phase {
    pub fn screen(self) -> Screen {
        match self {
            Phase::Idle | Phase::Loading => Screen::Start,
            Phase::InProgress | Phase::AwaitingNext => Screen::Quiz,
            Phase::Finished => Screen::Result,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Genius,
    Good,
    Encouragement,
}

impl Tier {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= TOP_TIER_PERCENT {
            Tier::Genius
        } else if percentage >= MIDDLE_TIER_PERCENT {
            Tier::Good
        } else {
            Tier::Encouragement
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Tier::Genius => "Outstanding! You're a Genius!",
            Tier::Good => "Great Job! Keep learning.",
            Tier::Encouragement => "Good try! Practice makes perfect.",
        }
    }
}

/// Final numbers of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub score: u32,
    pub played: usize,
    pub percentage: f64,
    pub tier: Tier,
}

impl Outcome {
    fn compute(score: u32, current_index: usize) -> Self {
        let played = current_index + 1;
        let possible = played as f64 * f64::from(AWARD_PER_QUESTION);
        let percentage = f64::from(score) / possible * 100.0;

        Self {
            score,
            played,
            percentage,
            tier: Tier::from_percentage(percentage),
        }
    }

    fn view(&self) -> ResultView {
        ResultView {
            final_score: self.score,
            total_played_label: format!("out of {} played", self.played),
            tier_message: self.tier.message(),
            percentage: self.percentage,
        }
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("cannot {action} while {phase:?}")]
    InvalidTransition { phase: Phase, action: &'static str },
    #[error("a question fetch is already in flight")]
    FetchInFlight,
    #[error("the current question has already been answered")]
    AlreadyAnswered,
    #[error("option {index} does not exist ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },
    #[error("failed to load questions: {0}")]
    StartFailed(#[source] FetchError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ControllerError {
    /// The state machine lost track of its own invariants.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ControllerError::Session(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchPurpose {
    Start { resume: Phase },
    Refill,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    generation: u64,
    purpose: FetchPurpose,
}

/// A fetch the controller has committed to. Run it anywhere, then hand the
/// completion back to [`QuizController::complete`].
pub struct PendingFetch {
    generation: u64,
    purpose: FetchPurpose,
    token: Option<String>,
    acquire_token: bool,
    source: Arc<dyn QuestionSource>,
    timeout: Duration,
}

impl PendingFetch {
    pub async fn run(self) -> FetchCompletion {
        let token = if self.acquire_token {
            acquire_token(self.source.as_ref(), self.token, self.timeout).await
        } else {
            self.token
        };

        let fetch = self.source.fetch_batch(token.as_deref());
        let batch = match tokio::time::timeout(self.timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };

        FetchCompletion {
            generation: self.generation,
            purpose: self.purpose,
            token,
            batch,
        }
    }
}

#[derive(Debug)]
pub struct FetchCompletion {
    generation: u64,
    purpose: FetchPurpose,
    token: Option<String>,
    batch: Result<Vec<Question>, FetchError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Questions per batch; progress restarts every batch.
    pub batch_size: usize,
    pub fetch_timeout: Duration,
    pub use_token: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ControllerSettings {
    fn from(api: &ApiConfig) -> Self {
        Self {
            batch_size: api.batch_size as usize,
            fetch_timeout: api.timeout(),
            use_token: api.use_token,
        }
    }
}

pub struct QuizController {
    source: Arc<dyn QuestionSource>,
    settings: ControllerSettings,
    session: SessionState,
    phase: Phase,
    generation: u64,
    in_flight: Option<InFlight>,
    feedback: Option<FeedbackView>,
    outcome: Option<Outcome>,
    last_error: Option<String>,
}

impl QuizController {
    pub fn new(source: Arc<dyn QuestionSource>, settings: ControllerSettings) -> Self {
        Self {
            source,
            settings,
            session: SessionState::new(),
            phase: Phase::Idle,
            generation: 0,
            in_flight: None,
            feedback: None,
            outcome: None,
            last_error: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn feedback(&self) -> Option<&FeedbackView> {
        self.feedback.as_ref()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Map a user event to the matching transition.
    pub fn handle(&mut self, event: UserEvent) -> Result<Option<PendingFetch>, ControllerError> {
        match event {
            UserEvent::StartRequested | UserEvent::RestartRequested => self.begin_start().map(Some),
            UserEvent::OptionSelected(index) => self.submit_answer(index).map(|_| None),
            UserEvent::NextRequested => self.begin_next(),
            UserEvent::HomeRequested => {
                self.go_home();
                Ok(None)
            }
        }
    }

    /// Start a run and wait for the first batch.
    pub async fn start(&mut self) -> Result<(), ControllerError> {
        let pending = self.begin_start()?;
        let completion = pending.run().await;
        self.complete(completion)
    }

    pub fn begin_start(&mut self) -> Result<PendingFetch, ControllerError> {
        if self.in_flight.is_some() {
            return Err(ControllerError::FetchInFlight);
        }
        if !matches!(self.phase, Phase::Idle | Phase::Finished) {
            return Err(ControllerError::InvalidTransition {
                phase: self.phase,
                action: "start a quiz",
            });
        }

        let resume = self.phase;
        self.phase = Phase::Loading;
        self.last_error = None;
        self.generation += 1;
        info!("loading questions");

        Ok(self.issue(FetchPurpose::Start { resume }, self.settings.use_token))
    }

    /// Apply a finished fetch.
    ///
    /// Returns [`ControllerError::StartFailed`] when the first batch of a run
    /// could not be loaded. A failed follow-up batch ends the run instead.
    pub fn complete(&mut self, completion: FetchCompletion) -> Result<(), ControllerError> {
        if self
            .in_flight
            .is_some_and(|f| f.generation == completion.generation)
        {
            self.in_flight = None;
        }

        // Tokens belong to the app lifetime, not to a run.
        if let Some(token) = completion.token {
            if self.session.token().is_none() {
                self.session.set_token(token);
            }
        }

        if completion.generation != self.generation {
            debug!(
                generation = completion.generation,
                current = self.generation,
                "discarding stale fetch result"
            );
            return Ok(());
        }

        match completion.purpose {
            FetchPurpose::Start { resume } => self.complete_start(resume, completion.batch),
            FetchPurpose::Refill => {
                self.complete_refill(completion.batch);
                Ok(())
            }
        }
    }

    fn complete_start(
        &mut self,
        resume: Phase,
        batch: Result<Vec<Question>, FetchError>,
    ) -> Result<(), ControllerError> {
        let questions = match batch {
            Ok(questions) if questions.is_empty() => Err(FetchError::Empty),
            other => other,
        };

        let questions = match questions {
            Ok(questions) => questions,
            Err(e) => {
                error!("Failed to load questions: {}", e);
                self.phase = resume;
                self.last_error = Some(LOAD_FAILED_MESSAGE.to_string());
                return Err(ControllerError::StartFailed(e));
            }
        };

        self.session.reset();
        self.session.append_batch(questions);
        self.feedback = None;
        self.outcome = None;
        self.phase = Phase::InProgress;
        info!(questions = self.session.len(), "quiz started");
        Ok(())
    }

    fn complete_refill(&mut self, batch: Result<Vec<Question>, FetchError>) {
        match batch {
            Ok(questions) if !questions.is_empty() => {
                debug!(questions = questions.len(), "appending batch");
                self.session.append_batch(questions);
                self.move_to_next();
            }
            Ok(_) => {
                info!("provider has no more questions");
                self.finish();
            }
            Err(e) => {
                info!("could not fetch more questions, ending run: {}", e);
                self.finish();
            }
        }
    }

    pub fn present_current_question(&self) -> Result<QuestionView, ControllerError> {
        if !matches!(self.phase, Phase::InProgress | Phase::AwaitingNext) {
            return Err(ControllerError::InvalidTransition {
                phase: self.phase,
                action: "present a question",
            });
        }

        let question = self.session.current_question()?;
        let index = self.session.current_index();
        let batch_size = self.settings.batch_size.max(1);
        let progress_percent = (index % batch_size) as f64 / batch_size as f64 * 100.0;

        Ok(QuestionView {
            number: index + 1,
            prompt_text: decode_entities(&question.prompt),
            options: question
                .options
                .iter()
                .map(|option| decode_entities(option))
                .collect(),
            question_number_label: format!("Question {}", index + 1),
            score_label: format!("Score: {}", self.session.score()),
            progress_percent,
        })
    }

    pub fn submit_answer(&mut self, selected: usize) -> Result<FeedbackView, ControllerError> {
        match self.phase {
            Phase::InProgress => {}
            Phase::AwaitingNext => return Err(ControllerError::AlreadyAnswered),
            phase => {
                return Err(ControllerError::InvalidTransition {
                    phase,
                    action: "submit an answer",
                });
            }
        }

        let question = self.session.current_question()?;
        let len = question.options.len();
        if selected >= len {
            return Err(ControllerError::OptionOutOfRange {
                index: selected,
                len,
            });
        }

        let feedback = FeedbackView {
            correct_option_index: question.correct_option_index(),
            selected_option_index: selected,
            is_correct: question.is_correct_option(selected),
        };

        if feedback.is_correct {
            self.session.record_correct();
        }
        debug!(
            question = self.session.current_index() + 1,
            correct = feedback.is_correct,
            score = self.session.score(),
            "answer recorded"
        );

        self.feedback = Some(feedback);
        self.phase = Phase::AwaitingNext;
        Ok(feedback)
    }

    /// Move on from an answered question and wait for a refill if needed.
    pub async fn next(&mut self) -> Result<(), ControllerError> {
        if let Some(pending) = self.begin_next()? {
            let completion = pending.run().await;
            self.complete(completion)?;
        }
        Ok(())
    }

    /// Advance to the next loaded question, or hand out a refill fetch when
    /// the loaded questions are used up.
    pub fn begin_next(&mut self) -> Result<Option<PendingFetch>, ControllerError> {
        if self.in_flight.is_some() {
            return Err(ControllerError::FetchInFlight);
        }
        if self.phase != Phase::AwaitingNext {
            return Err(ControllerError::InvalidTransition {
                phase: self.phase,
                action: "move to the next question",
            });
        }

        if self.session.has_next() {
            self.move_to_next();
            return Ok(None);
        }

        debug!("loaded questions used up, fetching another batch");
        Ok(Some(self.issue(FetchPurpose::Refill, false)))
    }

    pub fn go_home(&mut self) {
        self.generation += 1;
        self.session.reset();
        self.feedback = None;
        self.outcome = None;
        self.last_error = None;
        self.phase = Phase::Idle;
    }

    /// Screen for the current phase. A restart stays on the result screen
    /// until its first batch arrives.
    fn screen(&self) -> Screen {
        match (self.phase, self.in_flight) {
            (
                Phase::Loading,
                Some(InFlight {
                    purpose: FetchPurpose::Start { resume },
                    ..
                }),
            ) => resume.screen(),
            (phase, _) => phase.screen(),
        }
    }

    pub fn view_model(&self) -> Result<ViewModel, ControllerError> {
        let screen = self.screen();
        let loading = self.phase == Phase::Loading;

        let question = match screen {
            Screen::Quiz => Some(self.present_current_question()?),
            _ => None,
        };
        let result = match screen {
            Screen::Result => self.outcome.as_ref().map(Outcome::view),
            _ => None,
        };

        Ok(ViewModel {
            screen,
            start: StartView {
                loading,
                busy: screen == Screen::Start && !loading && self.in_flight.is_some(),
                error: self.last_error.clone(),
            },
            question,
            feedback: self.feedback.filter(|_| screen == Screen::Quiz),
            result,
            loading_more: screen == Screen::Quiz && self.in_flight.is_some(),
        })
    }

    fn issue(&mut self, purpose: FetchPurpose, acquire_token: bool) -> PendingFetch {
        self.in_flight = Some(InFlight {
            generation: self.generation,
            purpose,
        });
        PendingFetch {
            generation: self.generation,
            purpose,
            token: self.session.token().map(str::to_string),
            acquire_token,
            source: Arc::clone(&self.source),
            timeout: self.settings.fetch_timeout,
        }
    }

    fn move_to_next(&mut self) {
        self.session.advance();
        self.feedback = None;
        self.phase = Phase::InProgress;
    }

    fn finish(&mut self) {
        let outcome = Outcome::compute(self.session.score(), self.session.current_index());
        info!(
            score = outcome.score,
            played = outcome.played,
            percentage = outcome.percentage,
            "quiz finished"
        );

        self.session.clear_questions();
        self.feedback = None;
        self.outcome = Some(outcome);
        self.phase = Phase::Finished;
    }
}
