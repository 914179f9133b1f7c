use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::QuizError;
use crate::controller::{FetchCompletion, PendingFetch, QuizController};
use crate::view::{Input, UserEvent, View};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Event loop tying a [`View`] to the [`QuizController`].
///
/// Fetches run as background tasks; their results come back over a channel
/// and are applied between input polls.
pub struct App<V: View> {
    controller: QuizController,
    view: V,
    completions_tx: mpsc::UnboundedSender<FetchCompletion>,
    completions_rx: mpsc::UnboundedReceiver<FetchCompletion>,
}

impl<V: View> App<V> {
    pub fn new(controller: QuizController, view: V) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            view,
            completions_tx,
            completions_rx,
        }
    }

    pub fn controller(&self) -> &QuizController {
        &self.controller
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Run until the view asks to quit.
    pub async fn run(&mut self) -> Result<(), QuizError> {
        loop {
            self.apply_completions()?;

            let model = self.controller.view_model()?;
            self.view.render(&model)?;

            match self.view.next_input(POLL_INTERVAL)? {
                Some(Input::Quit) => break,
                Some(Input::User(event)) => self.dispatch(event)?,
                None => {}
            }

            tokio::task::yield_now().await;
        }

        Ok(())
    }

    fn dispatch(&mut self, event: UserEvent) -> Result<(), QuizError> {
        match self.controller.handle(event) {
            Ok(Some(pending)) => self.spawn_fetch(pending),
            Ok(None) => {}
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => debug!("ignoring {:?}: {}", event, e),
        }
        Ok(())
    }

    fn spawn_fetch(&self, pending: PendingFetch) {
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(pending.run().await);
        });
    }

    fn apply_completions(&mut self) -> Result<(), QuizError> {
        while let Ok(completion) = self.completions_rx.try_recv() {
            match self.controller.complete(completion) {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e.into()),
                // Already shown on screen by the controller.
                Err(e) => warn!("{}", e),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::controller::{ControllerSettings, Phase};
    use crate::models::Question;
    use crate::source::{FetchError, QuestionSource, TokenError};
    use crate::view::{Screen, ViewModel};

    struct BatchQueue {
        batches: Mutex<VecDeque<Result<Vec<Question>, FetchError>>>,
    }

    #[async_trait]
    impl QuestionSource for BatchQueue {
        async fn request_token(&self) -> Result<String, TokenError> {
            Err(TokenError::Network("offline".to_string()))
        }

        async fn fetch_batch(&self, _token: Option<&str>) -> Result<Vec<Question>, FetchError> {
            self.batches
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(FetchError::Empty))
        }
    }

    enum Step {
        Press(UserEvent),
        WaitFor(Screen),
    }

    struct ScriptedView {
        steps: VecDeque<Step>,
        rendered: Vec<ViewModel>,
        idle_polls: usize,
    }

    impl ScriptedView {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: steps.into(),
                rendered: Vec::new(),
                idle_polls: 0,
            }
        }
    }

    impl View for ScriptedView {
        fn render(&mut self, model: &ViewModel) -> io::Result<()> {
            self.rendered.push(model.clone());
            Ok(())
        }

        fn next_input(&mut self, _timeout: Duration) -> io::Result<Option<Input>> {
            match self.steps.front() {
                None => Ok(Some(Input::Quit)),
                Some(Step::Press(event)) => {
                    let event = *event;
                    self.steps.pop_front();
                    Ok(Some(Input::User(event)))
                }
                Some(Step::WaitFor(screen)) => {
                    let reached = self.rendered.last().is_some_and(|m| {
                        m.screen == *screen && !m.start.loading && !m.loading_more
                    });
                    if reached {
                        self.steps.pop_front();
                    } else {
                        self.idle_polls += 1;
                        if self.idle_polls > 10_000 {
                            return Err(io::Error::other("screen never appeared"));
                        }
                    }
                    Ok(None)
                }
            }
        }
    }

    fn question(prompt: &str) -> Question {
        Question {
            prompt: prompt.to_string(),
            correct_answer: "A".to_string(),
            options: ["A", "B", "C", "D"].map(String::from),
        }
    }

    fn app(batches: Vec<Result<Vec<Question>, FetchError>>, steps: Vec<Step>) -> App<ScriptedView> {
        let source = Arc::new(BatchQueue {
            batches: Mutex::new(batches.into()),
        });
        let controller = QuizController::new(source, ControllerSettings::default());
        App::new(controller, ScriptedView::new(steps))
    }

    #[tokio::test]
    async fn test_full_run_through_view() {
        let mut app = app(
            vec![Ok(vec![question("Q1"), question("Q2")])],
            vec![
                Step::Press(UserEvent::StartRequested),
                Step::WaitFor(Screen::Quiz),
                Step::Press(UserEvent::OptionSelected(0)),
                Step::Press(UserEvent::OptionSelected(1)),
                Step::Press(UserEvent::NextRequested),
                Step::Press(UserEvent::OptionSelected(0)),
                Step::Press(UserEvent::NextRequested),
                Step::WaitFor(Screen::Result),
            ],
        );

        app.run().await.unwrap();
        assert_eq!(app.controller().phase(), Phase::Finished);
        assert_eq!(app.controller().session().score(), 20);

        let view = app.into_view();
        let last = view.rendered.last().unwrap();
        let result = last.result.as_ref().unwrap();
        assert_eq!(result.total_played_label, "out of 2 played");
        assert_eq!(result.tier_message, "Outstanding! You're a Genius!");

        assert!(view.rendered.iter().any(|m| m.start.loading));
        assert!(
            view.rendered
                .iter()
                .filter_map(|m| m.feedback)
                .all(|f| f.selected_option_index == 0)
        );
    }

    #[tokio::test]
    async fn test_failed_start_stays_on_start_screen() {
        let mut app = app(
            vec![Err(FetchError::Network("offline".to_string()))],
            vec![
                Step::Press(UserEvent::StartRequested),
                Step::WaitFor(Screen::Start),
            ],
        );

        app.run().await.unwrap();
        assert_eq!(app.controller().phase(), Phase::Idle);

        let view = app.into_view();
        assert!(view.rendered.iter().all(|m| m.screen == Screen::Start));
        assert!(view.rendered.last().unwrap().start.error.is_some());
    }
}
