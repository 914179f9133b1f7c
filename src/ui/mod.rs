//! Terminal rendering of the quiz screens.

mod quiz;
mod result;
mod welcome;

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{prelude::*, widgets::Block};

use crate::models::NUM_OPTIONS;
use crate::terminal::{self, AppTerminal};
use crate::view::{Input, Screen, UserEvent, View, ViewModel};

/// [`View`] backed by the terminal.
///
/// Owns the option cursor; everything else comes from the view model.
pub struct TerminalView {
    terminal: AppTerminal,
    cursor: usize,
    screen: Screen,
    question_number: Option<usize>,
    answered: bool,
}

impl TerminalView {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            terminal: terminal::init()?,
            cursor: 0,
            screen: Screen::Start,
            question_number: None,
            answered: false,
        })
    }

    pub fn restore(self) -> io::Result<()> {
        drop(self.terminal);
        terminal::restore()
    }

    fn track(&mut self, model: &ViewModel) {
        let number = model.question.as_ref().map(|q| q.number);
        if number != self.question_number {
            self.cursor = 0;
        }
        self.question_number = number;
        self.screen = model.screen;
        self.answered = model.feedback.is_some();
    }
}

impl View for TerminalView {
    fn render(&mut self, model: &ViewModel) -> io::Result<()> {
        self.track(model);
        let cursor = self.cursor;
        self.terminal.draw(|frame| render(frame, model, cursor))?;
        Ok(())
    }

    fn next_input(&mut self, timeout: Duration) -> io::Result<Option<Input>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }

        let Event::Key(key) = event::read()? else {
            return Ok(None);
        };
        if key.kind != KeyEventKind::Press {
            return Ok(None);
        }

        Ok(match self.screen {
            Screen::Start => welcome_input(key.code),
            Screen::Quiz => quiz_input(&mut self.cursor, self.answered, key.code),
            Screen::Result => result_input(key.code),
        })
    }
}

pub fn render(frame: &mut Frame, model: &ViewModel, cursor: usize) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match model.screen {
        Screen::Start => welcome::render(frame, area, &model.start),
        Screen::Quiz => quiz::render(frame, area, model, cursor),
        Screen::Result => result::render(frame, area, model),
    }
}

fn welcome_input(key: KeyCode) -> Option<Input> {
    match key {
        KeyCode::Enter => Some(Input::User(UserEvent::StartRequested)),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Input::Quit),
        _ => None,
    }
}

fn quiz_input(cursor: &mut usize, answered: bool, key: KeyCode) -> Option<Input> {
    match key {
        KeyCode::Up | KeyCode::Char('k') => {
            *cursor = (*cursor + NUM_OPTIONS - 1) % NUM_OPTIONS;
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            *cursor = (*cursor + 1) % NUM_OPTIONS;
            None
        }
        KeyCode::Char(c @ '1'..='4') => {
            *cursor = c as usize - '1' as usize;
            Some(Input::User(UserEvent::OptionSelected(*cursor)))
        }
        KeyCode::Char(c @ 'a'..='d') => {
            *cursor = c as usize - 'a' as usize;
            Some(Input::User(UserEvent::OptionSelected(*cursor)))
        }
        KeyCode::Enter | KeyCode::Char(' ') if answered => None,
        KeyCode::Enter | KeyCode::Char(' ') => {
            Some(Input::User(UserEvent::OptionSelected(*cursor)))
        }
        KeyCode::Char('n') => Some(Input::User(UserEvent::NextRequested)),
        KeyCode::Char('h') => Some(Input::User(UserEvent::HomeRequested)),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Input::Quit),
        _ => None,
    }
}

fn result_input(key: KeyCode) -> Option<Input> {
    match key {
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Input::User(UserEvent::RestartRequested)),
        KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Enter => {
            Some(Input::User(UserEvent::HomeRequested))
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Input::Quit),
        _ => None,
    }
}
