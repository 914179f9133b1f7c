use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::view::StartView;

pub fn render(frame: &mut Frame, area: Rect, start: &StartView) {
    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(13),
        Constraint::Fill(1),
    ])
    .split(area);

    let prompt = if start.loading {
        Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow).bold(),
        ))
    } else if start.busy {
        Line::from(Span::styled(
            "Please wait...",
            Style::default().fg(Color::DarkGray).bold(),
        ))
    } else {
        Line::from(Span::styled(
            "ENTER",
            Style::default().fg(Color::Green).bold(),
        ))
    };

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "TRIVIA QUIZ",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from("General Knowledge · Endless Rounds".fg(Color::DarkGray)),
        Line::from(""),
        Line::from(""),
        prompt,
        Line::from("to start  ·  q quit".fg(Color::DarkGray)),
    ];

    if let Some(error) = &start.error {
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )));
    }

    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Color::DarkGray),
        );

    frame.render_widget(widget, chunks[1]);
}
