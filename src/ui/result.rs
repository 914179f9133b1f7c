use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use crate::view::ViewModel;

pub fn render(frame: &mut Frame, area: Rect, model: &ViewModel) {
    let Some(result) = &model.result else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(12),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    let grade_color = get_grade_color(result.percentage);

    let mut content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "RESULTS",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            result.final_score.to_string(),
            Style::default().fg(grade_color).bold(),
        )),
        Line::from(result.total_played_label.as_str().fg(Color::DarkGray)),
        Line::from(""),
        Line::from(Span::styled(
            result.tier_message,
            Style::default().fg(Color::White),
        )),
    ];

    if model.start.loading {
        content.push(Line::from(""));
        content.push(Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow).bold(),
        )));
    } else if let Some(error) = &model.start.error {
        content.push(Line::from(""));
        content.push(Line::from(error.as_str().fg(Color::Red)));
    }

    let widget = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, chunks[1]);

    render_controls(frame, chunks[3]);
}

fn get_grade_color(percentage: f64) -> Color {
    match percentage as u32 {
        80.. => Color::Green,
        50..=79 => Color::Yellow,
        _ => Color::Red,
    }
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("r play again  ·  h home  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
