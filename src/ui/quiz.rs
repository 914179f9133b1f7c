use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Padding, Paragraph, Wrap},
};

use crate::view::{FeedbackView, QuestionView, ViewModel};

const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

pub fn render(frame: &mut Frame, area: Rect, model: &ViewModel, cursor: usize) {
    let Some(question) = &model.question else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0], question);
    render_progress(frame, chunks[1], question.progress_percent);
    render_question_text(frame, chunks[2], &question.prompt_text);
    render_options(frame, chunks[3], &question.options, cursor, model.feedback.as_ref());
    render_feedback(frame, chunks[4], model.feedback.as_ref(), model.loading_more);
    render_controls(frame, chunks[5], model.feedback.is_some());
}

fn render_header(frame: &mut Frame, area: Rect, question: &QuestionView) {
    let halves = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(area);

    let number = Paragraph::new(question.question_number_label.as_str())
        .fg(Color::Cyan)
        .bold();
    let score = Paragraph::new(question.score_label.as_str())
        .alignment(Alignment::Right)
        .fg(Color::DarkGray);

    frame.render_widget(number, halves[0]);
    frame.render_widget(score, halves[1]);
}

fn render_progress(frame: &mut Frame, area: Rect, percent: f64) {
    let ratio = (percent / 100.0).clamp(0.0, 1.0);
    let widget = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .ratio(ratio)
        .label("");
    frame.render_widget(widget, area);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .fg(Color::White)
        .bold()
        .block(Block::default().padding(Padding::vertical(1)));
    frame.render_widget(widget, area);
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    options: &[String],
    cursor: usize,
    feedback: Option<&FeedbackView>,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(options.len() * 2);

    for (index, option) in options.iter().enumerate() {
        let is_cursor = index == cursor;
        let (style, mark) = option_style(index, is_cursor, feedback);
        let marker = if is_cursor && feedback.is_none() { ">" } else { " " };
        let label = OPTION_LABELS.get(index).copied().unwrap_or('?');

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", label), style),
            Span::styled(option.as_str(), style),
            Span::styled(mark, style),
        ]));
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(widget, area);
}

fn option_style(
    index: usize,
    is_cursor: bool,
    feedback: Option<&FeedbackView>,
) -> (Style, &'static str) {
    match feedback {
        Some(f) if f.correct_option_index == Some(index) => {
            (Style::default().fg(Color::Green).bold(), "  ✓")
        }
        Some(f) if f.selected_option_index == index => {
            (Style::default().fg(Color::Red).bold(), "  ✗")
        }
        Some(_) => (Style::default().fg(Color::DarkGray), ""),
        None if is_cursor => (Style::default().fg(Color::Cyan).bold(), ""),
        None => (Style::default().fg(Color::Gray), ""),
    }
}

fn render_feedback(
    frame: &mut Frame,
    area: Rect,
    feedback: Option<&FeedbackView>,
    loading_more: bool,
) {
    let line = match feedback {
        _ if loading_more => Line::from("Loading more...".fg(Color::Yellow)),
        Some(f) if f.is_correct => Line::from("Correct!".fg(Color::Green).bold()),
        Some(_) => Line::from("Wrong!".fg(Color::Red).bold()),
        None => Line::from(""),
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_controls(frame: &mut Frame, area: Rect, answered: bool) {
    let text = if answered {
        "n next  ·  h home  ·  q quit"
    } else {
        "j/k navigate  ·  enter select  ·  h home  ·  q quit"
    };
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
