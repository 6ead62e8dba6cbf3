use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::status_bar::render_status_bar;
use super::theme::Theme;
use super::widgets::{error_bar, help_bar, sanitize_text};
use crate::app::state::AppState;
use crate::backend::Email;

pub fn render_reader(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Status bar
        Constraint::Length(4), // Headers
        Constraint::Min(0),    // Body
        Constraint::Length(1), // Help bar
    ])
    .split(frame.area());

    render_status_bar(frame, chunks[0], state);

    if let Some(email) = state.reader_email() {
        render_headers(frame, chunks[1], email);
        render_body(frame, chunks[2], state);
    } else {
        let paragraph = Paragraph::new("Email not found").style(Theme::error_bar());
        frame.render_widget(paragraph, chunks[1]);
    }

    if let Some(ref error) = state.status.error {
        error_bar(frame, chunks[3], error);
    } else {
        help_bar(frame, chunks[3], &state.reader_hints);
    }
}

fn render_headers(frame: &mut Frame, area: Rect, email: &Email) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Theme::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label_style = Theme::label();
    let value_style = Theme::text();

    let lines = vec![
        Line::from(vec![
            Span::styled("From:    ", label_style),
            Span::styled(sanitize_text(&email.from_addr), value_style),
        ]),
        Line::from(vec![
            Span::styled("Date:    ", label_style),
            Span::styled(sanitize_text(&email.date), value_style),
        ]),
        Line::from(vec![
            Span::styled("Subject: ", label_style),
            Span::styled(sanitize_text(email.display_subject()), Theme::text_bold()),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_body(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = if state.reader.text.trim().is_empty() {
        Text::styled("(empty message)", Theme::text_muted())
    } else {
        Text::styled(sanitize_text(&state.reader.text), Theme::text())
    };

    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((state.reader.scroll, 0));
    frame.render_widget(paragraph, area);
}
