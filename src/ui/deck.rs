use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::popup::centered_rect_constrained;
use super::status_bar::render_status_bar;
use super::theme::{Theme, borders, colors, symbols};
use super::widgets::{error_bar, help_bar, sanitize_text, truncate_to_width};
use crate::app::accept::parse_when;
use crate::app::deck::{Card, CardKind, Decision, Direction};
use crate::app::state::AppState;
use crate::backend::{Email, Event, Todo};
use crate::calendar::When;
use crate::constants::{CARD_MAX_HEIGHT, CARD_MAX_WIDTH};
use crate::effects::{BurstKind, ParticleSystem};

pub fn render_deck(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Status bar
        Constraint::Min(0),    // Card area
        Constraint::Length(1), // Position
        Constraint::Length(1), // Help bar
    ])
    .split(frame.area());

    render_status_bar(frame, chunks[0], state);

    match state.current_card() {
        Some(card) => {
            let card_area =
                centered_rect_constrained(chunks[1], 30, CARD_MAX_WIDTH, 8, CARD_MAX_HEIGHT);
            render_card(frame, card_area, card, state);
            render_position(frame, chunks[2], state);
            render_particles(frame, card_area, chunks[1], &state.effects);
        }
        None => render_empty(frame, chunks[1], state),
    }

    if let Some(ref error) = state.status.error {
        error_bar(frame, chunks[3], error);
    } else {
        help_bar(frame, chunks[3], &state.hints);
    }
}

fn kind_color(kind: &CardKind) -> ratatui::style::Color {
    match kind {
        CardKind::Todo(_) => colors::todo(),
        CardKind::Event(_) => colors::event(),
        CardKind::Original => colors::original(),
    }
}

fn render_card(frame: &mut Frame, area: Rect, card: &Card, state: &AppState) {
    let color = kind_color(&card.kind);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(borders::card())
        .border_style(Theme::card_kind(color))
        .style(Theme::card())
        .title(Line::from(vec![
            Span::styled(" ", Theme::card()),
            Span::styled(format!(" {} ", card.label()), Theme::badge(color)),
            Span::styled(" ", Theme::card()),
        ]));

    match state.sync.deck.current_decision() {
        Some(Decision::Accepted) => {
            block = block.title(
                Line::from(Span::styled(
                    format!(" {} accepted ", symbols::ACCEPTED),
                    Theme::accepted(),
                ))
                .alignment(Alignment::Right),
            );
        }
        Some(Decision::Rejected) => {
            block = block.title(
                Line::from(Span::styled(
                    format!(" {} rejected ", symbols::REJECTED),
                    Theme::rejected(),
                ))
                .alignment(Alignment::Right),
            );
        }
        None => {}
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let subject = truncate_to_width(&card.subject, inner.width.saturating_sub(2) as usize);
    let mut lines = vec![
        Line::from(Span::styled(subject, Theme::card_muted())),
        Line::from(""),
    ];

    match &card.kind {
        CardKind::Todo(todo) => todo_lines(todo, &mut lines),
        CardKind::Event(event) => event_lines(event, &mut lines),
        CardKind::Original => original_lines(state.sync.email(&card.email_id), &mut lines),
    }

    let body = Paragraph::new(lines)
        .style(Theme::card())
        .wrap(Wrap { trim: false });
    frame.render_widget(body, inner.inner(Margin::new(1, 0)));
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<7}", label), Theme::card_muted()),
        Span::styled(value, Theme::card()),
    ])
}

fn todo_lines(todo: &Todo, lines: &mut Vec<Line<'_>>) {
    lines.push(Line::from(Span::styled(
        sanitize_text(&todo.content),
        Theme::card_title(),
    )));
    lines.push(Line::from(""));
    let due = todo
        .completion_deadline
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map_or_else(|| "no deadline".to_string(), format_when);
    lines.push(field("Due", due));
    if todo.completed {
        lines.push(Line::from(Span::styled(
            format!("{} already done", symbols::ACCEPTED),
            Theme::accepted(),
        )));
    }
}

fn event_lines(event: &Event, lines: &mut Vec<Line<'_>>) {
    lines.push(Line::from(Span::styled(
        sanitize_text(&event.title),
        Theme::card_title(),
    )));
    lines.push(Line::from(""));

    let start = event.start_date.as_deref().filter(|d| !d.trim().is_empty());
    let end = event.end_date.as_deref().filter(|d| !d.trim().is_empty());
    let when = match (start, end) {
        (Some(s), Some(e)) => format!("{} → {}", format_when(s), format_when(e)),
        (Some(s), None) => format_when(s),
        (None, Some(e)) => format!("until {}", format_when(e)),
        (None, None) => "no date".to_string(),
    };
    lines.push(field("When", when));
    if let Some(location) = event.location.as_deref().filter(|l| !l.trim().is_empty()) {
        lines.push(field("Where", sanitize_text(location)));
    }
    if !event.content.trim().is_empty() {
        lines.push(Line::from(""));
        lines.extend(
            sanitize_text(&event.content)
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Theme::card()))),
        );
    }
}

fn original_lines(email: Option<&Email>, lines: &mut Vec<Line<'_>>) {
    let Some(email) = email else {
        lines.push(Line::from(Span::styled("Email not found", Theme::rejected())));
        return;
    };
    lines.push(field("From", sanitize_text(&email.from_addr)));
    if !email.date.is_empty() {
        lines.push(field("Date", format_when(&email.date)));
    }
    lines.push(Line::from(""));
    lines.extend(
        sanitize_text(&email.preview)
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), Theme::card()))),
    );
}

/// Render a backend date in local time, falling back to the raw string
fn format_when(raw: &str) -> String {
    match parse_when(raw) {
        Some(When::DateTime(dt)) => dt.with_timezone(&Local).format("%a %d %b %H:%M").to_string(),
        Some(When::Date(date)) => date.format("%a %d %b %Y").to_string(),
        None => raw.trim().to_string(),
    }
}

/// "‹ 3 / 9 ›" with the arrow of the last move highlighted
fn render_position(frame: &mut Frame, area: Rect, state: &AppState) {
    let deck = &state.sync.deck;
    let (prev_style, next_style) = match deck.direction() {
        Direction::Forward => (Theme::text_muted(), Theme::text_accent()),
        Direction::Backward => (Theme::text_accent(), Theme::text_muted()),
    };
    let prev_style = if deck.index() == 0 { Theme::border() } else { prev_style };
    let next_style = if deck.is_last() { Theme::border() } else { next_style };

    let mut spans = vec![
        Span::styled(format!("{} ", symbols::PREV), prev_style),
        Span::styled(format!("{} / {}", deck.index() + 1, deck.len()), Theme::text()),
        Span::styled(format!(" {}", symbols::NEXT), next_style),
    ];
    let decided = deck.decided_count();
    if decided > 0 {
        spans.push(Span::styled(format!("   {} reviewed", decided), Theme::text_muted()));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

fn render_empty(frame: &mut Frame, area: Rect, state: &AppState) {
    let headline = if state.sync.is_busy() {
        "Waiting for the backend..."
    } else if !state.sync.message.is_empty() {
        state.sync.message.as_str()
    } else {
        "No cards yet"
    };

    let mut lines = vec![Line::from(Span::styled(headline, Theme::text_bold()))];
    if let Some((key, _)) = state.hints.iter().find(|(_, desc)| *desc == "refresh") {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Press ", Theme::text_muted()),
            Span::styled(key.as_str(), Theme::text_accent()),
            Span::styled(" to process new email", Theme::text_muted()),
        ]));
    }

    let height = lines.len() as u16;
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .areas(area);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Theme::text()),
        middle,
    );
}

/// Draw particles straight into the buffer, relative to the card centre.
/// Particles outside `bounds` are skipped.
fn render_particles(frame: &mut Frame, card: Rect, bounds: Rect, effects: &ParticleSystem) {
    if !effects.is_active() {
        return;
    }
    let cx = card.x as f32 + card.width as f32 / 2.0;
    let cy = card.y as f32 + card.height as f32 / 2.0;

    let buf = frame.buffer_mut();
    for p in &effects.particles {
        let x = (cx + p.x).round();
        let y = (cy + p.y).round();
        if x < bounds.left() as f32
            || y < bounds.top() as f32
            || x >= bounds.right() as f32
            || y >= bounds.bottom() as f32
        {
            continue;
        }
        let style = match effects.kind {
            Some(BurstKind::Reject) => Theme::debris(p.opacity),
            _ => Theme::particle(p.hue, p.opacity),
        };
        if let Some(cell) = buf.cell_mut((x as u16, y as u16)) {
            cell.set_symbol(p.glyph());
            cell.set_style(style);
        }
    }
}
