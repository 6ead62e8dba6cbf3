//! Status bar rendering with the batch indicator and calendar access badges

use chrono::{DateTime, Local, Utc};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use super::theme::{Theme, symbols};
use super::widgets::truncate_to_width;
use crate::app::state::AppState;
use crate::backend::BatchStatus;
use crate::constants::SPINNER_FRAME_MS;

pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let style = Theme::status_bar();
    let width = area.width as usize;

    let mut left: Vec<(String, Style)> = Vec::new();

    // Batch indicator
    let status = state.sync.last_status.as_ref();
    let (indicator, indicator_style) = if state.sync.is_busy() {
        (spinner_char().to_string(), Theme::status_syncing())
    } else {
        match status.map(|s| &s.status) {
            Some(BatchStatus::Completed) => (symbols::DONE.to_string(), Theme::status_ok()),
            Some(BatchStatus::Error) => (symbols::FAILED.to_string(), Theme::status_failed()),
            _ => (symbols::IDLE.to_string(), Theme::status_muted()),
        }
    };
    left.push((format!(" {} ", indicator), indicator_style));

    if state.has_unacknowledged_error() {
        left.push(("! ".to_string(), Theme::status_failed()));
    }

    match status {
        Some(s) => {
            left.push((s.status.label().to_string(), style.add_modifier(Modifier::BOLD)));
            left.push((format!(" {} emails", s.count), style));
            if let Some(updated) = s.last_updated.as_deref().filter(|u| !u.is_empty()) {
                left.push((format!(" · {}", format_updated(updated)), Theme::status_muted()));
            }
        }
        None => left.push(("no status yet".to_string(), Theme::status_muted())),
    }

    // Right side: message │ access │ backend
    let mut right: Vec<(String, Style)> = Vec::new();
    if !state.status.message.is_empty() {
        right.push((format!("{} │ ", state.status.message), Theme::status_info()));
    }
    for (name, granted) in [
        ("cal", state.access.events),
        ("rem", state.access.reminders),
    ] {
        let (symbol, symbol_style) = if granted {
            (symbols::ACCESS_GRANTED, Theme::status_ok())
        } else {
            (symbols::ACCESS_MISSING, Theme::status_muted())
        };
        right.push((format!("{} ", symbol), symbol_style));
        right.push((format!("{} ", name), Theme::status_info()));
    }
    right.push(("│ ".to_string(), Theme::status_muted()));

    let left_width: usize = left.iter().map(|(s, _)| s.width()).sum();
    let right_width: usize = right.iter().map(|(s, _)| s.width()).sum();
    let host = host_of(&state.backend);
    let min_padding = 2;
    let available_for_host = width.saturating_sub(left_width + right_width + min_padding + 1);
    let host = truncate_to_width(host, available_for_host.max(10));
    right.push((format!("{} ", host), style));

    let right_width = right_width + host.width() + 1;
    let padding = " ".repeat(width.saturating_sub(left_width + right_width));

    let mut spans: Vec<Span> = left
        .into_iter()
        .map(|(text, s)| Span::styled(text, s))
        .collect();
    spans.push(Span::styled(padding, style));
    spans.extend(right.into_iter().map(|(text, s)| Span::styled(text, s)));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(style), area);
}

/// Strip the scheme so the bar shows `host:port/path`
fn host_of(url: &str) -> &str {
    url.split_once("://")
        .map_or(url, |(_, rest)| rest)
        .trim_end_matches('/')
}

/// Backend timestamps are RFC 3339 when present; anything else is shown as-is
fn format_updated(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(then) => format_relative_time(then.with_timezone(&Utc), Utc::now()),
        Err(_) => raw.to_string(),
    }
}

/// Format a timestamp as relative time (e.g., "2m ago", "1h ago", "yesterday")
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(then);

    if diff.num_seconds() < 60 {
        "just now".to_string()
    } else if diff.num_minutes() < 60 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_hours() < 24 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() == 1 {
        "yesterday".to_string()
    } else if diff.num_days() < 7 {
        format!("{}d ago", diff.num_days())
    } else {
        then.with_timezone(&Local).format("%b %d").to_string()
    }
}

/// Get an animated spinner character for loading states
pub fn spinner_char() -> char {
    let spinner = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let idx = (millis / SPINNER_FRAME_MS) as usize % spinner.chars().count();

    spinner.chars().nth(idx).unwrap_or('*')
}
