use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem},
};

use super::popup::centered_rect_constrained;
use super::theme::{Theme, borders};
use crate::input::KeybindingEntry;

/// Keybinding reference, grouped by category
pub fn render_help_popup(frame: &mut Frame, area: Rect, keys: &[KeybindingEntry], scroll: usize) {
    let mut category_count = 0;
    let mut last: Option<&str> = None;
    for key in keys {
        if last != Some(key.category) {
            category_count += 1;
            last = Some(key.category);
        }
    }

    let content_height = keys.len() + category_count * 2;
    let popup_area =
        centered_rect_constrained(area, 36, 50, 10, content_height as u16 + 2);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Help ")
        .title_bottom(" j/k scroll │ ? or Esc close ")
        .borders(Borders::ALL)
        .border_type(borders::popup())
        .border_style(Theme::border_focused());

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut items: Vec<ListItem> = Vec::new();
    let mut current_category: Option<&str> = None;
    let key_width = 12;

    for entry in keys {
        if current_category != Some(entry.category) {
            if current_category.is_some() {
                items.push(ListItem::new(Line::from("")));
            }

            let header_line = Line::from(vec![
                Span::styled(
                    format!("── {} ", entry.category),
                    Theme::text_secondary().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    "─".repeat(
                        inner.width.saturating_sub(entry.category.len() as u16 + 4) as usize,
                    ),
                    Theme::border(),
                ),
            ]);
            items.push(ListItem::new(header_line));
            current_category = Some(entry.category);
        }

        let key_display = if entry.key.chars().count() > key_width {
            entry.key.chars().take(key_width).collect::<String>()
        } else {
            format!("{:width$}", entry.key, width = key_width)
        };

        items.push(ListItem::new(Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(key_display, Theme::text_accent()),
            Span::styled(entry.description.as_str(), Theme::text()),
        ])));
    }

    let visible_items: Vec<ListItem> = items.into_iter().skip(scroll).collect();
    frame.render_widget(List::new(visible_items).style(Theme::text()), inner);
}
