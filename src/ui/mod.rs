mod deck;
mod help;
mod popup;
mod reader;
mod status_bar;
pub mod theme;
mod widgets;

use ratatui::{Frame, widgets::Block};

use crate::app::state::{AppState, ModalState, View};
use theme::Theme;

pub fn render(frame: &mut Frame, state: &AppState) {
    // Paint the theme background first so unstyled cells match
    frame.render_widget(Block::default().style(Theme::main_bg()), frame.area());

    match &state.view {
        View::Deck => deck::render_deck(frame, state),
        View::Reader { .. } => reader::render_reader(frame, state),
    }

    // Modal overlays draw last
    if let ModalState::Help {
        keybindings,
        scroll,
    } = &state.modal
    {
        let area = frame.area();
        help::render_help_popup(frame, area, keybindings, *scroll);
    }
}
