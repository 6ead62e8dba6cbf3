use crossterm::event::{Event, KeyEvent, KeyEventKind};

use super::keybindings::{Action, KeyBindings};
use crate::app::state::{AppState, View};

#[derive(Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Quit,
    Action(Action),
}

pub fn handle_input(event: Event, state: &AppState, bindings: &KeyBindings) -> InputResult {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key(key_event, state, bindings)
        }
        _ => InputResult::Continue,
    }
}

fn handle_key(key: KeyEvent, state: &AppState, bindings: &KeyBindings) -> InputResult {
    let Some(action) = bindings.get(&key) else {
        return InputResult::Continue;
    };
    if action == Action::Quit {
        return InputResult::Quit;
    }

    if state.modal.is_help() {
        return handle_help_input(action);
    }

    match state.view {
        View::Reader { .. } => handle_reader_input(action),
        View::Deck => InputResult::Action(action),
    }
}

/// In the help overlay only scrolling and closing do anything
fn handle_help_input(action: Action) -> InputResult {
    match action {
        Action::ScrollUp | Action::ScrollDown => InputResult::Action(action),
        Action::Help | Action::Back => InputResult::Action(Action::Help),
        _ => InputResult::Continue,
    }
}

fn handle_reader_input(action: Action) -> InputResult {
    match action {
        Action::NextCard | Action::PrevCard | Action::Accept | Action::Reject => {
            InputResult::Continue
        }
        // Enter on the reader goes back to the deck
        Action::OpenOriginal => InputResult::Action(Action::Back),
        _ => InputResult::Action(action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::ModalState;
    use crate::config::KeybindingMode;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn press(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn vim() -> KeyBindings {
        KeyBindings::new(&KeybindingMode::Vim)
    }

    #[test]
    fn test_deck_passes_actions_through() {
        let state = AppState::default();
        assert_eq!(
            handle_input(press('y'), &state, &vim()),
            InputResult::Action(Action::Accept)
        );
        assert_eq!(handle_input(press('q'), &state, &vim()), InputResult::Quit);
        assert_eq!(
            handle_input(press('z'), &state, &vim()),
            InputResult::Continue
        );
    }

    #[test]
    fn test_reader_ignores_card_actions() {
        let state = AppState {
            view: View::Reader {
                email_id: "1".to_string(),
            },
            ..Default::default()
        };
        assert_eq!(
            handle_input(press('y'), &state, &vim()),
            InputResult::Continue
        );
        assert_eq!(
            handle_input(press('j'), &state, &vim()),
            InputResult::Action(Action::ScrollDown)
        );
        assert_eq!(
            handle_input(press('o'), &state, &vim()),
            InputResult::Action(Action::Back)
        );
    }

    #[test]
    fn test_help_overlay_closes_on_back() {
        let state = AppState {
            modal: ModalState::Help {
                keybindings: Vec::new(),
                scroll: 0,
            },
            ..Default::default()
        };
        let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(
            handle_input(esc, &state, &vim()),
            InputResult::Action(Action::Help)
        );
        assert_eq!(
            handle_input(press('r'), &state, &vim()),
            InputResult::Continue
        );
    }
}
