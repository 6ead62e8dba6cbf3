use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::config::KeybindingMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Deck
    NextCard,
    PrevCard,
    Accept,
    Reject,
    OpenOriginal,

    // Scrolling (reader and help)
    ScrollUp,
    ScrollDown,

    Back,
    Quit,

    // Backend
    Refresh,
    PollNow,
    FetchNow,

    RequestAccess,

    Help,
}

pub struct KeyBindings {
    bindings: HashMap<KeyEvent, Action>,
}

/// A displayable keybinding entry
#[derive(Debug, Clone)]
pub struct KeybindingEntry {
    pub key: String,
    pub description: String,
    pub category: &'static str,
}

impl KeyBindings {
    pub fn new(mode: &KeybindingMode) -> Self {
        let bindings = match mode {
            KeybindingMode::Vim => Self::vim_bindings(),
            KeybindingMode::Arrows => Self::arrow_bindings(),
        };
        Self { bindings }
    }

    pub fn get(&self, event: &KeyEvent) -> Option<Action> {
        self.bindings.get(event).copied()
    }

    /// First key bound to `action`, formatted for hints
    pub fn key_for(&self, action: Action) -> Option<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(event, _)| format_key_event(event))
            .collect();
        keys.sort_by_key(|k| (k.len(), k.clone()));
        keys.into_iter().next()
    }

    /// Deck help bar hints: (key, short description), skipping unbound actions
    pub fn hints(&self) -> Vec<(String, &'static str)> {
        [
            (Action::Accept, "accept"),
            (Action::Reject, "reject"),
            (Action::NextCard, "next"),
            (Action::PrevCard, "prev"),
            (Action::OpenOriginal, "email"),
            (Action::Refresh, "refresh"),
            (Action::Help, "help"),
            (Action::Quit, "quit"),
        ]
        .into_iter()
        .filter_map(|(action, desc)| self.key_for(action).map(|k| (k, desc)))
        .collect()
    }

    /// Reader help bar hints
    pub fn reader_hints(&self) -> Vec<(String, &'static str)> {
        let scroll = match (self.key_for(Action::ScrollDown), self.key_for(Action::ScrollUp)) {
            (Some(down), Some(up)) => Some((format!("{}/{}", down, up), "scroll")),
            _ => None,
        };
        scroll
            .into_iter()
            .chain(self.key_for(Action::Back).map(|k| (k, "back")))
            .collect()
    }

    /// Get all keybindings as displayable entries grouped by category
    pub fn all_bindings(&self) -> Vec<KeybindingEntry> {
        let mut entries: Vec<_> = self
            .bindings
            .iter()
            .map(|(event, action)| KeybindingEntry {
                key: format_key_event(event),
                description: action_description(action).to_string(),
                category: action_category(action),
            })
            .collect();

        entries.sort_by(|a, b| {
            category_order(a.category)
                .cmp(&category_order(b.category))
                .then_with(|| a.description.cmp(&b.description))
                .then_with(|| a.key.cmp(&b.key))
        });
        entries
    }

    fn vim_bindings() -> HashMap<KeyEvent, Action> {
        let mut map = HashMap::new();

        // Deck
        map.insert(key('l'), Action::NextCard);
        map.insert(key('h'), Action::PrevCard);
        map.insert(key('y'), Action::Accept);
        map.insert(key('a'), Action::Accept);
        map.insert(key('n'), Action::Reject);
        map.insert(key('x'), Action::Reject);
        map.insert(key_code(KeyCode::Enter), Action::OpenOriginal);
        map.insert(key('o'), Action::OpenOriginal);

        map.insert(key('j'), Action::ScrollDown);
        map.insert(key('k'), Action::ScrollUp);

        map.insert(key_code(KeyCode::Esc), Action::Back);
        map.insert(key('q'), Action::Quit);

        // Backend
        map.insert(key('r'), Action::Refresh);
        map.insert(key('p'), Action::PollNow);
        map.insert(key('f'), Action::FetchNow);

        map.insert(key('c'), Action::RequestAccess);

        map.insert(key('?'), Action::Help);
        map.insert(shift_key('?'), Action::Help);

        map
    }

    fn arrow_bindings() -> HashMap<KeyEvent, Action> {
        let mut map = HashMap::new();

        // Deck
        map.insert(key_code(KeyCode::Right), Action::NextCard);
        map.insert(key_code(KeyCode::Left), Action::PrevCard);
        map.insert(key_code(KeyCode::Enter), Action::Accept);
        map.insert(key_code(KeyCode::Delete), Action::Reject);
        map.insert(key_code(KeyCode::Backspace), Action::Reject);
        map.insert(key('o'), Action::OpenOriginal);
        map.insert(key_code(KeyCode::Tab), Action::OpenOriginal);

        map.insert(key_code(KeyCode::Down), Action::ScrollDown);
        map.insert(key_code(KeyCode::Up), Action::ScrollUp);

        map.insert(key_code(KeyCode::Esc), Action::Back);
        map.insert(ctrl_key('q'), Action::Quit);

        // Backend
        map.insert(key_code(KeyCode::F(5)), Action::Refresh);
        map.insert(key_code(KeyCode::F(6)), Action::PollNow);
        map.insert(key_code(KeyCode::F(7)), Action::FetchNow);

        map.insert(key_code(KeyCode::F(8)), Action::RequestAccess);

        map.insert(key_code(KeyCode::F(1)), Action::Help);
        map.insert(key('?'), Action::Help);
        map.insert(shift_key('?'), Action::Help);

        map
    }
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn shift_key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT)
}

fn ctrl_key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Format a KeyEvent for display
fn format_key_event(event: &KeyEvent) -> String {
    let mut parts = Vec::new();

    if event.modifiers.contains(KeyModifiers::CONTROL) {
        parts.push("Ctrl+");
    }
    // Shifted characters already print as themselves
    if event.modifiers.contains(KeyModifiers::SHIFT) && !matches!(event.code, KeyCode::Char(_)) {
        parts.push("Shift+");
    }
    if event.modifiers.contains(KeyModifiers::ALT) {
        parts.push("Alt+");
    }

    let key_str = match event.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => format!("{:?}", event.code),
    };

    format!("{}{}", parts.join(""), key_str)
}

fn action_description(action: &Action) -> &'static str {
    match action {
        Action::NextCard => "Next card",
        Action::PrevCard => "Previous card",
        Action::Accept => "Accept card",
        Action::Reject => "Reject card",
        Action::OpenOriginal => "Open original email",
        Action::ScrollUp => "Scroll up",
        Action::ScrollDown => "Scroll down",
        Action::Back => "Go back / close",
        Action::Quit => "Quit",
        Action::Refresh => "Start a backend refresh",
        Action::PollNow => "Check refresh status now",
        Action::FetchNow => "Load processed emails now",
        Action::RequestAccess => "Request calendar access",
        Action::Help => "Toggle help",
    }
}

fn action_category(action: &Action) -> &'static str {
    match action {
        Action::NextCard
        | Action::PrevCard
        | Action::Accept
        | Action::Reject
        | Action::OpenOriginal => "Cards",

        Action::ScrollUp | Action::ScrollDown | Action::Back => "Navigation",

        Action::Refresh | Action::PollNow | Action::FetchNow => "Backend",

        Action::RequestAccess => "Calendar",

        Action::Help | Action::Quit => "General",
    }
}

fn category_order(category: &str) -> u8 {
    match category {
        "Cards" => 0,
        "Navigation" => 1,
        "Backend" => 2,
        "Calendar" => 3,
        "General" => 4,
        _ => 99,
    }
}
