//! Application state types
//!
//! All state types live here to maintain clean dependency:
//! UI layer imports from app layer, not vice versa.

use crate::backend::Email;
use crate::constants::ERROR_TTL_SECS;
use crate::effects::ParticleSystem;
use crate::input::KeybindingEntry;

use super::deck::Card;
use super::sync::SyncModel;

#[derive(Debug, Clone, Default)]
pub enum View {
    #[default]
    Deck,
    /// The original email behind a card
    Reader { email_id: String },
}

/// Modal overlay state - only one can be active at a time
#[derive(Debug, Clone, Default)]
pub enum ModalState {
    #[default]
    None,
    Help {
        keybindings: Vec<KeybindingEntry>,
        scroll: usize,
    },
}

impl ModalState {
    pub fn is_help(&self) -> bool {
        matches!(self, Self::Help { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReaderState {
    /// Body converted to plain text when the reader opened
    pub text: String,
    pub scroll: u16,
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub error: Option<String>,
    pub error_time: Option<std::time::Instant>,
    pub message: String,
    /// Persists after error bar expires - shown as indicator in status bar
    pub has_unacknowledged_error: bool,
}

impl StatusState {
    pub fn set_error(&mut self, error: impl ToString) {
        self.error = Some(error.to_string());
        self.error_time = Some(std::time::Instant::now());
        self.has_unacknowledged_error = true;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
        self.error_time = None;
    }

    /// Acknowledge the error indicator (clear the persistent flag)
    pub fn acknowledge_error(&mut self) {
        self.has_unacknowledged_error = false;
    }

    /// Clear error if TTL expired. Returns true if error was cleared.
    pub fn clear_error_if_expired(&mut self) -> bool {
        if let Some(time) = self.error_time
            && time.elapsed().as_secs() >= ERROR_TTL_SECS
        {
            self.clear_error();
            true
        } else {
            false
        }
    }

    pub fn set_message(&mut self, msg: impl ToString) {
        self.message = msg.to_string();
    }
}

/// Calendar grants shown in the status bar
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessState {
    pub events: bool,
    pub reminders: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub view: View,
    pub sync: SyncModel,
    pub reader: ReaderState,
    pub modal: ModalState,
    pub status: StatusState,
    pub access: AccessState,
    pub effects: ParticleSystem,
    /// Backend host shown in the status bar
    pub backend: String,
    /// Key hints for the help bar, resolved from the active bindings
    pub hints: Vec<(String, &'static str)>,
    pub reader_hints: Vec<(String, &'static str)>,
}

impl AppState {
    pub fn current_card(&self) -> Option<&Card> {
        self.sync.deck.current()
    }

    /// Email shown by the reader, if the reader is open
    pub fn reader_email(&self) -> Option<&Email> {
        match &self.view {
            View::Reader { email_id } => self.sync.email(email_id),
            View::Deck => None,
        }
    }

    /// Move the sync model's latest message and error into the status bar.
    /// An unchanged sync message leaves the status line alone.
    pub fn absorb_sync(&mut self) {
        if let Some(message) = self.sync.take_fresh_message() {
            self.status.set_message(message);
        }
        if let Some(error) = self.sync.error.take() {
            self.status.set_error(error);
        }
    }

    pub fn set_error(&mut self, error: impl ToString) {
        self.status.set_error(error);
    }

    pub fn clear_error_if_expired(&mut self) -> bool {
        self.status.clear_error_if_expired()
    }

    pub fn acknowledge_error(&mut self) {
        self.status.acknowledge_error();
    }

    pub fn has_unacknowledged_error(&self) -> bool {
        self.status.has_unacknowledged_error
    }

    pub fn set_status(&mut self, msg: impl ToString) {
        self.status.set_message(msg);
    }
}
