//! Action dispatch for the deck, the reader and the backend controls

use chrono::Utc;

use crate::backend::SyncCommand;
use crate::calendar::AccessKind;
use crate::constants::READER_TEXT_WIDTH;
use crate::effects::BurstKind;
use crate::input::Action;

use super::App;
use super::accept::{event_to_new_event, todo_to_new_reminder};
use super::deck::{CardKind, Decision};
use super::state::{ModalState, View};

impl App {
    pub(crate) fn handle_action(&mut self, action: Action) {
        match action {
            Action::NextCard => {
                if !self.state.sync.deck.advance() && !self.state.sync.deck.is_empty() {
                    self.state.set_status("Last card");
                }
            }
            Action::PrevCard => {
                if !self.state.sync.deck.retreat() && !self.state.sync.deck.is_empty() {
                    self.state.set_status("First card");
                }
            }
            Action::Accept => self.accept_current(),
            Action::Reject => self.reject_current(),
            Action::OpenOriginal => self.open_original(),
            Action::ScrollUp => self.scroll(-1),
            Action::ScrollDown => self.scroll(1),
            Action::Back => self.back(),
            Action::Refresh => self.send(SyncCommand::TriggerRefresh),
            Action::PollNow => self.send(SyncCommand::PollStatus),
            Action::FetchNow => self.send(SyncCommand::FetchProcessed),
            Action::RequestAccess => {
                self.ensure_access(AccessKind::Events);
                self.ensure_access(AccessKind::Reminders);
            }
            Action::Help => self.toggle_help(),
            // Handled by the event loop
            Action::Quit => {}
        }
    }

    fn accept_current(&mut self) {
        let Some(card) = self.state.current_card().cloned() else {
            self.state.set_status("No cards to accept");
            return;
        };
        if self.state.sync.deck.current_decision() == Some(Decision::Accepted) {
            self.state.set_status("Already accepted");
            return;
        }

        // Notes quote the raw subject, not the "(no subject)" placeholder
        let subject = self
            .state
            .sync
            .email(&card.email_id)
            .map(|e| e.subject.clone())
            .unwrap_or_default();

        let created = match &card.kind {
            CardKind::Original => {
                self.open_original();
                return;
            }
            CardKind::Todo(todo) => {
                if !self.ensure_access(AccessKind::Reminders) {
                    return;
                }
                let reminder =
                    todo_to_new_reminder(todo, &subject, self.config.calendar.reminder_priority);
                self.calendar.add_reminder(&reminder).is_some()
            }
            CardKind::Event(event) => {
                if !self.ensure_access(AccessKind::Events) {
                    return;
                }
                let new_event = event_to_new_event(
                    event,
                    &subject,
                    self.config.calendar.default_event_minutes,
                    Utc::now(),
                );
                self.calendar.add_event(&new_event).is_some()
            }
        };
        self.absorb_calendar();

        if created {
            self.state.sync.deck.decide(Decision::Accepted);
            self.burst(BurstKind::Accept);
            self.state.sync.deck.advance();
        }
    }

    fn reject_current(&mut self) {
        let Some(card) = self.state.current_card() else {
            self.state.set_status("No cards to reject");
            return;
        };
        tracing::debug!("Rejected {} card from email {}", card.label(), card.email_id);

        self.state.sync.deck.decide(Decision::Rejected);
        self.burst(BurstKind::Reject);
        self.state.sync.deck.advance();
    }

    fn open_original(&mut self) {
        let Some(card) = self.state.current_card() else {
            return;
        };
        let email_id = card.email_id.clone();
        let Some(email) = self.state.sync.email(&email_id) else {
            self.state.set_error("Email no longer available");
            return;
        };

        let text = if email.body_html.trim().is_empty() {
            email.preview.clone()
        } else {
            html2text::config::plain()
                .string_from_read(email.body_html.as_bytes(), READER_TEXT_WIDTH)
                .unwrap_or_else(|e| {
                    tracing::warn!("Failed to convert email {} to text: {}", email_id, e);
                    email.preview.clone()
                })
        };

        self.state.reader.text = text;
        self.state.reader.scroll = 0;
        self.state.view = View::Reader { email_id };
    }

    fn scroll(&mut self, delta: i32) {
        if let ModalState::Help { scroll, .. } = &mut self.state.modal {
            *scroll = scroll.saturating_add_signed(delta as isize);
            return;
        }
        if matches!(self.state.view, View::Reader { .. }) {
            let reader = &mut self.state.reader;
            reader.scroll = reader.scroll.saturating_add_signed(delta as i16);
        }
    }

    fn back(&mut self) {
        if self.state.modal.is_help() {
            self.state.modal = ModalState::None;
        } else if matches!(self.state.view, View::Reader { .. }) {
            self.state.view = View::Deck;
        }
    }

    fn toggle_help(&mut self) {
        self.state.modal = if self.state.modal.is_help() {
            ModalState::None
        } else {
            ModalState::Help {
                keybindings: self.bindings.all_bindings(),
                scroll: 0,
            }
        };
    }

    /// Request `kind` access if it is not granted yet. Returns whether it is.
    fn ensure_access(&mut self, kind: AccessKind) -> bool {
        let granted = self.calendar.has_access(kind) || self.calendar.request_access(kind);
        match kind {
            AccessKind::Events => self.state.access.events = granted,
            AccessKind::Reminders => self.state.access.reminders = granted,
        }
        self.absorb_calendar();
        if !granted && self.state.status.error.is_none() {
            self.state.set_error(format!("Access to {} not granted", kind));
        }
        granted
    }

    /// Move the calendar facade's latest outcome into the status bar.
    fn absorb_calendar(&mut self) {
        if let Some(message) = self.calendar.last_message.take() {
            self.state.set_status(message);
        }
        if let Some(error) = self.calendar.last_error.take() {
            self.state.set_error(error);
        }
    }

    fn burst(&mut self, kind: BurstKind) {
        if self.config.ui.effects {
            self.state.effects.burst((0.0, 0.0), kind, &mut rand::rng());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::MockTransport;
    use crate::backend::{Email, Event, SyncEvent, Todo};
    use crate::config::Config;
    use std::path::Path;

    fn config(dir: &Path, calendar_enabled: bool) -> Config {
        let mut config = Config::default();
        config.calendar.directory = Some(dir.to_path_buf());
        config.calendar.enabled = calendar_enabled;
        config.notifications.enabled = false;
        config
    }

    fn email() -> Email {
        Email {
            id: Some("1".to_string()),
            subject: "Planning".to_string(),
            preview: "Agenda attached".to_string(),
            body_html: "<p>Hello <b>team</b></p>".to_string(),
            todos: vec![Todo {
                content: "Send agenda".to_string(),
                completed: false,
                completion_deadline: Some("2025-01-12".to_string()),
            }],
            events: vec![Event {
                title: "Kickoff".to_string(),
                content: String::new(),
                location: None,
                start_date: Some("2025-01-11T10:00:00Z".to_string()),
                end_date: None,
            }],
            ..Default::default()
        }
    }

    /// App holding one email: cards are [event, todo, original]
    fn app(dir: &Path, calendar_enabled: bool) -> App {
        let mut app =
            App::with_transport(config(dir, calendar_enabled), MockTransport::default()).unwrap();
        app.apply_sync_event(SyncEvent::Emails(vec![email()]));
        assert_eq!(app.state.sync.deck.len(), 3);
        app
    }

    fn files_in(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_accept_event_writes_calendar_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path(), true);

        app.handle_action(Action::Accept);

        assert_eq!(files_in(&tmp.path().join("events")), 1);
        assert_eq!(app.state.sync.deck.index(), 1);
        assert_eq!(app.state.status.message, "Added \"Kickoff\" to calendar");
        assert!(app.state.access.events);
        assert!(app.state.effects.is_active());

        app.handle_action(Action::PrevCard);
        assert_eq!(
            app.state.sync.deck.current_decision(),
            Some(Decision::Accepted)
        );
    }

    #[tokio::test]
    async fn test_accept_todo_writes_reminder() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path(), true);

        app.handle_action(Action::NextCard);
        app.handle_action(Action::Accept);

        assert_eq!(files_in(&tmp.path().join("reminders")), 1);
        assert_eq!(app.state.status.message, "Added \"Send agenda\" to reminders");
        assert_eq!(app.state.sync.deck.index(), 2);
    }

    #[tokio::test]
    async fn test_accepting_twice_writes_once() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path(), true);

        app.handle_action(Action::Accept);
        app.handle_action(Action::PrevCard);
        app.handle_action(Action::Accept);

        assert_eq!(files_in(&tmp.path().join("events")), 1);
        assert_eq!(app.state.status.message, "Already accepted");
    }

    #[tokio::test]
    async fn test_denied_access_keeps_card() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path(), false);

        app.handle_action(Action::Accept);

        assert_eq!(app.state.sync.deck.index(), 0);
        assert_eq!(app.state.sync.deck.current_decision(), None);
        assert_eq!(
            app.state.status.error.as_deref(),
            Some("Access to calendar not granted")
        );
        assert!(!tmp.path().join("events").exists());
    }

    #[tokio::test]
    async fn test_reject_is_local_only() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path(), true);

        app.handle_action(Action::Reject);

        assert_eq!(app.state.sync.deck.index(), 1);
        assert_eq!(app.state.sync.deck.decided_count(), 1);
        assert!(!tmp.path().join("events").exists());
    }

    #[tokio::test]
    async fn test_original_card_opens_reader() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path(), true);

        app.handle_action(Action::NextCard);
        app.handle_action(Action::NextCard);
        app.handle_action(Action::Accept);

        assert!(matches!(app.state.view, View::Reader { ref email_id } if email_id == "1"));
        assert!(app.state.reader.text.contains("Hello"));

        app.handle_action(Action::ScrollDown);
        app.handle_action(Action::ScrollDown);
        app.handle_action(Action::ScrollUp);
        assert_eq!(app.state.reader.scroll, 1);

        app.handle_action(Action::Back);
        assert!(matches!(app.state.view, View::Deck));
    }

    #[tokio::test]
    async fn test_navigation_reports_bounds() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path(), true);

        app.handle_action(Action::PrevCard);
        assert_eq!(app.state.status.message, "First card");
        assert_eq!(app.state.sync.deck.index(), 0);
    }

    #[tokio::test]
    async fn test_help_toggles() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path(), true);

        app.handle_action(Action::Help);
        assert!(app.state.modal.is_help());
        app.handle_action(Action::Back);
        assert!(!app.state.modal.is_help());
    }

    #[tokio::test]
    async fn test_request_access_grants_both() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path(), true);

        app.handle_action(Action::RequestAccess);

        assert!(app.state.access.events);
        assert!(app.state.access.reminders);
        assert_eq!(app.state.status.message, "Access to reminders granted");
    }

    #[tokio::test]
    async fn test_refresh_is_sent_once_while_in_flight() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(tmp.path(), true);

        app.handle_action(Action::Refresh);
        app.handle_action(Action::Refresh);

        assert!(app.state.sync.is_in_flight(crate::backend::Request::Refresh));
        assert_eq!(app.state.status.message, "Starting refresh...");
    }
}
