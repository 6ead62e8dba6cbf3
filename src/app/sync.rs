//! Remote sync view-model
//!
//! Applies sync actor events to the card state and decides which request,
//! if any, follows. It never talks to the network itself; the event loop
//! forwards the returned commands to the actor.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::backend::{BatchStatus, Email, RefreshStatus, Request, SyncCommand, SyncEvent};
use crate::config::CardOrder;

use super::deck::{Deck, flatten};

pub const EMPTY_RESULT_MESSAGE: &str = "No todos or events found";

#[derive(Debug, Clone, Default)]
pub struct SyncModel {
    pub emails: Vec<Email>,
    pub deck: Deck,
    pub last_status: Option<RefreshStatus>,
    pub message: String,
    pub error: Option<String>,
    /// Keep polling the status endpoint until the job reaches a terminal state
    pub polling: bool,
    pub last_poll: Option<Instant>,
    in_flight: HashSet<Request>,
    card_order: CardOrder,
    /// `message` changed since the UI last picked it up
    message_fresh: bool,
    /// The next fetch delivers a batch this session watched complete
    announce_next_fetch: bool,
}

/// Outcome of applying one event
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Applied {
    /// Request to issue next, if any
    pub follow_up: Option<FollowUp>,
    /// A fetch replaced the deck with this many cards
    pub loaded_cards: Option<usize>,
    /// The fetch followed a job completing, so it is news to the user
    pub announce: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    FetchProcessed,
}

impl FollowUp {
    pub fn into_command(self) -> SyncCommand {
        match self {
            Self::FetchProcessed => SyncCommand::FetchProcessed,
        }
    }
}

impl SyncModel {
    pub fn new(card_order: CardOrder) -> Self {
        Self {
            card_order,
            ..Default::default()
        }
    }

    /// Replace the status line. Repeating the current text is not a change.
    pub fn set_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        if message != self.message {
            self.message = message;
            self.message_fresh = true;
        }
    }

    /// The message, if it changed since the last call
    pub fn take_fresh_message(&mut self) -> Option<&str> {
        if std::mem::take(&mut self.message_fresh) {
            Some(&self.message)
        } else {
            None
        }
    }

    pub fn is_in_flight(&self, request: Request) -> bool {
        self.in_flight.contains(&request)
    }

    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty() || self.polling
    }

    /// Record that `cmd` is about to be sent. Returns false when the same
    /// request is already outstanding and the command should be dropped.
    pub fn begin(&mut self, cmd: &SyncCommand) -> bool {
        let Some(request) = cmd.request() else {
            return true;
        };
        if !self.in_flight.insert(request) {
            tracing::debug!("{} already in flight, skipping", request.describe());
            return false;
        }
        match request {
            Request::Refresh => {
                self.error = None;
                self.set_message("Starting refresh...");
            }
            Request::Status => self.last_poll = Some(Instant::now()),
            Request::Processed => self.set_message("Loading results..."),
        }
        true
    }

    /// Whether the auto-poll timer should fire now
    pub fn poll_due(&self, interval: Duration) -> bool {
        self.polling
            && !self.is_in_flight(Request::Status)
            && self.last_poll.is_none_or(|t| t.elapsed() >= interval)
    }

    pub fn apply(&mut self, event: SyncEvent) -> Applied {
        match event {
            SyncEvent::RefreshStarted => {
                self.in_flight.remove(&Request::Refresh);
                self.polling = true;
                self.last_poll = None;
                self.set_message("Refresh started");
                Applied::default()
            }
            SyncEvent::Status(status) => {
                self.in_flight.remove(&Request::Status);
                self.apply_status(status)
            }
            SyncEvent::Emails(emails) => {
                self.in_flight.remove(&Request::Processed);
                let count = self.replace_emails(emails);
                Applied {
                    follow_up: None,
                    loaded_cards: Some(count),
                    announce: std::mem::take(&mut self.announce_next_fetch),
                }
            }
            SyncEvent::Failed { request, error } => {
                self.in_flight.remove(&request);
                match request {
                    Request::Refresh => self.polling = false,
                    Request::Processed => self.announce_next_fetch = false,
                    Request::Status => {}
                }
                self.error = Some(format!("{} failed: {}", request.describe(), error));
                Applied::default()
            }
        }
    }

    fn apply_status(&mut self, status: RefreshStatus) -> Applied {
        tracing::debug!("Batch status: {} ({})", status.status, status.message);

        self.set_message(if status.message.is_empty() {
            format!("Status: {}", status.status)
        } else {
            status.message.clone()
        });

        // Only a job seen running here counts as a new batch
        let watched_job = self.polling;
        if status.status.is_terminal() {
            self.polling = false;
        }

        let follow_up = match status.status {
            BatchStatus::Completed => {
                self.announce_next_fetch |= watched_job;
                if self.is_in_flight(Request::Processed) {
                    None
                } else {
                    Some(FollowUp::FetchProcessed)
                }
            }
            BatchStatus::Error => {
                self.error = Some(if status.message.is_empty() {
                    "Backend reported an error".to_string()
                } else {
                    status.message.clone()
                });
                None
            }
            _ => {
                // A job started elsewhere is followed too
                if status.status.is_running() {
                    self.polling = true;
                }
                None
            }
        };

        self.last_status = Some(status);
        Applied {
            follow_up,
            ..Applied::default()
        }
    }

    /// Swap in a fresh fetch result. Returns the new card count.
    fn replace_emails(&mut self, emails: Vec<Email>) -> usize {
        let cards = flatten(&emails, self.card_order);
        let count = cards.len();
        self.emails = emails;
        self.deck = Deck::new(cards);
        self.error = None;

        let extracted = self
            .emails
            .iter()
            .map(|e| e.todos.len() + e.events.len())
            .sum::<usize>();
        self.set_message(if self.emails.is_empty() {
            EMPTY_RESULT_MESSAGE.to_string()
        } else {
            format!(
                "{} items from {} emails",
                extracted,
                self.emails.len()
            )
        });
        count
    }

    pub fn email(&self, id: &str) -> Option<&Email> {
        self.emails.iter().find(|e| e.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::MockTransport;
    use crate::backend::{PROCESSED_PATH, STATUS_PATH, Todo, spawn_sync_actor};

    fn status(s: BatchStatus, message: &str) -> RefreshStatus {
        RefreshStatus {
            status: s,
            message: message.to_string(),
            last_updated: None,
            count: 0,
        }
    }

    fn one_email() -> Vec<Email> {
        vec![Email {
            id: Some("1".to_string()),
            from_addr: "a@example.com".to_string(),
            subject: "Dentist".to_string(),
            date: String::new(),
            preview: String::new(),
            body_html: String::new(),
            todos: vec![Todo {
                content: "Confirm appointment".to_string(),
                completed: false,
                completion_deadline: None,
            }],
            events: vec![],
        }]
    }

    fn loaded_model() -> SyncModel {
        let mut model = SyncModel::new(CardOrder::EventsFirst);
        model.apply(SyncEvent::Emails(one_email()));
        model.deck.advance();
        model
    }

    #[test]
    fn test_completed_status_requests_one_fetch() {
        let mut model = SyncModel::new(CardOrder::EventsFirst);
        let applied = model.apply(SyncEvent::Status(status(BatchStatus::Completed, "done")));
        assert_eq!(applied.follow_up, Some(FollowUp::FetchProcessed));
        assert!(!model.polling);
        assert_eq!(model.message, "done");
    }

    #[test]
    fn test_completed_while_fetch_in_flight_does_not_refetch() {
        let mut model = SyncModel::new(CardOrder::EventsFirst);
        assert!(model.begin(&SyncCommand::FetchProcessed));
        let applied = model.apply(SyncEvent::Status(status(BatchStatus::Completed, "")));
        assert_eq!(applied.follow_up, None);
    }

    #[test]
    fn test_non_terminal_status_keeps_polling() {
        let mut model = SyncModel::new(CardOrder::EventsFirst);
        for s in [BatchStatus::Fetching, BatchStatus::Processing] {
            let applied = model.apply(SyncEvent::Status(status(s, "")));
            assert_eq!(applied.follow_up, None);
            assert!(model.polling);
        }
        assert_eq!(model.message, "Status: processing");
    }

    #[test]
    fn test_error_status_stops_polling() {
        let mut model = SyncModel::new(CardOrder::EventsFirst);
        model.polling = true;
        let applied = model.apply(SyncEvent::Status(status(BatchStatus::Error, "IMAP login failed")));
        assert_eq!(applied.follow_up, None);
        assert!(!model.polling);
        assert_eq!(model.error.as_deref(), Some("IMAP login failed"));
    }

    #[test]
    fn test_fetch_replaces_deck_and_resets_cursor() {
        let mut model = loaded_model();
        assert_eq!(model.deck.index(), 1);

        let applied = model.apply(SyncEvent::Emails(one_email()));
        assert_eq!(applied.loaded_cards, Some(2));
        assert_eq!(model.deck.index(), 0);
        assert_eq!(model.message, "1 items from 1 emails");
    }

    #[test]
    fn test_only_a_watched_job_announces_its_fetch() {
        let mut model = SyncModel::new(CardOrder::EventsFirst);

        // Startup poll finds an old completed batch
        let applied = model.apply(SyncEvent::Status(status(BatchStatus::Completed, "")));
        assert_eq!(applied.follow_up, Some(FollowUp::FetchProcessed));
        assert!(model.begin(&SyncCommand::FetchProcessed));
        assert!(!model.apply(SyncEvent::Emails(one_email())).announce);

        // Manual fetch
        assert!(model.begin(&SyncCommand::FetchProcessed));
        assert!(!model.apply(SyncEvent::Emails(one_email())).announce);

        // Refresh runs to completion
        assert!(model.begin(&SyncCommand::TriggerRefresh));
        model.apply(SyncEvent::RefreshStarted);
        model.apply(SyncEvent::Status(status(BatchStatus::Processing, "")));
        let applied = model.apply(SyncEvent::Status(status(BatchStatus::Completed, "")));
        assert_eq!(applied.follow_up, Some(FollowUp::FetchProcessed));
        assert!(model.begin(&SyncCommand::FetchProcessed));
        assert!(model.apply(SyncEvent::Emails(one_email())).announce);

        // Flag is spent
        assert!(model.begin(&SyncCommand::FetchProcessed));
        assert!(!model.apply(SyncEvent::Emails(one_email())).announce);
    }

    #[test]
    fn test_cards_without_backend_ids_resolve_their_own_email() {
        let mut model = SyncModel::new(CardOrder::EventsFirst);
        let emails = crate::backend::decode_emails(
            r#"[{"id": "1", "subject": "Real one"}, {"subject": "Second, no id"}]"#,
        )
        .unwrap();
        model.apply(SyncEvent::Emails(emails));

        // Each email flattens to its original card only
        assert_eq!(model.deck.len(), 2);
        model.deck.advance();
        let card = model.deck.current().unwrap();
        assert_eq!(card.subject, "Second, no id");
        assert_eq!(model.email(&card.email_id).unwrap().subject, "Second, no id");
    }

    #[test]
    fn test_empty_result_is_a_message_not_an_error() {
        let mut model = loaded_model();
        model.apply(SyncEvent::Emails(vec![]));
        assert_eq!(model.message, EMPTY_RESULT_MESSAGE);
        assert!(model.error.is_none());
        assert!(model.deck.is_empty());
    }

    #[test]
    fn test_failure_leaves_cards_untouched() {
        let mut model = loaded_model();
        model.apply(SyncEvent::Status(status(BatchStatus::Idle, "idle")));
        let before_status = model.last_status.clone();

        for request in [Request::Refresh, Request::Status, Request::Processed] {
            model.apply(SyncEvent::Failed {
                request,
                error: "Unexpected response from server: expected value".to_string(),
            });
            assert_eq!(model.emails, one_email());
            assert_eq!(model.deck.len(), 2);
            assert_eq!(model.deck.index(), 1);
            assert_eq!(model.last_status, before_status);
            assert!(model.error.as_deref().unwrap().contains("Unexpected response"));
        }
    }

    #[test]
    fn test_duplicate_requests_are_dropped() {
        let mut model = SyncModel::new(CardOrder::EventsFirst);
        assert!(model.begin(&SyncCommand::PollStatus));
        assert!(!model.begin(&SyncCommand::PollStatus));
        model.apply(SyncEvent::Status(status(BatchStatus::Idle, "")));
        assert!(model.begin(&SyncCommand::PollStatus));
    }

    #[test]
    fn test_poll_due_respects_interval_and_in_flight() {
        let mut model = SyncModel::new(CardOrder::EventsFirst);
        assert!(!model.poll_due(Duration::ZERO));

        model.apply(SyncEvent::RefreshStarted);
        assert!(model.poll_due(Duration::from_secs(60)));

        model.begin(&SyncCommand::PollStatus);
        assert!(!model.poll_due(Duration::ZERO));

        model.apply(SyncEvent::Status(status(BatchStatus::Processing, "")));
        assert!(!model.poll_due(Duration::from_secs(60)));
        assert!(model.poll_due(Duration::ZERO));
    }

    /// Drive the actor and model together the way the event loop does.
    async fn pump(
        model: &mut SyncModel,
        handle: &mut crate::backend::SyncActorHandle,
        cmd: SyncCommand,
    ) {
        let mut next = Some(cmd);
        while let Some(cmd) = next.take() {
            if !model.begin(&cmd) {
                continue;
            }
            handle.cmd_tx.send(cmd).await.unwrap();
            let event = handle.event_rx.recv().await.unwrap();
            next = model.apply(event).follow_up.map(FollowUp::into_command);
        }
    }

    #[tokio::test]
    async fn test_completed_status_fetches_exactly_once_end_to_end() {
        let transport = MockTransport::default();
        transport.respond(
            STATUS_PATH,
            r#"{"status": "completed", "message": "Processed 1 emails", "count": 1}"#,
        );
        transport.respond(
            PROCESSED_PATH,
            r#"[{"id": "1", "subject": "Dentist", "todos": [{"content": "Confirm"}], "events": []}]"#,
        );
        let mut handle = spawn_sync_actor(transport.clone());
        let mut model = SyncModel::new(CardOrder::EventsFirst);

        pump(&mut model, &mut handle, SyncCommand::PollStatus).await;

        assert_eq!(transport.call_count("GET /refresh-status"), 1);
        assert_eq!(transport.call_count("GET /processed-emails"), 1);
        assert_eq!(model.deck.len(), 2);
        assert!(!model.is_busy());
    }

    #[tokio::test]
    async fn test_processing_status_does_not_fetch() {
        let transport = MockTransport::default();
        transport.respond(STATUS_PATH, r#"{"status": "processing", "message": "", "count": 0}"#);
        let mut handle = spawn_sync_actor(transport.clone());
        let mut model = SyncModel::new(CardOrder::EventsFirst);

        pump(&mut model, &mut handle, SyncCommand::PollStatus).await;

        assert_eq!(transport.call_count("GET /processed-emails"), 0);
        assert!(model.polling);
    }

    #[tokio::test]
    async fn test_malformed_results_keep_previous_deck_end_to_end() {
        let transport = MockTransport::default();
        transport.respond(STATUS_PATH, r#"{"status": "completed", "message": "", "count": 1}"#);
        transport.respond(PROCESSED_PATH, r#"{"not": "a list"}"#);
        let mut handle = spawn_sync_actor(transport);
        let mut model = loaded_model();

        pump(&mut model, &mut handle, SyncCommand::PollStatus).await;

        assert_eq!(model.emails, one_email());
        assert_eq!(model.deck.index(), 1);
        assert!(model.error.as_deref().unwrap().starts_with("Loading results failed"));
    }
}
