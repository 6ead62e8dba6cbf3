//! Main event loop and sync event processing

use anyhow::Result;
use crossterm::event;
use std::time::{Duration, Instant};

use crate::backend::{SyncCommand, SyncEvent};
use crate::constants::{ACTIVE_POLL_MS, IDLE_POLL_MS, SPINNER_FRAME_MS};
use crate::input::{InputResult, handle_input};

use super::App;
use super::render_thread::RenderThread;
use super::state::View;

impl App {
    pub(crate) async fn event_loop(&mut self, render_thread: &RenderThread) -> Result<()> {
        let poll_interval = Duration::from_millis(self.config.backend.poll_interval_ms);

        loop {
            // Drain sync events first so results show up before the next key
            if self.process_sync_events() {
                self.dirty = true;
            }

            if self.state.sync.poll_due(poll_interval) {
                self.send(SyncCommand::PollStatus);
            }

            if self.tick_effects() {
                self.dirty = true;
            }

            if self.state.clear_error_if_expired() {
                self.dirty = true;
            }

            // Keep the spinner moving while requests are out
            if self.state.sync.is_busy()
                && self.last_frame.elapsed().as_millis() >= SPINNER_FRAME_MS
            {
                self.dirty = true;
            }

            if self.dirty && render_thread.render(self.state.clone()) {
                self.dirty = false;
                self.last_frame = Instant::now();
            }

            let poll_timeout = if self.state.sync.is_busy() || self.state.effects.is_active() {
                ACTIVE_POLL_MS
            } else {
                IDLE_POLL_MS
            };
            if event::poll(Duration::from_millis(poll_timeout))? {
                let evt = event::read()?;
                // Any input event (including resize) requires re-render
                self.dirty = true;
                match handle_input(evt, &self.state, &self.bindings) {
                    InputResult::Quit => break,
                    InputResult::Action(action) => {
                        self.state.acknowledge_error();
                        self.handle_action(action);
                    }
                    InputResult::Continue => {}
                }
            }
        }

        Ok(())
    }

    /// Apply everything the sync actor has sent. Returns true if anything arrived.
    pub(crate) fn process_sync_events(&mut self) -> bool {
        let mut had_events = false;
        while let Ok(event) = self.sync.event_rx.try_recv() {
            had_events = true;
            tracing::debug!("Sync event: {}", describe_event(&event));
            self.apply_sync_event(event);
        }
        had_events
    }

    pub(crate) fn apply_sync_event(&mut self, event: SyncEvent) {
        let applied = self.state.sync.apply(event);
        self.state.absorb_sync();

        if let Some(cards) = applied.loaded_cards {
            self.on_deck_replaced(cards, applied.announce);
        }
        if let Some(follow_up) = applied.follow_up {
            self.send(follow_up.into_command());
        }
    }

    /// `announce` is set when the fetch delivers a batch that just completed
    fn on_deck_replaced(&mut self, cards: usize, announce: bool) {
        tracing::info!(
            "Deck replaced: {} cards from {} emails",
            cards,
            self.state.sync.emails.len()
        );

        // The reader may point at an email that is gone now
        if matches!(self.state.view, View::Reader { .. }) && self.state.reader_email().is_none() {
            self.state.view = View::Deck;
        }
        self.state.effects.clear();

        if announce {
            self.announce_batch(cards);
        }
    }

    #[cfg(feature = "notifications")]
    fn announce_batch(&self, cards: usize) {
        crate::notification::notify_batch_complete(
            &self.config,
            cards,
            self.state.sync.emails.len(),
        );
    }

    #[cfg(not(feature = "notifications"))]
    fn announce_batch(&self, cards: usize) {
        tracing::debug!("Batch complete with {} cards", cards);
    }

    /// Step the particle simulation. Returns true while it is running.
    fn tick_effects(&mut self) -> bool {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick);
        self.last_tick = now;

        if !self.state.effects.is_active() {
            return false;
        }
        self.state.effects.tick(dt);
        true
    }
}

fn describe_event(event: &SyncEvent) -> String {
    match event {
        SyncEvent::RefreshStarted => "refresh started".to_string(),
        SyncEvent::Status(s) => format!("status {} ({} emails)", s.status, s.count),
        SyncEvent::Emails(emails) => format!("{} emails", emails.len()),
        SyncEvent::Failed { request, error } => {
            format!("{} failed: {}", request.describe(), error)
        }
    }
}
