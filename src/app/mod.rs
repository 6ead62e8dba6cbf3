//! Application core - owns state and coordinates the sync actor, the
//! calendar store and the render thread

pub mod accept;
mod actions;
pub mod deck;
mod event_loop;
pub mod render_thread;
pub mod state;
pub mod sync;

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use render_thread::RenderThread;

use crate::backend::{
    HttpTransport, SyncActorHandle, SyncCommand, SyncEvent, Transport, spawn_sync_actor,
};
use crate::calendar::{CalendarService, IcsStore};
use crate::config::Config;
use crate::input::KeyBindings;
use state::AppState;
use sync::SyncModel;

pub struct App {
    pub(crate) config: Config,
    pub(crate) state: AppState,
    pub(crate) bindings: KeyBindings,
    pub(crate) calendar: CalendarService<IcsStore>,
    pub(crate) sync: SyncActorHandle,
    /// Last particle tick, for computing the step
    pub(crate) last_tick: Instant,
    /// Last frame sent, so the spinner keeps turning while busy
    pub(crate) last_frame: Instant,
    /// Dirty flag: when true, UI needs re-render. Skips renders when nothing changed.
    pub(crate) dirty: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(
            &config.backend.base_url,
            Duration::from_secs(config.backend.request_timeout_secs),
        )
        .context("Failed to create HTTP client")?;
        Self::with_transport(config, transport)
    }

    pub(crate) fn with_transport<T: Transport>(config: Config, transport: T) -> Result<Self> {
        let sync = spawn_sync_actor(transport);

        let store_dir = config.calendar.store_dir()?;
        tracing::info!("Calendar store at {}", store_dir.display());
        let calendar = CalendarService::new(IcsStore::new(store_dir, config.calendar.enabled));

        let bindings = KeyBindings::new(&config.ui.keybinding_mode);

        let state = AppState {
            sync: SyncModel::new(config.ui.card_order),
            backend: config.backend.base_url.clone(),
            hints: bindings.hints(),
            reader_hints: bindings.reader_hints(),
            ..Default::default()
        };

        let now = Instant::now();
        Ok(Self {
            config,
            state,
            bindings,
            calendar,
            sync,
            last_tick: now,
            last_frame: now,
            dirty: true,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Spawn background render thread (owns terminal setup/teardown)
        let render_thread = RenderThread::spawn()?;

        self.state
            .set_status(format!("Backend: {}", self.config.backend.base_url));
        if self.config.backend.poll_on_start {
            self.send(SyncCommand::PollStatus);
        }

        let result = self.event_loop(&render_thread).await;

        render_thread.shutdown();
        self.sync.cmd_tx.send(SyncCommand::Shutdown).await.ok();

        result
    }

    /// Hand a command to the sync actor unless the same request is
    /// already in flight.
    pub(crate) fn send(&mut self, cmd: SyncCommand) {
        let request = cmd.request();
        if !self.state.sync.begin(&cmd) {
            return;
        }
        self.state.absorb_sync();

        if let Err(e) = self.sync.cmd_tx.try_send(cmd)
            && let Some(request) = request
        {
            tracing::error!("Sync actor unavailable: {}", e);
            self.apply_sync_event(SyncEvent::Failed {
                request,
                error: "sync worker is not running".to_string(),
            });
        }
        self.dirty = true;
    }
}
