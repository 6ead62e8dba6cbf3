//! Background render thread.
//!
//! The render thread owns the Terminal and draws snapshots of AppState sent
//! from the event loop, so a slow terminal never delays sync events,
//! particle ticks or key handling.

use std::io;
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use super::state::AppState;

pub enum RenderCommand {
    Frame(Box<AppState>),
    Shutdown,
}

pub struct RenderThread {
    cmd_tx: SyncSender<RenderCommand>,
    handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    /// Spawn the render thread. Terminal setup and teardown happen on it.
    pub fn spawn() -> io::Result<Self> {
        // Capacity 1: only the newest frame matters
        let (cmd_tx, cmd_rx) = mpsc::sync_channel::<RenderCommand>(1);

        let handle = thread::Builder::new()
            .name("render".to_string())
            .spawn(move || {
                if let Err(e) = enable_raw_mode() {
                    tracing::error!("Failed to enable raw mode: {}", e);
                    return;
                }

                let mut stdout = io::stdout();
                if let Err(e) = execute!(stdout, EnterAlternateScreen) {
                    tracing::error!("Failed to enter alternate screen: {}", e);
                    disable_raw_mode().ok();
                    return;
                }

                let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
                    Ok(t) => t,
                    Err(e) => {
                        tracing::error!("Failed to create terminal: {}", e);
                        disable_raw_mode().ok();
                        execute!(io::stdout(), LeaveAlternateScreen).ok();
                        return;
                    }
                };

                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        RenderCommand::Frame(state) => {
                            if let Err(e) = terminal.draw(|f| crate::ui::render(f, &state)) {
                                tracing::error!("Render error: {}", e);
                            }
                        }
                        RenderCommand::Shutdown => break,
                    }
                }

                disable_raw_mode().ok();
                execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
                terminal.show_cursor().ok();
            })?;

        Ok(Self {
            cmd_tx,
            handle: Some(handle),
        })
    }

    /// Queue a frame without blocking. Returns false when the previous
    /// frame is still being drawn and this one was dropped.
    pub fn render(&self, state: AppState) -> bool {
        match self.cmd_tx.try_send(RenderCommand::Frame(Box::new(state))) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::trace!("Render thread busy, skipping frame");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("Render thread disconnected");
                true
            }
        }
    }

    /// Stop the thread and wait for the terminal to be restored.
    pub fn shutdown(mut self) {
        let _ = self.cmd_tx.send(RenderCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}
