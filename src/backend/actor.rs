//! Sync actor: runs backend requests off the UI loop

use tokio::sync::mpsc;

use super::client::{
    PROCESSED_PATH, REFRESH_PATH, STATUS_PATH, Transport, decode_emails, decode_status,
};
use super::types::{Email, RefreshStatus};

/// Which backend request an event or failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    Refresh,
    Status,
    Processed,
}

impl Request {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Refresh => "Refresh",
            Self::Status => "Status check",
            Self::Processed => "Loading results",
        }
    }
}

/// Commands that can be sent to the sync actor
#[derive(Debug)]
pub enum SyncCommand {
    /// `POST /refresh-emails`
    TriggerRefresh,
    /// `GET /refresh-status`
    PollStatus,
    /// `GET /processed-emails`
    FetchProcessed,
    Shutdown,
}

impl SyncCommand {
    pub fn request(&self) -> Option<Request> {
        match self {
            Self::TriggerRefresh => Some(Request::Refresh),
            Self::PollStatus => Some(Request::Status),
            Self::FetchProcessed => Some(Request::Processed),
            Self::Shutdown => None,
        }
    }
}

/// Events emitted by the sync actor
#[derive(Debug, Clone)]
pub enum SyncEvent {
    RefreshStarted,
    Status(RefreshStatus),
    Emails(Vec<Email>),
    Failed { request: Request, error: String },
}

/// Handle for communicating with the sync actor
pub struct SyncActorHandle {
    pub cmd_tx: mpsc::Sender<SyncCommand>,
    pub event_rx: mpsc::Receiver<SyncEvent>,
}

/// Spawn the sync actor task
pub fn spawn_sync_actor<T: Transport>(transport: T) -> SyncActorHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::channel(32);

    tokio::spawn(sync_actor_loop(transport, cmd_rx, event_tx));

    SyncActorHandle { cmd_tx, event_rx }
}

async fn sync_actor_loop<T: Transport>(
    transport: T,
    mut cmd_rx: mpsc::Receiver<SyncCommand>,
    event_tx: mpsc::Sender<SyncEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let event = match cmd {
            SyncCommand::TriggerRefresh => match transport.post(REFRESH_PATH).await {
                Ok(_) => SyncEvent::RefreshStarted,
                Err(e) => failed(Request::Refresh, e),
            },
            SyncCommand::PollStatus => {
                match transport
                    .get(STATUS_PATH)
                    .await
                    .and_then(|body| decode_status(&body))
                {
                    Ok(status) => SyncEvent::Status(status),
                    Err(e) => failed(Request::Status, e),
                }
            }
            SyncCommand::FetchProcessed => {
                match transport
                    .get(PROCESSED_PATH)
                    .await
                    .and_then(|body| decode_emails(&body))
                {
                    Ok(emails) => {
                        tracing::info!("Fetched {} processed emails", emails.len());
                        SyncEvent::Emails(emails)
                    }
                    Err(e) => failed(Request::Processed, e),
                }
            }
            SyncCommand::Shutdown => break,
        };

        if event_tx.send(event).await.is_err() {
            tracing::warn!("Sync actor: event receiver dropped");
            break;
        }
    }
}

fn failed(request: Request, error: super::SyncError) -> SyncEvent {
    if error.is_decode() {
        tracing::error!("{} returned a malformed body: {}", request.describe(), error);
    } else {
        tracing::warn!("{} failed: {}", request.describe(), error);
    }
    SyncEvent::Failed {
        request,
        error: error.to_string(),
    }
}
