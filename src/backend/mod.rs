//! Client side of the email processing backend
//!
//! The backend fetches a mailbox, extracts todos and events, and exposes
//! the job state and results over three JSON endpoints:
//! - `POST /refresh-emails` starts a job
//! - `GET /refresh-status` reports its progress
//! - `GET /processed-emails` returns the results

mod actor;
mod client;
mod error;
pub mod types;

pub use actor::{Request, SyncActorHandle, SyncCommand, SyncEvent, spawn_sync_actor};
pub use client::{
    HttpTransport, PROCESSED_PATH, REFRESH_PATH, STATUS_PATH, Transport, decode_emails,
    decode_status,
};
pub use error::SyncError;
pub use types::{BatchStatus, Email, Event, RefreshStatus, Todo};

#[cfg(test)]
pub(crate) use actor::testing;
