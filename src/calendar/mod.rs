//! Calendar and reminder capability
//!
//! Accepted events and todos are written through a [`CalendarStore`], a
//! permission-gated store. [`CalendarService`] is the facade the app talks
//! to: it forwards each call once and publishes the outcome as text.

mod ics;
mod service;

pub use ics::IcsStore;
pub use service::CalendarService;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Events,
    Reminders,
}

impl std::fmt::Display for AccessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Events => f.write_str("calendar"),
            Self::Reminders => f.write_str("reminders"),
        }
    }
}

/// Start or end of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub start: When,
    pub end: When,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub all_day: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    pub title: String,
    pub notes: Option<String>,
    pub due: Option<When>,
    /// 0 = undefined, 1 = highest, 9 = lowest
    pub priority: u8,
}

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Access to {0} was denied")]
    PermissionDenied(AccessKind),

    #[error("Calendar store error: {0}")]
    Io(#[from] std::io::Error),
}

/// A permission-gated calendar/reminders store
pub trait CalendarStore {
    /// Ask for access. `Ok(false)` means the user (or config) said no.
    fn request_access(&mut self, kind: AccessKind) -> Result<bool, CalendarError>;

    fn has_access(&self, kind: AccessKind) -> bool;

    /// Returns the identifier of the created event
    fn add_event(&mut self, event: &NewEvent) -> Result<String, CalendarError>;

    /// Returns the identifier of the created reminder
    fn add_reminder(&mut self, reminder: &NewReminder) -> Result<String, CalendarError>;
}
