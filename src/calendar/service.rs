use super::{AccessKind, CalendarStore, NewEvent, NewReminder};

/// Facade over a [`CalendarStore`].
///
/// Each call is forwarded once. Success publishes a confirmation in
/// `last_message`, failure publishes the store's error text in `last_error`.
pub struct CalendarService<S> {
    store: S,
    pub last_message: Option<String>,
    pub last_error: Option<String>,
}

impl<S: CalendarStore> CalendarService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            last_message: None,
            last_error: None,
        }
    }

    pub fn has_access(&self, kind: AccessKind) -> bool {
        self.store.has_access(kind)
    }

    pub fn request_access(&mut self, kind: AccessKind) -> bool {
        match self.store.request_access(kind) {
            Ok(true) => {
                self.publish(format!("Access to {} granted", kind));
                true
            }
            Ok(false) => {
                self.publish(format!("Access to {} not granted", kind));
                false
            }
            Err(e) => {
                self.fail(e);
                false
            }
        }
    }

    /// Returns the new event's identifier on success
    pub fn add_event(&mut self, event: &NewEvent) -> Option<String> {
        match self.store.add_event(event) {
            Ok(id) => {
                self.publish(format!("Added \"{}\" to calendar", event.title));
                Some(id)
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    /// Returns the new reminder's identifier on success
    pub fn add_reminder(&mut self, reminder: &NewReminder) -> Option<String> {
        match self.store.add_reminder(reminder) {
            Ok(id) => {
                self.publish(format!("Added \"{}\" to reminders", reminder.title));
                Some(id)
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    fn publish(&mut self, message: String) {
        self.last_message = Some(message);
        self.last_error = None;
    }

    fn fail(&mut self, error: impl std::fmt::Display) {
        tracing::warn!("Calendar operation failed: {}", error);
        self.last_error = Some(error.to_string());
        self.last_message = None;
    }
}
