//! Local store writing one iCalendar file per item
//!
//! Layout: `<root>/events/<uid>.ics` holds a `VEVENT`,
//! `<root>/reminders/<uid>.ics` holds a `VTODO`. Any CalDAV sync tool
//! pointed at these directories picks the items up.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;

use super::{AccessKind, CalendarError, CalendarStore, NewEvent, NewReminder, When};

const PRODID: &str = "-//mailcards//mailcards//EN";

/// Content lines longer than this many octets are folded
const MAX_LINE_OCTETS: usize = 75;

pub struct IcsStore {
    root: PathBuf,
    enabled: bool,
    granted: HashSet<AccessKind>,
}

impl IcsStore {
    pub fn new(root: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            root: root.into(),
            enabled,
            granted: HashSet::new(),
        }
    }

    fn dir(&self, kind: AccessKind) -> PathBuf {
        match kind {
            AccessKind::Events => self.root.join("events"),
            AccessKind::Reminders => self.root.join("reminders"),
        }
    }

    fn write_item(&self, kind: AccessKind, body: &[String]) -> Result<String, CalendarError> {
        if !self.granted.contains(&kind) {
            return Err(CalendarError::PermissionDenied(kind));
        }

        let uid = new_uid();
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{}", PRODID),
        ];
        lines.extend(body.iter().cloned());
        lines.push("END:VCALENDAR".to_string());

        // Insert UID and DTSTAMP right after the component's BEGIN line
        let begin = lines
            .iter()
            .position(|l| l == "BEGIN:VEVENT" || l == "BEGIN:VTODO")
            .map(|i| i + 1)
            .unwrap_or(lines.len());
        lines.insert(begin, format!("UID:{}", uid));
        lines.insert(begin + 1, format!("DTSTAMP:{}", Utc::now().format("%Y%m%dT%H%M%SZ")));

        let content: String = lines.iter().map(|l| fold_line(l) + "\r\n").collect();
        let path = self.dir(kind).join(format!("{}.ics", uid));
        write_file(&path, &content, kind)?;

        tracing::info!("Wrote {} item {}", kind, path.display());
        Ok(uid)
    }
}

impl CalendarStore for IcsStore {
    fn request_access(&mut self, kind: AccessKind) -> Result<bool, CalendarError> {
        if !self.enabled {
            tracing::info!("Calendar store disabled in config, {} access refused", kind);
            return Ok(false);
        }

        let dir = self.dir(kind);
        fs::create_dir_all(&dir).map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => CalendarError::PermissionDenied(kind),
            _ => CalendarError::Io(e),
        })?;

        self.granted.insert(kind);
        Ok(true)
    }

    fn has_access(&self, kind: AccessKind) -> bool {
        self.granted.contains(&kind)
    }

    fn add_event(&mut self, event: &NewEvent) -> Result<String, CalendarError> {
        let mut body = vec![
            "BEGIN:VEVENT".to_string(),
            format!("SUMMARY:{}", escape_text(&event.title)),
            format_when("DTSTART", event.start, event.all_day),
            format_when("DTEND", event.end, event.all_day),
        ];
        if let Some(ref location) = event.location {
            body.push(format!("LOCATION:{}", escape_text(location)));
        }
        if let Some(ref notes) = event.notes {
            body.push(format!("DESCRIPTION:{}", escape_text(notes)));
        }
        body.push("END:VEVENT".to_string());

        self.write_item(AccessKind::Events, &body)
    }

    fn add_reminder(&mut self, reminder: &NewReminder) -> Result<String, CalendarError> {
        let mut body = vec![
            "BEGIN:VTODO".to_string(),
            format!("SUMMARY:{}", escape_text(&reminder.title)),
            "STATUS:NEEDS-ACTION".to_string(),
        ];
        if let Some(ref notes) = reminder.notes {
            body.push(format!("DESCRIPTION:{}", escape_text(notes)));
        }
        if let Some(due) = reminder.due {
            body.push(format_when("DUE", due, matches!(due, When::Date(_))));
        }
        if reminder.priority > 0 {
            body.push(format!("PRIORITY:{}", reminder.priority.min(9)));
        }
        body.push("END:VTODO".to_string());

        self.write_item(AccessKind::Reminders, &body)
    }
}

fn write_file(path: &Path, content: &str, kind: AccessKind) -> Result<(), CalendarError> {
    fs::write(path, content).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => CalendarError::PermissionDenied(kind),
        _ => CalendarError::Io(e),
    })
}

fn new_uid() -> String {
    let suffix: u64 = rand::rng().random();
    format!(
        "{}-{:016x}@mailcards",
        Utc::now().format("%Y%m%dT%H%M%S"),
        suffix
    )
}

fn format_when(name: &str, when: When, all_day: bool) -> String {
    match when {
        When::Date(date) => format!("{};VALUE=DATE:{}", name, date.format("%Y%m%d")),
        When::DateTime(dt) if all_day => {
            format!("{};VALUE=DATE:{}", name, dt.date_naive().format("%Y%m%d"))
        }
        When::DateTime(dt) => format!("{}:{}", name, dt.format("%Y%m%dT%H%M%SZ")),
    }
}

/// RFC 5545 TEXT escaping
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Fold a content line at 75 octets without splitting a UTF-8 sequence.
fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            // The leading space of a continuation line counts toward the limit
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn event() -> NewEvent {
        NewEvent {
            title: "Kickoff; team, all".to_string(),
            start: When::DateTime(Utc.with_ymd_and_hms(2025, 1, 11, 10, 0, 0).unwrap()),
            end: When::DateTime(Utc.with_ymd_and_hms(2025, 1, 11, 11, 0, 0).unwrap()),
            location: Some("HQ".to_string()),
            notes: Some("line one\nline two".to_string()),
            all_day: false,
        }
    }

    fn read_single(dir: &Path) -> String {
        let entries: Vec<_> = fs::read_dir(dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap()
    }

    #[test]
    fn test_write_requires_access() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = IcsStore::new(tmp.path(), true);
        let err = store.add_event(&event()).unwrap_err();
        assert!(matches!(err, CalendarError::PermissionDenied(AccessKind::Events)));
    }

    #[test]
    fn test_disabled_store_refuses_access() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = IcsStore::new(tmp.path(), false);
        assert!(!store.request_access(AccessKind::Events).unwrap());
        assert!(!store.has_access(AccessKind::Events));
        assert!(!tmp.path().join("events").exists());
    }

    #[test]
    fn test_event_written_as_vevent() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = IcsStore::new(tmp.path(), true);
        assert!(store.request_access(AccessKind::Events).unwrap());

        let uid = store.add_event(&event()).unwrap();
        let ics = read_single(&tmp.path().join("events"));

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.contains(&format!("UID:{}\r\n", uid)));
        assert!(ics.contains("SUMMARY:Kickoff\\; team\\, all\r\n"));
        assert!(ics.contains("DTSTART:20250111T100000Z\r\n"));
        assert!(ics.contains("DTEND:20250111T110000Z\r\n"));
        assert!(ics.contains("LOCATION:HQ\r\n"));
        assert!(ics.contains("DESCRIPTION:line one\\nline two\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }

    #[test]
    fn test_all_day_event_uses_date_values() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = IcsStore::new(tmp.path(), true);
        store.request_access(AccessKind::Events).unwrap();

        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut all_day = event();
        all_day.start = When::Date(day);
        all_day.end = When::Date(day.succ_opt().unwrap());
        all_day.all_day = true;
        store.add_event(&all_day).unwrap();

        let ics = read_single(&tmp.path().join("events"));
        assert!(ics.contains("DTSTART;VALUE=DATE:20250301\r\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20250302\r\n"));
    }

    #[test]
    fn test_reminder_written_as_vtodo() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = IcsStore::new(tmp.path(), true);
        store.request_access(AccessKind::Reminders).unwrap();

        store
            .add_reminder(&NewReminder {
                title: "Send agenda".to_string(),
                notes: None,
                due: Some(When::Date(NaiveDate::from_ymd_opt(2025, 1, 12).unwrap())),
                priority: 12,
            })
            .unwrap();

        let ics = read_single(&tmp.path().join("reminders"));
        assert!(ics.contains("BEGIN:VTODO\r\n"));
        assert!(ics.contains("STATUS:NEEDS-ACTION\r\n"));
        assert!(ics.contains("DUE;VALUE=DATE:20250112\r\n"));
        assert!(ics.contains("PRIORITY:9\r\n"));
        assert!(!ics.contains("DESCRIPTION"));
    }

    #[test]
    fn test_access_is_per_kind() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = IcsStore::new(tmp.path(), true);
        store.request_access(AccessKind::Events).unwrap();
        assert!(store.has_access(AccessKind::Events));
        assert!(!store.has_access(AccessKind::Reminders));
    }

    #[test]
    fn test_fold_long_lines() {
        let line = format!("DESCRIPTION:{}", "é".repeat(60));
        let folded = fold_line(&line);
        for part in folded.split("\r\n") {
            assert!(part.len() <= MAX_LINE_OCTETS);
        }
        assert_eq!(folded.replace("\r\n ", ""), line);
        assert_eq!(fold_line("SUMMARY:short"), "SUMMARY:short");
    }
}
