//! Turning accepted cards into calendar items

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::backend::{Event, Todo};
use crate::calendar::{NewEvent, NewReminder, When};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Interpret a date string from the backend.
///
/// Zone-less timestamps are taken as local time. A bare date is an
/// all-day value.
pub fn parse_when(raw: &str) -> Option<When> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(When::DateTime(dt.with_timezone(&Utc)));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return local_to_utc(naive).map(When::DateTime);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(When::Date(date));
        }
    }

    tracing::debug!("Unrecognized date string: {:?}", raw);
    None
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `start` plus `minutes`, or one hour when that is not a later instant
fn end_after(start: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    Duration::try_minutes(minutes)
        .filter(|d| *d > Duration::zero())
        .and_then(|d| start.checked_add_signed(d))
        .unwrap_or(start + Duration::hours(1))
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Build the calendar entry for an accepted event card.
///
/// Missing start means `now`; missing or unreadable end means start plus
/// `default_minutes` (or the next day for all-day events).
pub fn event_to_new_event(
    event: &Event,
    email_subject: &str,
    default_minutes: i64,
    now: DateTime<Utc>,
) -> NewEvent {
    let start = event
        .start_date
        .as_deref()
        .and_then(parse_when)
        .unwrap_or(When::DateTime(now));
    let all_day = matches!(start, When::Date(_));

    let end = match (start, event.end_date.as_deref().and_then(parse_when)) {
        (When::Date(s), Some(When::Date(e))) if e > s => When::Date(e),
        (When::Date(s), _) => When::Date(s.succ_opt().unwrap_or(s)),
        (When::DateTime(s), Some(When::DateTime(e))) if e > s => When::DateTime(e),
        (When::DateTime(s), _) => When::DateTime(end_after(s, default_minutes)),
    };

    let mut notes = non_empty(&event.content);
    if let Some(subject) = non_empty(email_subject) {
        let from = format!("From email: {}", subject);
        notes = Some(match notes {
            Some(n) => format!("{}\n\n{}", n, from),
            None => from,
        });
    }

    NewEvent {
        title: event.title.clone(),
        start,
        end,
        location: event.location.as_deref().and_then(non_empty),
        notes,
        all_day,
    }
}

/// Build the reminder for an accepted todo card.
pub fn todo_to_new_reminder(todo: &Todo, email_subject: &str, priority: u8) -> NewReminder {
    NewReminder {
        title: todo.content.clone(),
        notes: non_empty(email_subject).map(|s| format!("From email: {}", s)),
        due: todo.completion_deadline.as_deref().and_then(parse_when),
        priority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(start: Option<&str>, end: Option<&str>) -> Event {
        Event {
            title: "Review".to_string(),
            content: "Quarterly numbers".to_string(),
            location: Some("  ".to_string()),
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(
            parse_when("2025-01-11T10:00:00+02:00"),
            Some(When::DateTime(Utc.with_ymd_and_hms(2025, 1, 11, 8, 0, 0).unwrap()))
        );
    }

    #[test]
    fn test_parse_bare_date_is_all_day() {
        assert_eq!(
            parse_when("2025-01-12"),
            Some(When::Date(NaiveDate::from_ymd_opt(2025, 1, 12).unwrap()))
        );
        assert_eq!(
            parse_when("12.01.2025"),
            Some(When::Date(NaiveDate::from_ymd_opt(2025, 1, 12).unwrap()))
        );
    }

    #[test]
    fn test_parse_local_datetime() {
        assert!(matches!(
            parse_when("2025-01-11 10:00"),
            Some(When::DateTime(_))
        ));
        assert!(matches!(
            parse_when("2025-01-11T10:00:30"),
            Some(When::DateTime(_))
        ));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_when(""), None);
        assert_eq!(parse_when("next tuesday"), None);
    }

    #[test]
    fn test_missing_dates_default_to_now_plus_duration() {
        let new = event_to_new_event(&event(None, None), "Budget", 45, now());
        assert_eq!(new.start, When::DateTime(now()));
        assert_eq!(new.end, When::DateTime(now() + Duration::minutes(45)));
        assert!(!new.all_day);
        assert_eq!(new.location, None);
        assert_eq!(
            new.notes.as_deref(),
            Some("Quarterly numbers\n\nFrom email: Budget")
        );
    }

    #[test]
    fn test_end_before_start_is_replaced() {
        let new = event_to_new_event(
            &event(Some("2025-01-11T10:00:00Z"), Some("2025-01-11T09:00:00Z")),
            "",
            60,
            now(),
        );
        assert_eq!(
            new.end,
            When::DateTime(Utc.with_ymd_and_hms(2025, 1, 11, 11, 0, 0).unwrap())
        );
        assert_eq!(new.notes.as_deref(), Some("Quarterly numbers"));
    }

    #[test]
    fn test_unusable_default_duration_still_ends_after_start() {
        for minutes in [0, -120, i64::MAX] {
            let new = event_to_new_event(&event(None, None), "", minutes, now());
            assert_eq!(new.end, When::DateTime(now() + Duration::hours(1)));
        }
    }

    #[test]
    fn test_all_day_event_spans_one_day() {
        let new = event_to_new_event(&event(Some("2025-03-01"), None), "", 60, now());
        assert!(new.all_day);
        assert_eq!(
            new.end,
            When::Date(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap())
        );
    }

    #[test]
    fn test_todo_to_reminder() {
        let todo = Todo {
            content: "Send agenda".to_string(),
            completed: false,
            completion_deadline: Some("2025-01-12".to_string()),
        };
        let reminder = todo_to_new_reminder(&todo, "Planning", 5);
        assert_eq!(reminder.title, "Send agenda");
        assert_eq!(reminder.notes.as_deref(), Some("From email: Planning"));
        assert_eq!(
            reminder.due,
            Some(When::Date(NaiveDate::from_ymd_opt(2025, 1, 12).unwrap()))
        );
        assert_eq!(reminder.priority, 5);
    }
}
