//! Desktop notification when a processing batch lands

use crate::config::Config;

/// Notify that a batch finished with `cards` new cards from `emails` emails.
pub fn notify_batch_complete(config: &Config, cards: usize, emails: usize) {
    if !should_notify(config, cards) {
        return;
    }

    let summary = batch_summary(cards, emails);

    // Fire and forget, a missing notification daemon is not an error
    if let Err(e) = send_notification(&summary, Some("Open mailcards to review them")) {
        tracing::warn!("Failed to send desktop notification: {}", e);
    }
}

fn should_notify(config: &Config, cards: usize) -> bool {
    config.notifications.enabled && cards > 0
}

fn batch_summary(cards: usize, emails: usize) -> String {
    let card_word = if cards == 1 { "card" } else { "cards" };
    let email_word = if emails == 1 { "email" } else { "emails" };
    format!("{} new {} from {} {}", cards, card_word, emails, email_word)
}

/// Low-level notification sending
fn send_notification(summary: &str, body: Option<&str>) -> Result<(), notify_rust::error::Error> {
    use notify_rust::Notification;

    let mut notification = Notification::new();
    notification
        .summary(summary)
        .appname("mailcards")
        .timeout(notify_rust::Timeout::Milliseconds(5000));

    if let Some(body) = body {
        notification.body(body);
    }

    notification.icon("x-office-calendar");

    notification.show()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotificationConfig;

    fn config(enabled: bool) -> Config {
        Config {
            notifications: NotificationConfig { enabled },
            ..Default::default()
        }
    }

    #[test]
    fn test_disabled_config_suppresses_notification() {
        assert!(!should_notify(&config(false), 5));
    }

    #[test]
    fn test_empty_batch_is_not_announced() {
        assert!(!should_notify(&config(true), 0));
        assert!(should_notify(&config(true), 1));
    }

    #[test]
    fn test_summary_pluralization() {
        assert_eq!(batch_summary(1, 1), "1 new card from 1 email");
        assert_eq!(batch_summary(4, 2), "4 new cards from 2 emails");
    }
}
