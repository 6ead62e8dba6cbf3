use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const ENV_BACKEND_URL: &str = "MAILCARDS_BACKEND_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// Desktop notification settings
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Delay between status polls while a job is running
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Check the job status once at startup (fetches results if already completed)
    #[serde(default = "default_true")]
    pub poll_on_start: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_on_start: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Allow writing accepted items to the local calendar store
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Root of the store (default: <data dir>/mailcards/calendar)
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Duration used when an event has no end date
    #[serde(default = "default_event_minutes")]
    pub default_event_minutes: i64,
    /// Priority for new reminders (0 = none, 1 = high .. 9 = low)
    #[serde(default)]
    pub reminder_priority: u8,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
            default_event_minutes: default_event_minutes(),
            reminder_priority: 0,
        }
    }
}

impl CalendarConfig {
    pub fn store_dir(&self) -> Result<PathBuf> {
        match &self.directory {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Config::data_dir()?.join("calendar")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub keybinding_mode: KeybindingMode,
    #[serde(default)]
    pub theme: ThemeVariant,
    #[serde(default)]
    pub card_order: CardOrder,
    /// Particle bursts on accept/reject
    #[serde(default = "default_true")]
    pub effects: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            keybinding_mode: KeybindingMode::default(),
            theme: ThemeVariant::default(),
            card_order: CardOrder::default(),
            effects: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeybindingMode {
    #[default]
    Vim,
    Arrows,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Modern,
    Dark,
    #[serde(rename = "high-contrast")]
    HighContrast,
}

/// Order of the extracted items within one email's cards
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CardOrder {
    #[default]
    EventsFirst,
    TodosFirst,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Notify when a batch finishes with new cards
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_event_minutes() -> i64 {
    60
}

/// Upper bound for `calendar.default_event_minutes`, one week
pub const MAX_EVENT_MINUTES: i64 = 7 * 24 * 60;

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("mailcards");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dir = dirs::data_local_dir()
            .context("Could not find data directory")?
            .join("mailcards");
        Ok(dir)
    }

    /// Load the config file, falling back to defaults when it doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            tracing::info!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(url) = std::env::var(ENV_BACKEND_URL)
            && !url.trim().is_empty()
        {
            config.backend.base_url = url.trim().to_string();
        }

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.backend.poll_interval_ms == 0 {
            anyhow::bail!("backend.poll_interval_ms must be greater than zero");
        }
        let minutes = config.calendar.default_event_minutes;
        if !(1..=MAX_EVENT_MINUTES).contains(&minutes) {
            anyhow::bail!(
                "calendar.default_event_minutes must be between 1 and {}, got {}",
                MAX_EVENT_MINUTES,
                minutes
            );
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let dir = Self::config_dir()?;

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(Self::config_dir()?)?;
        fs::create_dir_all(Self::data_dir()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [backend]
            base_url = "https://cards.example.com"
            poll_interval_ms = 500
            poll_on_start = false

            [calendar]
            enabled = false
            directory = "/tmp/cards"
            default_event_minutes = 30
            reminder_priority = 1

            [ui]
            keybinding_mode = "arrows"
            theme = "high-contrast"
            card_order = "todos-first"
            effects = false

            [notifications]
            enabled = false
        "#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.backend.base_url, "https://cards.example.com");
        assert_eq!(config.backend.poll_interval_ms, 500);
        assert_eq!(config.backend.request_timeout_secs, 30);
        assert!(!config.backend.poll_on_start);
        assert!(!config.calendar.enabled);
        assert_eq!(
            config.calendar.store_dir().unwrap(),
            PathBuf::from("/tmp/cards")
        );
        assert_eq!(config.calendar.default_event_minutes, 30);
        assert_eq!(config.ui.keybinding_mode, KeybindingMode::Arrows);
        assert_eq!(config.ui.theme, ThemeVariant::HighContrast);
        assert_eq!(config.ui.card_order, CardOrder::TodosFirst);
        assert!(!config.ui.effects);
        assert!(!config.notifications.enabled);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.poll_interval_ms, 2000);
        assert!(config.backend.poll_on_start);
        assert!(config.calendar.enabled);
        assert_eq!(config.calendar.default_event_minutes, 60);
        assert_eq!(config.ui.card_order, CardOrder::EventsFirst);
        assert!(config.ui.effects);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let toml = r#"
            [backend]
            poll_interval_ms = 0
        "#;
        assert!(Config::parse(toml).is_err());
    }

    #[test]
    fn test_event_minutes_out_of_range_rejected() {
        for minutes in ["0", "-30", "9223372036854775807"] {
            let toml = format!("[calendar]\ndefault_event_minutes = {}\n", minutes);
            let err = Config::parse(&toml).unwrap_err();
            assert!(err.to_string().contains("default_event_minutes"), "{}", err);
        }
        let toml = format!("[calendar]\ndefault_event_minutes = {}\n", MAX_EVENT_MINUTES);
        assert!(Config::parse(&toml).is_ok());
    }

    #[test]
    fn test_default_config_roundtrips_through_toml() {
        let content = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed = Config::parse(&content).unwrap();
        assert_eq!(parsed.backend.base_url, Config::default().backend.base_url);
        assert_eq!(parsed.ui.theme, ThemeVariant::Modern);
    }
}
