mod app;
mod backend;
mod calendar;
mod config;
mod constants;
mod effects;
mod input;
#[cfg(feature = "notifications")]
mod notification;
mod ui;

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::app::deck::{CardKind, flatten};
use crate::backend::{
    HttpTransport, PROCESSED_PATH, REFRESH_PATH, STATUS_PATH, Transport, decode_emails,
    decode_status,
};
use crate::config::Config;

fn setup_logging() {
    use std::fs::OpenOptions;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mailcards=debug"));

    // The TUI owns the terminal, so log to a file in the config directory
    let log_file = Config::config_dir()
        .ok()
        .and_then(|dir| std::fs::create_dir_all(&dir).ok().map(|_| dir))
        .map(|dir| dir.join("mailcards.log"))
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        // Fallback to stderr if file logging fails
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_usage() {
    eprintln!(
        r#"mailcards - Swipe through todos and events extracted from your email

Usage: mailcards [command]

Commands:
    (none)      Start the card deck
    refresh     Ask the backend to process new email
    status      Print the backend's processing status
    cards       Print the current deck
    init        Write a default config file
    help        Show this help message

Configuration file: ~/.config/mailcards/config.toml
Backend URL override: MAILCARDS_BACKEND_URL
"#
    );
}

fn transport(config: &Config) -> Result<HttpTransport> {
    HttpTransport::new(
        &config.backend.base_url,
        Duration::from_secs(config.backend.request_timeout_secs),
    )
    .context("Failed to create HTTP client")
}

async fn run_refresh(config: &Config) -> Result<()> {
    transport(config)?
        .post(REFRESH_PATH)
        .await
        .context("Refresh request failed")?;
    println!("Refresh started on {}", config.backend.base_url);
    Ok(())
}

async fn run_status(config: &Config) -> Result<()> {
    let body = transport(config)?
        .get(STATUS_PATH)
        .await
        .context("Status request failed")?;
    let status = decode_status(&body)?;

    println!("Status:   {}", status.status);
    println!("Emails:   {}", status.count);
    if !status.message.is_empty() {
        println!("Message:  {}", status.message);
    }
    if let Some(updated) = status.last_updated {
        println!("Updated:  {}", updated);
    }
    Ok(())
}

async fn run_cards(config: &Config) -> Result<()> {
    let body = transport(config)?
        .get(PROCESSED_PATH)
        .await
        .context("Fetching processed emails failed")?;
    let emails = decode_emails(&body)?;
    let cards = flatten(&emails, config.ui.card_order);

    if cards.is_empty() {
        println!("{}", crate::app::sync::EMPTY_RESULT_MESSAGE);
        return Ok(());
    }

    for (i, card) in cards.iter().enumerate() {
        let detail = match &card.kind {
            CardKind::Todo(todo) => match &todo.completion_deadline {
                Some(due) => format!("{} (due {})", todo.content, due),
                None => todo.content.clone(),
            },
            CardKind::Event(event) => match &event.start_date {
                Some(start) => format!("{} ({})", event.title, start),
                None => event.title.clone(),
            },
            CardKind::Original => card.subject.clone(),
        };
        println!("{:>3}. {:<5} {}", i + 1, card.label(), detail);
    }
    println!("\n{} cards from {} emails", cards.len(), emails.len());
    Ok(())
}

fn run_init() -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    Config::default().save()?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some("init") => run_init(),
        Some(cmd @ ("refresh" | "status" | "cards")) => {
            let config = Config::load()?;
            match cmd {
                "refresh" => run_refresh(&config).await,
                "status" => run_status(&config).await,
                _ => run_cards(&config).await,
            }
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
        None => {
            setup_logging();

            let config = Config::load()?;
            config.ensure_dirs()?;

            crate::ui::theme::init_theme(config.ui.theme);

            let mut app = App::new(config)?;
            app.run().await
        }
    }
}
