//! media-notify - send a media server event to the configured Discord webhooks.
//!
//! Reads one event payload (a JSON object of named fields) and either sends
//! it to every configured destination or prints the Discord message that
//! would be sent.
//!
//! # Examples
//!
//! ```bash
//! # Destinations from DISCORD_* environment variables
//! DISCORD_WEBHOOK_URL=https://discord.com/api/webhooks/1/token \
//!     media-notify send --payload event.json
//!
//! # Destinations from a TOML file, payload from stdin
//! echo '{"NotificationType":"PendingRestart"}' | media-notify --config notify.toml send
//!
//! # Show the message body without sending it
//! media-notify render --payload event.json
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use media_notify::{
    prepare, render, AllowAll, ConfigGate, DiscordClient, EventPayload, Notifier, NotifyConfig,
    Preparation,
};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Send media server events to Discord webhooks.
#[derive(Parser)]
#[command(name = "media-notify")]
#[command(about = "Send media server events to Discord webhooks")]
#[command(version)]
struct Cli {
    /// TOML file with `[[destinations]]` tables (default: `DISCORD_*` env vars)
    #[arg(long, env = "MEDIA_NOTIFY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send the event to every destination and wait for the results
    Send {
        /// JSON payload file, `-` for stdin
        #[arg(long, short, default_value = "-")]
        payload: String,
    },

    /// Print the Discord message for the first destination without sending
    Render {
        /// JSON payload file, `-` for stdin
        #[arg(long, short, default_value = "-")]
        payload: String,

        /// Render even if the destination's filters would skip the event
        #[arg(long)]
        ignore_filters: bool,
    },
}

fn read_payload(source: &str) -> Result<EventPayload> {
    let raw = if source == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read payload from stdin")?;
        raw
    } else {
        std::fs::read_to_string(Path::new(source))
            .with_context(|| format!("Failed to read payload from {source}"))?
    };

    serde_json::from_str(&raw).context("Payload is not a JSON object of fields")
}

fn load_config(path: Option<&Path>) -> Result<NotifyConfig> {
    match path {
        Some(path) => NotifyConfig::load(path),
        None => NotifyConfig::from_env(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Send { payload } => {
            let payload = read_payload(&payload)?;
            let notifier = Notifier::new(DiscordClient::new(), config);
            if !notifier.has_destinations() {
                bail!("No destinations configured");
            }

            let mut failed = 0_usize;
            for (destination, result) in notifier.notify_and_wait(&payload).await {
                match result {
                    Ok(()) => tracing::info!(destination = %destination, "Dispatched"),
                    Err(e) => {
                        failed += 1;
                        tracing::error!(destination = %destination, error = %e, "Dispatch failed");
                    }
                }
            }

            if failed > 0 {
                bail!("{failed} destination(s) failed");
            }
        }

        Commands::Render {
            payload,
            ignore_filters,
        } => {
            let mut payload = read_payload(&payload)?;
            let destination = config
                .destinations
                .first()
                .context("No destinations configured")?;

            let preparation = if ignore_filters {
                prepare(destination, &mut payload, &AllowAll)?
            } else {
                prepare(destination, &mut payload, &ConfigGate)?
            };
            if preparation == Preparation::Skip {
                tracing::info!(
                    destination = %destination.webhook_name,
                    "Event filtered out for this destination"
                );
                return Ok(());
            }

            let message = render(destination, &payload)?;
            println!("{}", serde_json::to_string_pretty(&message)?);
        }
    }

    Ok(())
}
