//! notion-relay CLI
//!
//! Polls a Notion database and relays task changes to Telegram.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use notion_relay::{
    config,
    error::Result,
    pipeline::{PollLoop, PollSettings, Relay, SnapshotStore},
};
use tokio_util::sync::CancellationToken;

/// notion-relay - Notion to Telegram task notifier
#[derive(Parser, Debug)]
#[command(
    name = "notion-relay",
    version,
    about = "Relays Notion task changes to a Telegram chat"
)]

struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "relay.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll until interrupted (Ctrl+C)
    Run,

    /// Run a single cycle and exit; every task is announced as new
    Once,

    /// Fetch once and print the messages without sending them
    Preview,

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Missing credentials end the process here with a non-zero exit
    let config = match config::load_validated(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Run => {
            let relay = Relay::from_config(&config)?;
            let cancel = CancellationToken::new();

            let cancel_on_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Received Ctrl+C, finishing current cycle...");
                    cancel_on_signal.cancel();
                }
            });

            log::info!("notion-relay starting...");
            PollLoop::new(relay, PollSettings::from_config(&config), cancel)
                .run()
                .await;
        }

        Command::Once => {
            let relay = Relay::from_config(&config)?;
            let mut store = SnapshotStore::new();
            let report = relay.run_cycle(&mut store).await?;
            log::info!("Cycle complete: {}", report.summary());
        }

        Command::Preview => {
            let relay = Relay::from_config(&config)?;
            let mut store = SnapshotStore::new();
            let messages = relay.preview(&mut store).await?;

            log::info!("{} message(s) would be sent", messages.len());
            for message in messages {
                println!("{message}\n");
            }
        }

        Command::Validate => {
            for (key, value) in config::describe(&config) {
                log::info!("{}: {}", key, value);
            }
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}
