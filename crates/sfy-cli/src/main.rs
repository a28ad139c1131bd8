use std::io;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use sfy_core::HubClient;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod format;
mod map;
mod style;
mod util;

use cli::{AxlCommand, Cli, Commands, TrackCommand};
use commands::{AxlTsArgs, TrackMapArgs};
use config::{Config, Settings};
use format::FormatOptions;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "sfy", &mut io::stdout());
        return Ok(());
    }

    let config = Config::load();
    let settings = Settings::resolve(&cli, &config);

    // Logs go to stderr so stdout stays clean for CSV, SVG and JSON
    let filter = EnvFilter::try_new(&settings.log).unwrap_or_else(|e| {
        eprintln!("Warning: Invalid log filter '{}': {}", settings.log, e);
        EnvFilter::new(config::DEFAULT_LOG)
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let opts = FormatOptions::new(settings.no_color, settings.style);

    let command = match cli.command {
        Commands::Config { action } => return commands::cmd_config(action, &opts),
        command => command,
    };

    let server = settings.require_server()?;
    let hub = HubClient::new(server, settings.token.as_deref())
        .with_context(|| format!("Failed to set up client for {}", server))?;
    tracing::debug!("Using hub at {}", hub.base_url());

    let quiet = settings.quiet;
    match command {
        Commands::List { dev, window } => {
            commands::cmd_list(&hub, dev.as_deref(), &window.window(), quiet, &opts).await
        }
        Commands::Json { dev, file } => commands::cmd_json(&hub, &dev, &file, &opts).await,
        Commands::Log { dev, window } => {
            commands::cmd_log(&hub, &dev, &window.window(), quiet, &opts).await
        }
        Commands::Track {
            command:
                TrackCommand::Map {
                    dev,
                    fast,
                    window,
                    margins,
                    save,
                },
        } => {
            commands::cmd_track_map(
                &hub,
                TrackMapArgs {
                    dev: &dev,
                    window: &window.window(),
                    fast,
                    margins,
                    save: save.as_deref(),
                    quiet,
                    opts: &opts,
                },
            )
            .await
        }
        Commands::Track {
            command: TrackCommand::Csv { window, dev, tower },
        } => commands::cmd_track_csv(&hub, &dev, &window.window(), tower, quiet).await,
        Commands::Axl {
            command:
                AxlCommand::Ts {
                    dev,
                    output,
                    window,
                    attrs,
                },
        } => {
            commands::cmd_axl_ts(
                &hub,
                AxlTsArgs {
                    dev: &dev,
                    output: &output,
                    window: &window.window(),
                    attrs: &attrs,
                    quiet,
                    opts: &opts,
                },
            )
            .await
        }
        // handled before the hub is set up
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}
