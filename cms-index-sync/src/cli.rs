///
/// This module implements the CLI interface for cms-index-sync: command parsing, the two
/// entrypoints (`sync` and `serve`) and user-visible output.
///
/// All pipeline logic (fetching, filtering, record building, index replacement) lives in the
/// [`cms-index-sync-core`] crate. This module is strictly CLI glue.
///
/// ## How To Use
/// - For command-line users: use the installed `cms-index-sync` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`cms-index-sync-core`]: ../../cms-index-sync-core/
use crate::load_config::load_config;
use crate::server::{run_server, AppState};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// CLI for cms-index-sync: mirror live CMS content into a search index.
#[derive(Parser)]
#[clap(
    name = "cms-index-sync",
    version,
    about = "Replace search indexes with the live, markup-free content of a CMS site"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one full sync of all selected collections and print the JSON outcome
    Sync {
        /// Path to an optional YAML config file (secrets always come from the environment)
        #[clap(long)]
        config: Option<PathBuf>,
    },
    /// Serve the webhook trigger, optionally running a sync on a fixed interval
    Serve {
        /// Path to an optional YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Address to listen on, overriding the config file
        #[clap(long)]
        bind: Option<String>,
        /// Also run a sync every N seconds
        #[clap(long)]
        every: Option<u64>,
    },
}

/// Resolve the schedule from `--every` and the config file. `--every 0` switches it off.
pub fn schedule_interval(flag: Option<u64>, configured: Option<Duration>) -> Option<Duration> {
    match flag {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => configured,
    }
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Sync { config } => {
            let config = load_config(config.as_deref())?;
            tracing::info!(command = "sync", "Starting synchronisation run");
            let state = AppState::from_config(&config)?;
            let outcome = state.run_once().await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.is_success() {
                tracing::error!(command = "sync", "Synchronisation failed");
                bail!("Synchronisation failed");
            }
            tracing::info!(command = "sync", "Synchronisation complete");
            Ok(())
        }
        Commands::Serve {
            config,
            bind,
            every,
        } => {
            let config = load_config(config.as_deref())?;
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let every = schedule_interval(every, config.server.every);
            tracing::info!(command = "serve", %bind, ?every, "Starting trigger server");
            let state = AppState::from_config(&config)?;
            run_server(state, &bind, every).await
        }
    }
}
