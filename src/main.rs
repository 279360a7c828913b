//! Command-line entry point for the Attendance Reconciliation Engine.
//!
//! `serve` runs the HTTP API; `reconcile` reads a month input JSON file
//! and prints the month report to stdout.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use attendance_engine::api::{AppState, create_router};
use attendance_engine::config::ConfigLoader;
use attendance_engine::models::MonthInput;
use attendance_engine::reconciliation::Reconciler;

#[derive(Parser)]
#[command(name = "attendance-engine", version, about = "Reconcile clock punches against an attendance ledger")]
struct Cli {
    /// Directory containing policy.yaml and roster.yaml
    #[arg(long, global = true, default_value = "./config/default")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: String,
    },
    /// Reconcile one month from a JSON file and print the report
    Reconcile {
        /// Month input JSON file
        #[arg(long)]
        input: PathBuf,
        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let loader = ConfigLoader::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    match cli.command {
        Command::Serve { bind } => {
            let app = create_router(AppState::new(loader));
            let listener = tokio::net::TcpListener::bind(&bind)
                .await
                .with_context(|| format!("binding {}", bind))?;
            info!(
                "attendance-engine v{} listening on http://{}",
                env!("CARGO_PKG_VERSION"),
                bind
            );
            axum::serve(listener, app).await?;
        }
        Command::Reconcile { input, pretty } => {
            let raw = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let month: MonthInput = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", input.display()))?;

            let report = Reconciler::new(loader.into_config()).reconcile_month(&month)?;
            let rendered = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{}", rendered);
        }
    }

    Ok(())
}
