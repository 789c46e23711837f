//! Dashboard edge gatekeeper.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                  GATEKEEPER                           │
//!   Client Request    │  ┌──────────┐   ┌────────────┐   ┌───────────────┐   │
//!   ──────────────────┼─▶│ request  │──▶│  asset     │──▶│ policy rules  │   │
//!                     │  │ id/trace │   │ exclusion  │   │ 1 rate limit  │   │
//!                     │  └──────────┘   └─────┬──────┘   │ 2 entry point │   │
//!                     │                       │ static   │ 3 protected   │   │
//!                     │                       ▼          └──────┬────────┘   │
//!                     │                 ┌──────────┐            │            │
//!   Client Response   │                 │ upstream │◀── Allow ──┤            │
//!   ◀─────────────────┼── + headers ────│ forward  │            │            │
//!                     │                 └──────────┘   429 / 307 redirect    │
//!                     │                                                      │
//!                     │  registry sweeper · shutdown · logging · metrics      │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use dashboard_gatekeeper::config::{self, GatekeeperConfig};
use dashboard_gatekeeper::lifecycle::{startup, StartupError};
use dashboard_gatekeeper::observability::logging;

#[derive(Parser)]
#[command(name = "dashboard-gatekeeper")]
#[command(about = "Edge request gatekeeper for the sales dashboard", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

fn load(cli: &Cli) -> Result<GatekeeperConfig, StartupError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => GatekeeperConfig::default(),
    };

    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
        config::validate_config(&config)
            .map_err(|errors| StartupError::Config(config::ConfigError::Validation(errors)))?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;

    if cli.check {
        println!("configuration OK");
        return Ok(());
    }

    logging::init_logging(&config.observability);

    tracing::info!("dashboard-gatekeeper v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
