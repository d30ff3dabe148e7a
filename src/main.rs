//! Classroom service daemon
//!
//! Connects the local store to the access-control platform and runs the
//! background workers that close overdue assignments and reconcile drift.

use anyhow::{Context, Result};
use clap::Parser;
use classroom_access::RestAccessControl;
use classroom_sync::{spawn_workers, WorkerConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Classroom - keep classroom state and platform permissions in sync
#[derive(Parser, Debug)]
#[command(name = "classroom")]
#[command(about = "Classroom - keep classroom state and platform permissions in sync")]
#[command(version)]
struct Cli {
    /// Database URL (sqlite or postgres)
    #[arg(long, env = "CLASSROOM_DATABASE_URL")]
    database_url: String,

    /// Base URL of the access-control platform
    #[arg(long, env = "CLASSROOM_PLATFORM_URL")]
    platform_url: String,

    /// Admin token for the platform API
    #[arg(long, env = "CLASSROOM_ADMIN_TOKEN")]
    admin_token: String,

    /// Seconds between assignment-closing passes
    #[arg(long, default_value = "60")]
    close_interval: u64,

    /// Seconds between drift-reconciliation passes
    #[arg(long, default_value = "300")]
    reconcile_interval: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Setup logging with the specified log level
fn setup_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let db = classroom_db::connect(&cli.database_url)
        .await
        .context("Failed to connect to database")?;
    classroom_db::migrate(&db)
        .await
        .context("Failed to run migrations")?;

    let access = Arc::new(RestAccessControl::new(
        cli.platform_url.clone(),
        cli.admin_token.clone(),
    ));

    let shutdown = CancellationToken::new();
    let handles = spawn_workers(
        db,
        access,
        WorkerConfig {
            close_interval: Duration::from_secs(cli.close_interval),
            reconcile_interval: Duration::from_secs(cli.reconcile_interval),
        },
        shutdown.clone(),
    );

    info!(
        platform = %cli.platform_url,
        close_interval = cli.close_interval,
        reconcile_interval = cli.reconcile_interval,
        "Workers started"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutting down");
    shutdown.cancel();

    for handle in handles {
        let _ = handle.await;
    }

    Ok(())
}
