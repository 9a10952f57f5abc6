//! `tgapp-db` operational entry-point.
//!
//! Available sub-commands:
//! - `migrate` — apply pending database migrations.
//! - `ping`    — check connectivity against the configured database.
//!
//! There are no CRUD sub-commands: the application reaches the `tgapp`
//! schema through the `tgapp-db` library, not through this binary.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use tgapp_db::{pool, DbConfig};

#[derive(Parser)]
#[command(
    name = "tgapp-db",
    about = "Operational tooling for the tgapp profiling schema",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending database migrations.
    Migrate,
    /// Open a pooled connection and run a trivial query.
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = DbConfig::from_env()?;

    match cli.command {
        Command::Migrate => {
            let pool = pool::create_pool(&config.database_url, 2).await?;
            pool::run_migrations(&pool).await?;
            info!("Migrations applied successfully");
        }
        Command::Ping => {
            let pool = config.connect().await?;
            pool::ping(&pool).await?;
            info!("Database is reachable");
        }
    }

    Ok(())
}
