use anyhow::{Context, Result, ensure};
use clap::Parser;
use dotenvy::dotenv;
use std::env;

mod commands;
mod config;
mod ingestion;
mod scheduler;
mod store;
mod telemetry;
mod util;

use commands::{Command, State, default_registry};
use config::Config;
use store::pg::PgStore;

#[derive(Parser)]
#[command(name = "heron", about = "RSS feed aggregator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    telemetry::init_tracing();

    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg = Config::read()?;
    // DATABASE_URL (or .env) overrides the config file
    let dsn = env::var("DATABASE_URL")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| cfg.db_url.clone());
    ensure!(!dsn.is_empty(), "no database URL configured");

    let store = PgStore::connect(&dsn)
        .await
        .context("connecting to database")?;
    store.migrate().await.context("applying migrations")?;

    let mut state = State { store, cfg };
    let registry = default_registry();
    registry.run(&mut state, cli.command).await
}
