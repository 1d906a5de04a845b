mod app;
mod rain;

use anyhow::{Context, Result};
use clap::Parser;
use std::{
    fs::{self, OpenOptions},
    sync::Arc,
};

use poker_core::{
    config::{self, AppConfig},
    store::SharedStore,
    FirebaseStore, IdentityStore, MemoryStore, RoomController, SystemClock,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Terminal planning poker.
#[derive(Debug, Parser)]
#[command(name = "planning-poker", version, about)]
struct Cli {
    /// Room to pre-fill in the join form.
    #[arg(long)]
    room: Option<String>,
    /// Display name to pre-fill in the join form.
    #[arg(long)]
    name: Option<String>,
    /// Realtime database URL, overriding the config file.
    #[arg(long, env = "PLANNING_POKER_DATABASE_URL")]
    database_url: Option<String>,
    /// Use the in-process store even if a database is configured.
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    config::ensure_default_config()?;
    let mut config = AppConfig::load()?;
    if let Some(url) = cli.database_url.clone() {
        config.database_url = url;
    }

    let identity = IdentityStore::open(config.identity_path())?;
    let prefill = app::Prefill {
        room: cli.room.clone(),
        name: cli.name.clone(),
    };

    if config.uses_remote_store() && !cli.offline {
        info!(url = %config.database_url, "using realtime database");
        let store = FirebaseStore::new(&config.database_url, config.auth_token.clone())
            .context("failed to configure realtime database")?;
        run(Arc::new(store), identity, &config, prefill, false).await
    } else {
        info!("using in-process store");
        run(Arc::new(MemoryStore::new()), identity, &config, prefill, true).await
    }
}

async fn run<S: SharedStore>(
    store: Arc<S>,
    identity: IdentityStore,
    config: &AppConfig,
    prefill: app::Prefill,
    offline: bool,
) -> Result<()> {
    let controller = RoomController::new(store, identity, Arc::new(SystemClock), config.room_ttl());
    let mut app = app::PokerApp::new(controller, prefill, offline);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("planning-poker.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::from_default_env();

    // The terminal UI owns stdout, so logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_ansi(false)
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
