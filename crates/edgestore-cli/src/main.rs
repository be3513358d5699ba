use anyhow::Result;
use clap::Parser;
use tracing::debug;

use edgestore_cli::{backend, cli::Cli, commands, logging};
use edgestore_config::{BackendKind, ConfigLoader};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigLoader::load_or_default(cli.config.as_deref()).await?;
    if let Some(db) = &cli.db {
        config.storage.backend = BackendKind::Sqlite;
        config.storage.sqlite.path = db.clone();
    }

    logging::init(cli.log_filter(), &config.logging);
    debug!(backend = %config.storage.backend, "Configuration loaded");

    let service = backend::open_service(&config)?;
    for line in commands::execute(cli.command, &*service).await? {
        println!("{}", line);
    }

    Ok(())
}
