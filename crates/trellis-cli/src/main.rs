use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use trellis_cli::{cli::Cli, commands, logging};
use trellis_config::TrellisConfig;
use trellis_core::{SnapshotStore, TagIntegrationService};
use trellis_storage::JsonSnapshotStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration with CLI overrides
    let mut config = TrellisConfig::load(cli.config.as_deref())?;
    if let Some(data_file) = &cli.data_file {
        config = config.with_data_file(data_file);
    }

    logging::init(logging::resolve_level(&cli, &config.logging.level));

    let store = JsonSnapshotStore::new(&config.storage.data_file)
        .with_pretty(config.storage.pretty_json);
    let mut service = match store.load().await? {
        Some(snapshot) => TagIntegrationService::from_snapshot(snapshot).with_context(|| {
            format!("Failed to restore {}", store.path().display())
        })?,
        None => {
            debug!(path = %store.path().display(), "no address book yet, starting empty");
            TagIntegrationService::new()
        }
    };

    let outcome = commands::execute(cli.command, &mut service)?;

    if outcome.mutated {
        store.save(&service.to_snapshot()).await?;
        info!(path = %store.path().display(), "address book saved");
    }
    if !outcome.message.is_empty() {
        println!("{}", outcome.message);
    }
    Ok(())
}
