mod picker;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ridedesk_locations::{FixtureSource, LocationClient, LocationStore};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ridedesk-cli")]
#[command(about = "Inspect the dashboard's state/city/center pickers")]
struct Cli {
    /// Read locations from a YAML file instead of the API
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Print options as JSON instead of `value<TAB>label` lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List state options
    States {
        /// Use state names as option values
        #[arg(long)]
        by_name: bool,
    },
    /// Choose a state and list its city options
    Cities {
        /// State id, or state name with --by-name
        #[arg(long)]
        state: String,
        /// Address the state and cities by name
        #[arg(long)]
        by_name: bool,
    },
    /// List center options
    Centers {
        /// Use center names as option values
        #[arg(long)]
        by_name: bool,
    },
    /// Look up a center by its exact name
    ResolveCenter { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(path) = cli.fixture.as_deref() {
        let level = std::env::var("RIDEDESK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        init_tracing(&level)?;
        let store = LocationStore::new(FixtureSource::load(path)?);
        return picker::run(store, &cli.command, cli.json).await;
    }

    let config = ridedesk_core::load_app_config()?;
    init_tracing(&config.log_level)?;
    tracing::debug!(?config, "loaded configuration");

    if config.api_base_url.is_some() {
        let store = LocationStore::new(LocationClient::from_config(&config)?);
        picker::run(store, &cli.command, cli.json).await
    } else if let Some(path) = config.fixture_path.as_deref() {
        let store = LocationStore::new(FixtureSource::load(path)?);
        picker::run(store, &cli.command, cli.json).await
    } else {
        anyhow::bail!("set RIDEDESK_API_BASE_URL or pass --fixture")
    }
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
