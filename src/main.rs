use barbreeder::server::{self, AppState};
use barbreeder::{Conductor, Config, Error, VoteStore, spawn_conductor};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Breeds bars of notes from audience votes")]
struct Cli {
    /// RON file with breeding and pacing settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Directory holding index.html and the player assets
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,

    /// Overrides the seed from the config file
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    let conductor = Conductor::new(config, Arc::new(VoteStore::new()))?;
    let handle = spawn_conductor(conductor)?;
    let state = AppState {
        current_bar: handle.current_bar.clone(),
        votes: Arc::clone(&handle.votes),
    };

    let served = server::serve(cli.bind, state, &cli.static_dir).await;
    if tokio::task::spawn_blocking(move || handle.shutdown()).await.is_err() {
        error!("conductor did not shut down cleanly");
    }
    served
}
