use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tattle::{Cli, Config};

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,tattle=info,tattle_notifiers=info"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Missing or invalid flags print usage and exit non-zero from here.
    let config = match Config::try_from(Cli::parse()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_tracing() {
        eprintln!("Failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    // Each failed sink has already been logged by the dispatcher.
    match tattle::tattle(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
