//! Factotum CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use factotum::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Classify { message } => {
            factotum::cli::commands::classify::execute(message, cli.json).await
        }
        Commands::Process { message, wait_secs } => {
            factotum::cli::commands::process::execute(message, wait_secs, cli.json).await
        }
        Commands::Templates => factotum::cli::commands::templates::execute(cli.json),
    };

    if let Err(err) = result {
        factotum::cli::handle_error(err, cli.json);
    }
}
