mod config;
mod error;

use clap::Parser;
use config::{AppConfig, Cli, Commands};

mod cmd;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match AppConfig::load(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Subscribe(args) => cmd::subscribe::run(&config, args).await,
        Commands::Serve(args) => cmd::serve::run(&config, args).await,
        Commands::View(args) => cmd::view::run(&config, args).await,
        Commands::Delete(args) => cmd::delete::run(&config, args).await,
        Commands::Publish(args) => cmd::publish::run(&config, args).await,
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
