//! Lenslate - image text translation CLI
//!
//! Main entry point for the Lenslate application.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lenslate::cli::{Cli, Commands};
use lenslate::commands;
use lenslate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_args();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| "config/config.yaml".to_string());
    let config = Config::load(&config_path, &cli)?;
    config.validate()?;

    match cli.command {
        Commands::Translate {
            image,
            language,
            output,
            speak,
            json,
        } => {
            tracing::info!("Starting translation for {}", image.display());
            commands::translate::run_translate(config, image, language, output, speak, json).await
        }
        Commands::History { command } => commands::history::run_history(config, command).await,
        Commands::Languages { json } => commands::languages::run_languages(json),
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lenslate=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
