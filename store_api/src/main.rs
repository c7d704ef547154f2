//! Main entry point for the store-api CLI.

use anyhow::Result;
use clap::Parser;
use store_api::{cli, openapi, server, settings::Settings, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = cli::Cli::parse();

    // Load settings
    let mut settings = Settings::load(args.config.as_deref())?;

    match args.command {
        cli::Commands::Serve { addr } => {
            if let Some(addr) = addr {
                settings.override_addr(addr);
            }
            telemetry::init(&settings.logging)?;
            server::serve(settings).await
        }
        cli::Commands::Config => {
            print!("{}", toml::to_string_pretty(&settings)?);
            Ok(())
        }
        cli::Commands::Openapi => {
            println!("{}", serde_json::to_string_pretty(&openapi::document())?);
            Ok(())
        }
    }
}
