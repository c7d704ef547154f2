//! Command-line interface definitions using clap derive API.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// In-memory store registry over HTTP
#[derive(Debug, Parser)]
#[command(name = "store-api")]
#[command(about = "CRUD-style HTTP service for stores, kept in memory")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./config.{toml,yaml,json} when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind to, overriding the configuration
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Print the effective configuration as TOML
    Config,
    /// Print the OpenAPI contract as JSON
    Openapi,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_with_addr_and_config() {
        let cli = Cli::parse_from(["store-api", "serve", "--addr", "127.0.0.1:9000", "--config", "svc.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("svc.toml")));
        match cli.command {
            Commands::Serve { addr } => assert_eq!(addr, Some("127.0.0.1:9000".parse().unwrap())),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bad_addr_is_rejected() {
        assert!(Cli::try_parse_from(["store-api", "serve", "--addr", "nowhere"]).is_err());
    }
}
