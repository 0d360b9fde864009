//! lisboa-sw entry point.
//!
//! Drives the offline cache interceptor against a SQLite cache and the
//! live network. Logging goes to stderr so command output on stdout stays
//! machine readable.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lisboa_core::AppConfig;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "lisboa-sw")]
#[command(about = "Offline cache interceptor for the Lisbon trip app")]
#[command(version)]
struct Args {
    /// Path to a TOML config file (default: $LISBOA_SW_CONFIG_FILE)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pre-cache every manifest asset for the current generation
    Install,
    /// Install if needed, then delete stale stores
    Activate,
    /// Handle one request the way the page would issue it
    Fetch {
        /// Path on the app origin, or an absolute URL
        path: String,
        /// Issue the request as a page navigation
        #[arg(long)]
        navigate: bool,
        #[arg(long, default_value = "GET")]
        method: String,
        /// Request header as NAME:VALUE (repeatable)
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },
    /// List cache stores with their entry counts
    Caches,
    /// Print the assembled asset manifest
    Manifest,
    /// Look up the live status of one flight
    Flight {
        #[arg(long)]
        carrier: String,
        #[arg(long)]
        number: String,
        /// Departure date (YYYY-MM-DD)
        #[arg(long)]
        departure: String,
    },
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("expected NAME:VALUE, got {raw:?}")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    let config = AppConfig::load_from(args.config.as_deref())?;

    tracing::debug!("loaded config for origin {} generation {}", config.origin, config.generation);

    match args.command {
        Command::Install => commands::install(&config).await,
        Command::Activate => commands::activate(&config).await,
        Command::Fetch { path, navigate, method, headers } => {
            commands::fetch(&config, &path, navigate, &method, headers).await
        }
        Command::Caches => commands::caches(&config).await,
        Command::Manifest => commands::manifest(&config),
        Command::Flight { carrier, number, departure } => {
            commands::flight(&config, &carrier, &number, &departure).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_headers_parse() {
        let args = Args::try_parse_from([
            "lisboa-sw",
            "fetch",
            "/data/flights.json",
            "-H",
            "accept: application/json",
            "--header",
            "x-trip:lisbon",
        ])
        .unwrap();
        match args.command {
            Command::Fetch { headers, .. } => assert_eq!(
                headers,
                vec![
                    ("accept".to_string(), "application/json".to_string()),
                    ("x-trip".to_string(), "lisbon".to_string())
                ]
            ),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_fetch_header_without_colon_is_rejected() {
        assert!(Args::try_parse_from(["lisboa-sw", "fetch", "/", "-H", "accept"]).is_err());
    }
}
