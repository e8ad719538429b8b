//! bridge - command line access to the Bridge research platform.
//!
//! Signs in (explicit flags, then `~/.bridgeConfig`, then an interactive
//! prompt) and prints participant listings or raw API responses.

mod args;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use bridgeclient_core::{BridgeConnector, ConfigStore, RequestOptions, ResponseBody};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Command, OutputFormat};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing();

    let bridge = connect(&cli)?;
    info!(base_url = bridge.base_url(), "Connected to Bridge");

    let mut out = io::stdout().lock();
    match &cli.command {
        Command::Participants {
            start_date,
            end_date,
            format,
        } => {
            let table = bridge
                .participants(*start_date, *end_date)
                .context("Failed to fetch participants")?;
            match format {
                OutputFormat::Tsv => write!(out, "{}", table.to_tsv())?,
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut out, table.rows())?;
                    writeln!(out)?;
                }
            }
            info!(count = table.len(), "Participants written");
        }
        Command::Metadata { user_id } => {
            let metadata = bridge
                .participant_metadata(user_id)
                .with_context(|| format!("Failed to fetch metadata for {}", user_id))?;
            print_json(&mut out, &metadata)?;
        }
        Command::RequestInfo { user_id } => {
            let request_info = bridge
                .participant_info(user_id)
                .with_context(|| format!("Failed to fetch request info for {}", user_id))?;
            print_json(&mut out, &request_info)?;
        }
        Command::Get { uri } => {
            match bridge
                .get(uri, &RequestOptions::new())
                .with_context(|| format!("GET {} failed", uri))?
            {
                ResponseBody::Json(value) => print_json(&mut out, &value)?,
                ResponseBody::Text(text) => write!(out, "{}", text)?,
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn connect(cli: &Cli) -> Result<BridgeConnector> {
    let http = reqwest::blocking::Client::builder().timeout(cli.timeout.map(Duration::from_secs));

    let mut builder = BridgeConnector::builder()
        .study(&cli.study)
        .account_type(&cli.account_type)
        .remember_me(cli.remember_me)
        .http_client(http.build().context("Failed to build HTTP client")?);

    if let Some(email) = &cli.email {
        builder = builder.email(email);
    }
    if let Some(password) = &cli.password {
        builder = builder.password(password);
    }
    if let Some(base_url) = &cli.base_url {
        builder = builder.base_url(base_url);
    }
    if let Some(config) = &cli.config {
        builder = builder.config(ConfigStore::new(config.clone()));
    }

    builder.connect().context("Failed to sign in to Bridge")
}

fn print_json(out: &mut impl Write, value: &serde_json::Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
