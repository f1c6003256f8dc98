//! Tracelens CLI
//!
//! Reads NDJSON telemetry produced by a traced process (from a file or
//! standard input), classifies each record, and renders the derived
//! summaries.
//!
//! # Usage
//!
//! ```bash
//! tracelens --help
//! tracelens telemetry.ndjson
//! tracelens telemetry.ndjson --filter disk --ignore-case
//! dotnet run 2>&1 | tracelens --hide Metric --output json
//! ```

#![deny(unsafe_code)]

mod output;

use anyhow::{bail, Context, Result};
use clap::Parser;
use output::{render_json, render_row, OutputFormat};
use shared::decode;
use shared::models::{TelemetryItem, TelemetryType};
use shared::session::{SortMode, TelemetrySession};
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

/// Tracelens CLI - telemetry classification and display
#[derive(Parser)]
#[command(name = "tracelens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Telemetry file to read (NDJSON); reads standard input when omitted
    file: Option<PathBuf>,

    /// Keep reading as the file grows
    #[arg(short = 'f', long)]
    follow: bool,

    /// Only show telemetry whose JSON contains this text
    #[arg(short = 'F', long)]
    filter: Option<String>,

    /// Match the filter case-insensitively
    #[arg(short, long, env = "TRACELENS_IGNORE_CASE")]
    ignore_case: bool,

    /// Ordering of the rendered telemetry (arrival, timestamp, or duration)
    #[arg(short, long, env = "TRACELENS_SORT", default_value = "arrival")]
    sort: SortMode,

    /// Hide a telemetry type (repeatable)
    #[arg(long = "hide", value_name = "TYPE")]
    hidden: Vec<TelemetryType>,

    /// Validate records and skip invalid ones
    #[arg(long)]
    strict: bool,

    /// Output format (table or json)
    #[arg(short, long, default_value = "table")]
    output: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Diagnostics go to stderr; stdout carries only rendered telemetry.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    if cli.follow && cli.file.is_none() {
        bail!("--follow requires a file to watch");
    }
    if cli.follow && cli.sort != SortMode::Arrival {
        bail!("--follow only supports arrival ordering");
    }

    let mut session = TelemetrySession::new();
    if let Some(filter) = &cli.filter {
        session.set_filter(filter);
    }
    session.set_case_insensitive(cli.ignore_case);
    session.set_sort(cli.sort);
    for telemetry_type in &cli.hidden {
        session.set_type_visible(*telemetry_type, false);
    }

    // Arrival ordering streams rows as they decode; sorted output buffers
    // until end of input.
    let streaming = cli.sort == SortMode::Arrival;

    match &cli.file {
        Some(path) => {
            let file = File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            read_lines(BufReader::new(file), &cli, &mut session, streaming).await?;
        }
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            read_lines(stdin, &cli, &mut session, streaming).await?;
        }
    }

    if !streaming {
        for item in session.visible_items() {
            println!("{}", render(item, cli.output)?);
        }
    }
    Ok(())
}

async fn read_lines<R>(
    mut reader: R,
    cli: &Cli,
    session: &mut TelemetrySession,
    streaming: bool,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .await
            .context("reading telemetry input")?;
        if bytes == 0 {
            if cli.follow {
                tokio::time::sleep(std::time::Duration::from_millis(250)).await;
                continue;
            }
            break;
        }

        let Some(item) = decode::decode_line(&line) else {
            continue;
        };
        if cli.strict {
            if let Err(error) = item.telemetry().validate_record() {
                warn!(%error, "skipping invalid record");
                continue;
            }
        }

        let rendered = if streaming {
            Some(render(&item, cli.output)?)
        } else {
            None
        };
        if session.push(item).is_some() {
            if let Some(text) = rendered {
                println!("{text}");
            }
        }
    }
    Ok(())
}

fn render(item: &TelemetryItem, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_row(item)),
        OutputFormat::Json => render_json(item),
    }
}
