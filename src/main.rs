//! Trace transform CLI entry point.
//!
//! Validates pipeline configuration and replays recorded exchanges through it.

use anyhow::{Context, Result};
use clap::Parser;
use http_trace_transform::{RequestInfo, ResponseInfo, TraceConfig, TracePipeline, TraceRecord};
use serde::Deserialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "http-trace-transform")]
#[command(
    author,
    version,
    about = "Apply trace transformation rules to recorded HTTP exchanges"
)]
struct Args {
    /// Configuration file path (YAML or JSON)
    #[arg(short, long, env = "TRACE_TRANSFORM_CONFIG")]
    config: Option<PathBuf>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print example configuration and exit.
    #[arg(long)]
    example_config: bool,

    /// Validate configuration and exit.
    #[arg(long)]
    validate: bool,
}

/// One recorded exchange, as read from stdin.
#[derive(Debug, Deserialize)]
struct Exchange {
    request: RequestInfo,
    response: ResponseInfo,
    record: TraceRecord,
}

fn print_example_config() {
    let example = r#"# Trace Transform Configuration Example
version: "1"

settings:
  # Body length limit applied after all rules (UTF-16 units, -1 = no limit)
  max_body_length: 4096

rules:
  # Never log bodies of authentication calls
  - name: "hide-auth-bodies"
    description: "Clear request bodies sent to the token endpoint"
    priority: 100
    match:
      methods: ["POST"]
      url:
        pattern: "^https://auth\\.example\\.com/oauth/token$"
        type: regex
    body:
      clear: both

  # Keep only a short preview of binary responses
  - name: "short-binary-preview"
    priority: 50
    match:
      response:
        headers:
          - name: "Content-Type"
            matches: "^(image|application/octet-stream)"
    body:
      limit: 64

  # Let the server opt out of body logging
  - name: "server-skip"
    match:
      response:
        headers:
          - name: "X-Trace"
            equals: "skip"
    body:
      limit: 0
"#;
    println!("{}", example);
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout carries transformed records only
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(io::stderr))
            .init();
    }

    if args.example_config {
        print_example_config();
        return Ok(());
    }

    let pipeline = match &args.config {
        Some(config_path) => TracePipeline::from_file(config_path).with_context(|| {
            format!("Failed to load config file: {}", config_path.display())
        })?,
        None => TracePipeline::new(TraceConfig::default())?,
    };

    if args.validate {
        info!(rules = pipeline.rules().len(), "Configuration is valid");
        return Ok(());
    }

    info!(config = ?args.config, "Reading exchanges from stdin");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (index, line) in stdin.lock().lines().enumerate() {
        let line = line.context("Failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let exchange: Exchange = match serde_json::from_str(&line) {
            Ok(exchange) => exchange,
            Err(e) => {
                warn!(line = index + 1, error = %e, "Skipping malformed exchange");
                continue;
            }
        };

        let record = pipeline.apply(&exchange.request, &exchange.response, exchange.record);
        serde_json::to_writer(&mut out, &record).context("Failed to write record")?;
        out.write_all(b"\n").context("Failed to write record")?;
    }

    out.flush()?;
    info!(
        records = pipeline.records_processed(),
        "Finished transforming exchanges"
    );

    Ok(())
}
