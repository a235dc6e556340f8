//! Stubport - configuration-driven HTTP stub server.
//!
//! Usage:
//!   stubport -c <config.json> [--host <addr>]
//!
//! Starts one endpoint per configuration record and serves until ctrl-c.

use anyhow::Context;
use clap::{CommandFactory, Parser};
use std::path::{Path, PathBuf};
use stubport::endpoint::EndpointRegistry;
use stubport::load_config;
use stubport::summary::render_table;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Log level used when `RUST_LOG` is unset, empty or unparsable
const DEFAULT_LOG_FILTER: &str = "info";

const CONFIG_REFERENCE: &str = "\
Config file: a JSON (or YAML) array of endpoint records.

  name          name of server (informational)
  port          port number (required)
  path          path of server (default: /)
  methods       method or list of methods: GET, POST, PUT, DELETE, PATCH,
                OPTIONS, HEAD (alias: method)
  input         input for which output is to be generated
  code          status code sent with output (default: 200)
  output        output to be generated
  errorCode     status code when input is not matched (default: 404)
  errorMessage  body when input is not matched (default: Not Found)

Example:
  [{\"port\": 3000, \"method\": \"POST\", \"input\": {\"type\": \"text\"}, \"output\": \"text\"}]";

/// Configuration-driven HTTP stub server
#[derive(Parser, Debug)]
#[command(name = "stubport")]
#[command(author, version, after_help = CONFIG_REFERENCE)]
struct Args {
    /// Config file path
    #[arg(short, long, env = "STUBPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Address every endpoint binds to
    #[arg(long, env = "STUBPORT_HOST", default_value = stubport::endpoint::DEFAULT_HOST)]
    host: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .init();

    let args = Args::parse();

    let Some(config_path) = args.config else {
        println!("No config file passed\n");
        if let Err(e) = Args::command().print_help() {
            error!("Failed to print help: {}", e);
        }
        std::process::exit(0);
    };

    if let Err(e) = run(&config_path, &args.host).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

async fn run(config_path: &Path, host: &str) -> anyhow::Result<()> {
    info!("Config file: {}", config_path.display());
    let configs = load_config(config_path)?;

    let registry = EndpointRegistry::start_on(&configs, host)
        .await
        .context("Failed to start endpoints")?;

    print_summary(&registry);
    info!(
        "{} endpoint(s) serving on {}. Press ctrl-c to stop.",
        registry.len(),
        host
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    info!("Shutting down");
    registry.stop_all();
    Ok(())
}

fn print_summary(registry: &EndpointRegistry) {
    let rows: Vec<_> = registry
        .endpoints()
        .iter()
        .map(|endpoint| endpoint.rule().summary_row())
        .collect();

    let mut lines = render_table(&rows).into_iter();
    if let Some(header) = lines.next() {
        println!("{BOLD}{CYAN}{header}{RESET}");
    }
    if let Some(separator) = lines.next() {
        println!("{DIM}{separator}{RESET}");
    }
    for line in lines {
        println!("{line}");
    }

    println!("{GREEN}{BOLD}{} endpoint(s) started{RESET}", registry.len());
}
