//! Binary entrypoint: download failed-build console logs into a directory.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use failure_clusterer::telemetry::init_tracing;
use log_fetcher::fetch::{DEFAULT_BATCH_TIMEOUT, DEFAULT_CONCURRENCY, DEFAULT_REQUEST_TIMEOUT};
use log_fetcher::{Credentials, FetchConfig, FetchOptions, FIND_FAILED_SCRIPT};

#[derive(Parser)]
#[command(name = "fetch-failed")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Download console logs of failed Jenkins builds", long_about = None)]
struct Cli {
  /// Jenkins base URL
  #[arg(long, env = "JENKINS_URL")]
  url: String,

  /// Jenkins user name
  #[arg(long, env = "JENKINS_USER")]
  user: String,

  /// Jenkins API token
  #[arg(long, env = "JENKINS_TOKEN", hide_env_values = true)]
  token: String,

  /// Groovy script printing `job\tbuild\tconsoleTextUrl` lines (default: built-in)
  #[arg(long)]
  script: Option<PathBuf>,

  /// Output directory for `<job>.<build>.txt` files
  #[arg(short, long, default_value = "jenkins-failed")]
  out: PathBuf,

  /// Maximum concurrent console fetches
  #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
  concurrency: usize,

  /// Deadline for the whole fetch batch, in seconds
  #[arg(long, default_value_t = DEFAULT_BATCH_TIMEOUT.as_secs())]
  timeout_secs: u64,

  /// Per-request timeout, in seconds
  #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
  request_timeout_secs: u64,

  /// Enable debug logging
  #[arg(short, long)]
  verbose: bool,

  /// Emit JSON-formatted log lines
  #[arg(long)]
  json_logs: bool,
}

#[tokio::main]
async fn main() {
  let cli = Cli::parse();
  let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
  init_tracing(cli.json_logs, level);

  if let Err(e) = run(cli).await {
    eprintln!("fetch-failed: {:#}", e);
    std::process::exit(1);
  }
}

async fn run(cli: Cli) -> Result<()> {
  let script = match &cli.script {
    Some(path) => std::fs::read_to_string(path)
      .with_context(|| format!("reading script {}", path.display()))?,
    None => FIND_FAILED_SCRIPT.to_string(),
  };

  let config = FetchConfig {
    base_url: cli.url,
    credentials: Credentials {
      user: cli.user,
      token: cli.token,
    },
    script,
    request_timeout: Duration::from_secs(cli.request_timeout_secs),
    options: FetchOptions {
      concurrency: cli.concurrency,
      batch_timeout: Duration::from_secs(cli.timeout_secs),
    },
  };

  let report = log_fetcher::run(&config).await?;
  let written = log_fetcher::write_logs(&report, &cli.out)
    .with_context(|| format!("writing logs to {}", cli.out.display()))?;
  info!(written, out_dir = %cli.out.display(), "console logs stored");
  Ok(())
}
