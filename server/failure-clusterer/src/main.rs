//! Binary entrypoint: cluster a directory of console logs into an HTML report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use failure_clusterer::report::{self, ReportOptions, ReportSummary};
use failure_clusterer::telemetry::init_tracing;
use failure_clusterer::{source, Config, Pipeline};

#[derive(Parser)]
#[command(name = "categorize-failures")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Group failed CI build logs by failure signature", long_about = None)]
struct Cli {
  /// Directory of console logs, one file per failed build
  #[arg(default_value = "jenkins-failed")]
  input: PathBuf,

  /// Report output directory (recreated on every run)
  #[arg(short, long, default_value = "jenkins-failed-html")]
  out: PathBuf,

  /// JSON config file with threshold, max_offset and predicates
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Override the acceptance threshold (percent)
  #[arg(long)]
  threshold: Option<u32>,

  /// Override the Sift4 look-ahead window
  #[arg(long)]
  max_offset: Option<usize>,

  /// Link prefix for member logs on detail pages (default: ../<input dir name>)
  #[arg(long)]
  log_link_prefix: Option<String>,

  /// Enable debug logging
  #[arg(short, long)]
  verbose: bool,

  /// Emit JSON-formatted log lines
  #[arg(long)]
  json_logs: bool,
}

fn main() {
  let cli = Cli::parse();
  let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
  init_tracing(cli.json_logs, level);

  if let Err(e) = run(cli) {
    eprintln!("categorize-failures: {:#}", e);
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  let mut config = match &cli.config {
    Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
    None => Config::default(),
  };
  if let Some(t) = cli.threshold {
    config.threshold = t;
  }
  if let Some(o) = cli.max_offset {
    config.max_offset = o;
  }
  config.validate()?;

  let inputs = source::read_dir_logs(&cli.input)?;
  let pipeline = Pipeline::new(config);
  let output = pipeline.run(inputs)?;

  let summary = ReportSummary::new(
    &output.clusters,
    &output.summary,
    pipeline.config().threshold,
    pipeline.config().max_offset,
    chrono::Utc::now(),
  );
  let opts = ReportOptions {
    out_dir: cli.out.clone(),
    log_link_prefix: cli
      .log_link_prefix
      .unwrap_or_else(|| default_link_prefix(&cli.input)),
  };
  report::write_report(&output.clusters, &summary, &opts)?;

  info!(index = %cli.out.join("index.html").display(), "done");
  Ok(())
}

fn default_link_prefix(input: &Path) -> String {
  match input.file_name() {
    Some(name) => format!("../{}", name.to_string_lossy()),
    None => input.to_string_lossy().into_owned(),
  }
}
