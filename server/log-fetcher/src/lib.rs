//! CI failed-build log fetcher.
//!
//! Asks a Jenkins script console for the failed builds, downloads every
//! console log concurrently under a batch deadline, and hands the results
//! over in listing order. Per-build failures are logged and omitted.

pub mod error;
pub mod fetch;
pub mod jenkins;
pub mod types;

use std::time::Duration;

use tracing::info;

pub use error::FetchError;
pub use fetch::{fetch_all, write_logs, FetchOptions};
pub use jenkins::{Credentials, JenkinsClient};
pub use types::{FailedBuild, FetchOutcome, FetchReport};

/// Script used when none is supplied.
pub const FIND_FAILED_SCRIPT: &str = include_str!("../scripts/find-failed.groovy");

/// Everything needed for one fetch run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
  pub base_url: String,
  pub credentials: Credentials,
  pub script: String,
  pub request_timeout: Duration,
  pub options: FetchOptions,
}

/// Authenticate, list failed builds and fetch their console logs.
///
/// Only failing to reach the crumb issuer or the script console is fatal.
pub async fn run(config: &FetchConfig) -> Result<FetchReport, FetchError> {
  let mut client = JenkinsClient::new(
    &config.base_url,
    config.credentials.clone(),
    config.request_timeout,
  )?;
  client.authenticate().await?;

  let (builds, malformed) = client.list_failed(&config.script).await?;
  info!(builds = builds.len(), malformed, "failed builds listed");

  let mut report = fetch_all(&client, builds, &config.options).await;
  report.malformed = malformed;
  info!(
    fetched = report.fetched(),
    failed = report.failed(),
    timed_out = report.timed_out(),
    "fetch run complete"
  );
  Ok(report)
}
