//! Concurrent console-log fetching with a batch deadline.
//!
//! Fetches run through a bounded `buffer_unordered` stream. Each completion
//! carries the build's position in the listing and lands in a pre-sized slot,
//! so the report comes out in listing order whatever order fetches finish in.

use std::path::Path;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::jenkins::JenkinsClient;
use crate::types::{FailedBuild, FetchOutcome, FetchReport};

pub const DEFAULT_CONCURRENCY: usize = 16;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
pub struct FetchOptions {
  /// Maximum fetches in flight at once.
  pub concurrency: usize,
  /// Deadline for the whole batch; unfinished fetches are abandoned.
  pub batch_timeout: Duration,
}

impl Default for FetchOptions {
  fn default() -> Self {
    Self {
      concurrency: DEFAULT_CONCURRENCY,
      batch_timeout: DEFAULT_BATCH_TIMEOUT,
    }
  }
}

/// Fetch every build's console log. Never fails as a whole: per-build
/// errors and the deadline only degrade the report.
pub async fn fetch_all(
  client: &JenkinsClient,
  builds: Vec<FailedBuild>,
  opts: &FetchOptions,
) -> FetchReport {
  info!(builds = builds.len(), "queuing console log fetches");
  let deadline = Instant::now() + opts.batch_timeout;
  let mut slots: Vec<Option<FetchOutcome>> = vec![None; builds.len()];

  {
    let mut pending = stream::iter(builds.iter().enumerate())
      .map(|(idx, build)| async move {
        let outcome = match client.console_text(&build.console_url).await {
          Ok(text) => FetchOutcome::Fetched(text),
          Err(e) => {
            warn!(url = %build.console_url, error = %e, "console fetch failed");
            FetchOutcome::Failed(e.to_string())
          }
        };
        (idx, outcome)
      })
      .buffer_unordered(opts.concurrency.max(1));

    loop {
      match tokio::time::timeout_at(deadline, pending.next()).await {
        Ok(Some((idx, outcome))) => slots[idx] = Some(outcome),
        Ok(None) => {
          info!("fetching output complete");
          break;
        }
        Err(_) => {
          warn!(
            timeout_secs = opts.batch_timeout.as_secs(),
            "timeout expired while fetching output"
          );
          break;
        }
      }
    }
  }

  let outcomes = builds
    .into_iter()
    .zip(slots)
    .map(|(build, slot)| {
      let outcome = slot.unwrap_or_else(|| {
        warn!(job = %build.job, build = %build.build, "no console log before deadline");
        FetchOutcome::TimedOut
      });
      (build, outcome)
    })
    .collect();

  FetchReport {
    outcomes,
    malformed: 0,
  }
}

/// Write each fetched log to `<dir>/<job>.<build>.txt`, replacing old copies.
pub fn write_logs(report: &FetchReport, dir: &Path) -> Result<usize, FetchError> {
  std::fs::create_dir_all(dir)?;
  let mut written = 0;
  for (build, outcome) in &report.outcomes {
    if let FetchOutcome::Fetched(text) = outcome {
      std::fs::write(dir.join(build.file_name()), text)?;
      written += 1;
    }
  }
  Ok(written)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn write_logs_skips_missing_builds() {
    let dir = tempfile::tempdir().unwrap();
    let b = |job: &str| FailedBuild {
      job: job.into(),
      build: "7".into(),
      console_url: String::new(),
    };
    let report = FetchReport {
      outcomes: vec![
        (b("a"), FetchOutcome::Fetched("Error: a".into())),
        (b("b"), FetchOutcome::Failed("boom".into())),
        (b("c"), FetchOutcome::TimedOut),
      ],
      malformed: 0,
    };
    assert_eq!(write_logs(&report, dir.path()).unwrap(), 1);
    assert_eq!(
      std::fs::read_to_string(dir.path().join("a.7.txt")).unwrap(),
      "Error: a"
    );
    assert!(!dir.path().join("b.7.txt").exists());
  }

  #[test]
  fn default_options() {
    let o = FetchOptions::default();
    assert_eq!(o.concurrency, 16);
    assert_eq!(o.batch_timeout, Duration::from_secs(600));
  }
}
