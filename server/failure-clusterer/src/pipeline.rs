//! Batch pipeline: extract signatures, cluster in input order, rank.

use tracing::{info, warn};

use crate::cluster::Clusterer;
use crate::config::Config;
use crate::error::ClusterError;
use crate::rank;
use crate::signature;
use crate::types::{LogEntry, RankedCluster, RawLog, RunSummary};

/// Ranked clusters plus counters for one run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
  pub clusters: Vec<RankedCluster>,
  pub summary: RunSummary,
}

/// Runs one batch through extraction, clustering and ranking.
pub struct Pipeline {
  config: Config,
}

impl Pipeline {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Reduce one raw log to its entry.
  pub fn extract(&self, raw: RawLog) -> LogEntry {
    let sig = signature::extract_text(&raw.text, &self.config.predicates);
    LogEntry::new(sig, raw.source)
  }

  /// Process `inputs` in the order given.
  ///
  /// `Err` items are logged and skipped. A contract violation from the
  /// clusterer aborts the whole run.
  pub fn run<I>(&self, inputs: I) -> Result<PipelineOutput, ClusterError>
  where
    I: IntoIterator<Item = Result<RawLog, ClusterError>>,
  {
    let mut clusterer = Clusterer::new(&self.config);
    let mut summary = RunSummary::default();

    for input in inputs {
      summary.total += 1;
      let raw = match input {
        Ok(raw) => raw,
        Err(e) => {
          warn!(error = %e, "skipping unreadable log");
          summary.skipped += 1;
          continue;
        }
      };
      let entry = self.extract(raw);
      if entry.signature().is_empty() {
        summary.unsignatured += 1;
      }
      clusterer.assign(entry)?;
      summary.clustered += 1;
    }

    let clusters = rank::rank(clusterer.into_clusters());
    summary.clusters = clusters.len();
    info!(
      total = summary.total,
      clustered = summary.clustered,
      skipped = summary.skipped,
      unsignatured = summary.unsignatured,
      clusters = summary.clusters,
      "clustering complete"
    );
    Ok(PipelineOutput { clusters, summary })
  }

  /// Convenience for callers holding only readable logs.
  pub fn run_logs<I>(&self, logs: I) -> Result<PipelineOutput, ClusterError>
  where
    I: IntoIterator<Item = RawLog>,
  {
    self.run(logs.into_iter().map(Ok))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::PathBuf;

  #[test]
  fn unreadable_entries_are_skipped_not_fatal() {
    let inputs = vec![
      Ok(RawLog::new("a", "Error: one")),
      Err(ClusterError::Read {
        path: PathBuf::from("b"),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, "bad utf-8"),
      }),
      Ok(RawLog::new("c", "Error: one")),
    ];
    let out = Pipeline::with_defaults().run(inputs).unwrap();
    assert_eq!(out.summary.total, 3);
    assert_eq!(out.summary.skipped, 1);
    assert_eq!(out.summary.clustered, 2);
    assert_eq!(out.clusters.len(), 1);
    assert_eq!(out.clusters[0].count(), 2);
  }

  #[test]
  fn duplicate_source_aborts_the_run() {
    let logs = vec![RawLog::new("a", "Error: one"), RawLog::new("a", "Error: two")];
    let err = Pipeline::with_defaults().run_logs(logs).unwrap_err();
    assert!(matches!(err, ClusterError::DuplicateSource(_)));
  }

  #[test]
  fn counts_logs_without_signature() {
    let logs = vec![
      RawLog::new("a", "BUILD SUCCESSFUL"),
      RawLog::new("b", "Error: x"),
      RawLog::new("c", "nothing here"),
    ];
    let out = Pipeline::with_defaults().run_logs(logs).unwrap();
    assert_eq!(out.summary.unsignatured, 2);
    assert_eq!(out.summary.clusters, 2);
    assert_eq!(out.clusters[0].representative, "");
  }

  #[test]
  fn custom_predicates_drive_extraction() {
    let config = Config::from_json_str(
      r#"{"predicates": [{"description": "panic", "rule": {"contains": "panicked at"}}]}"#,
    )
    .unwrap();
    let entry = Pipeline::new(config).extract(RawLog::new(
      "x",
      "Error: ignored now\nthread 'main' panicked at src/main.rs:3:5",
    ));
    assert_eq!(entry.signature(), "thread 'main' panicked at src/main.rs:3:5");
  }
}
