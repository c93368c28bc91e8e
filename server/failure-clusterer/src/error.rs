//! Structured error types for the failure clusterer.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
  /// The same source was handed to the clusterer twice in one batch.
  #[error("duplicate source in batch: {0}")]
  DuplicateSource(String),

  #[error("cannot enumerate {}: {source}", path.display())]
  Enumerate {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("cannot read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("no input logs found in {}", .0.display())]
  EmptyInput(PathBuf),

  #[error("config: {0}")]
  Config(String),

  #[error("report: {0}")]
  Report(#[from] std::io::Error),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl ClusterError {
  pub fn config(msg: impl Into<String>) -> Self {
    Self::Config(msg.into())
  }
}
