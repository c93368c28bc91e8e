//! Clusterer configuration with sane defaults, optionally loaded from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::distance::DEFAULT_MAX_OFFSET;
use crate::error::ClusterError;
use crate::signature::{default_predicates, LinePredicate};

/// Normalized distance (percent of the new signature's length) below which
/// a signature joins an existing cluster.
pub const DEFAULT_THRESHOLD: u32 = 20;

/// Tunables for extraction and clustering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Acceptance threshold in percent; comparison is strict `<`.
  pub threshold: u32,
  /// Sift4 look-ahead window in characters.
  pub max_offset: usize,
  /// Line-selection rules; a line is kept when any of them matches.
  pub predicates: Vec<LinePredicate>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      threshold: DEFAULT_THRESHOLD,
      max_offset: DEFAULT_MAX_OFFSET,
      predicates: default_predicates(),
    }
  }
}

impl Config {
  pub fn from_json_str(s: &str) -> Result<Self, ClusterError> {
    let config: Config = serde_json::from_str(s)?;
    config.validate()?;
    Ok(config)
  }

  pub fn load(path: &Path) -> Result<Self, ClusterError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ClusterError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json_str(&raw)
  }

  pub fn validate(&self) -> Result<(), ClusterError> {
    if self.threshold == 0 || self.threshold > 100 {
      return Err(ClusterError::config("threshold must be within 1..=100"));
    }
    if self.max_offset == 0 {
      return Err(ClusterError::config("max_offset must be positive"));
    }
    if self.predicates.is_empty() {
      return Err(ClusterError::config("at least one predicate is required"));
    }
    if let Some(p) = self.predicates.iter().find(|p| p.rule.pattern().is_empty()) {
      return Err(ClusterError::config(format!(
        "predicate '{}' has an empty pattern",
        p.description
      )));
    }
    Ok(())
  }
}
