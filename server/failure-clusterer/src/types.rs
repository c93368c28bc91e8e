//! Core types for the failure clusterer (batch inputs, clusters, ranked output).

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Index label used when a cluster's representative signature is empty.
pub const NO_SIGNATURE_LABEL: &str = "NO EXCEPTION";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Opaque reference back to where a log came from (file path, build id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRef(pub String);

impl SourceRef {
  pub fn new(s: impl Into<String>) -> Self {
    Self(s.into())
  }

  pub fn from_path(path: &Path) -> Self {
    Self(path.to_string_lossy().into_owned())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Last path segment; the whole reference when it has no separator.
  pub fn file_name(&self) -> &str {
    self
      .0
      .rsplit(['/', '\\'])
      .next()
      .unwrap_or(&self.0)
  }
}

impl fmt::Display for SourceRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for SourceRef {
  fn from(s: &str) -> Self {
    Self(s.to_string())
  }
}

impl From<String> for SourceRef {
  fn from(s: String) -> Self {
    Self(s)
  }
}

/// One raw log as handed over by a collaborator (file reader, fetcher).
#[derive(Debug, Clone)]
pub struct RawLog {
  pub source: SourceRef,
  pub text: String,
}

impl RawLog {
  pub fn new(source: impl Into<SourceRef>, text: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      text: text.into(),
    }
  }
}

/// A log reduced to its signature. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
  signature: String,
  source: SourceRef,
}

impl LogEntry {
  pub fn new(signature: impl Into<String>, source: impl Into<SourceRef>) -> Self {
    Self {
      signature: signature.into(),
      source: source.into(),
    }
  }

  pub fn signature(&self) -> &str {
    &self.signature
  }

  pub fn source(&self) -> &SourceRef {
    &self.source
  }

  pub fn into_parts(self) -> (String, SourceRef) {
    (self.signature, self.source)
  }
}

// ---------------------------------------------------------------------------
// Clusters
// ---------------------------------------------------------------------------

/// A group of logs anchored on the signature of its first member.
///
/// The representative is fixed at creation; members only ever grow, in
/// arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
  representative: String,
  members: Vec<SourceRef>,
}

impl Cluster {
  pub(crate) fn new(representative: String, first: SourceRef) -> Self {
    Self {
      representative,
      members: vec![first],
    }
  }

  pub(crate) fn push(&mut self, member: SourceRef) {
    self.members.push(member);
  }

  pub fn representative(&self) -> &str {
    &self.representative
  }

  pub fn members(&self) -> &[SourceRef] {
    &self.members
  }

  pub fn len(&self) -> usize {
    self.members.len()
  }

  pub fn is_empty(&self) -> bool {
    self.members.is_empty()
  }
}

/// Position of a cluster in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterKey(pub usize);

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A cluster as emitted by the ranker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedCluster {
  pub representative: String,
  pub members: Vec<SourceRef>,
}

impl RankedCluster {
  /// Short index label: first line of the representative, or a sentinel.
  pub fn label(&self) -> &str {
    match self.representative.lines().next() {
      Some(first) if !first.trim().is_empty() => first,
      _ => NO_SIGNATURE_LABEL,
    }
  }

  /// Stable id derived from the representative alone.
  pub fn cluster_id(&self) -> String {
    let hash = blake3::hash(self.representative.as_bytes());
    let hex = hash.to_hex();
    format!("cl-{}", &hex[..16])
  }

  pub fn count(&self) -> usize {
    self.members.len()
  }
}

impl From<Cluster> for RankedCluster {
  fn from(c: Cluster) -> Self {
    Self {
      representative: c.representative,
      members: c.members,
    }
  }
}

/// Counters for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
  /// Inputs offered to the pipeline, readable or not.
  pub total: usize,
  pub clustered: usize,
  pub skipped: usize,
  pub clusters: usize,
  /// Clustered logs with no matching line at all.
  pub unsignatured: usize,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ranked(rep: &str, n: usize) -> RankedCluster {
    RankedCluster {
      representative: rep.into(),
      members: (0..n).map(|i| SourceRef::new(format!("log-{i}"))).collect(),
    }
  }

  #[test]
  fn label_is_first_line_of_representative() {
    let c = ranked("java.lang.IllegalStateException: boom\n\tat Foo.bar(Foo.java:1)", 1);
    assert_eq!(c.label(), "java.lang.IllegalStateException: boom");
  }

  #[test]
  fn label_falls_back_to_sentinel_for_empty_signature() {
    assert_eq!(ranked("", 3).label(), NO_SIGNATURE_LABEL);
    assert_eq!(ranked("   \nsecond", 3).label(), NO_SIGNATURE_LABEL);
  }

  #[test]
  fn cluster_id_depends_only_on_representative() {
    let a = ranked("Error: x", 1);
    let b = ranked("Error: x", 5);
    let c = ranked("Error: y", 1);
    assert_eq!(a.cluster_id(), b.cluster_id());
    assert_ne!(a.cluster_id(), c.cluster_id());
    assert!(a.cluster_id().starts_with("cl-"));
    assert_eq!(a.cluster_id().len(), 19);
  }

  #[test]
  fn source_file_name_strips_directories() {
    assert_eq!(SourceRef::new("jenkins-failed/job.12.txt").file_name(), "job.12.txt");
    assert_eq!(SourceRef::new("C:\\logs\\job.3.txt").file_name(), "job.3.txt");
    assert_eq!(SourceRef::new("job.1.txt").file_name(), "job.1.txt");
  }
}
