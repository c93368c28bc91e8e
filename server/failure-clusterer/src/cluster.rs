//! First-fit fuzzy clustering of signatures.
//!
//! Each entry is compared against existing representatives in creation order
//! and joins the first one that accepts it. Membership therefore depends on
//! the order entries are supplied in; callers must feed a reproducible order.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::config::Config;
use crate::distance::Sift4;
use crate::error::ClusterError;
use crate::types::{Cluster, ClusterKey, LogEntry, SourceRef};

/// Clusters in creation order, addressable by representative.
#[derive(Debug, Clone, Default)]
pub struct ClusterSet {
  clusters: Vec<Cluster>,
  by_representative: HashMap<String, usize>,
}

impl ClusterSet {
  pub fn len(&self) -> usize {
    self.clusters.len()
  }

  pub fn is_empty(&self) -> bool {
    self.clusters.is_empty()
  }

  pub fn get(&self, key: ClusterKey) -> Option<&Cluster> {
    self.clusters.get(key.0)
  }

  pub fn by_representative(&self, signature: &str) -> Option<&Cluster> {
    self
      .by_representative
      .get(signature)
      .and_then(|&i| self.clusters.get(i))
  }

  pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
    self.clusters.iter()
  }

  /// Consume the set, yielding clusters in creation order.
  pub fn into_clusters(self) -> Vec<Cluster> {
    self.clusters
  }

  fn create(&mut self, representative: String, first: SourceRef) -> ClusterKey {
    let idx = self.clusters.len();
    self.by_representative.insert(representative.clone(), idx);
    self.clusters.push(Cluster::new(representative, first));
    ClusterKey(idx)
  }
}

/// Online greedy clusterer for one batch.
#[derive(Debug, Clone)]
pub struct Clusterer {
  threshold: u32,
  metric: Sift4,
  set: ClusterSet,
  seen: HashSet<SourceRef>,
}

impl Clusterer {
  pub fn new(config: &Config) -> Self {
    Self {
      threshold: config.threshold,
      metric: Sift4::new(config.max_offset),
      set: ClusterSet::default(),
      seen: HashSet::new(),
    }
  }

  pub fn with_defaults() -> Self {
    Self::new(&Config::default())
  }

  /// Would `signature` be routed into a cluster anchored on `representative`?
  ///
  /// The distance is normalized by the length of `signature` (the newcomer),
  /// not the representative. Empty signatures only match each other.
  pub fn accepts(&self, representative: &str, signature: &str) -> bool {
    if signature.is_empty() || representative.is_empty() {
      return signature == representative;
    }
    let distance = self.metric.distance(representative, signature) as u64;
    let len = signature.chars().count() as u64;
    // d * 100 / len < threshold, without rounding.
    distance * 100 < u64::from(self.threshold) * len
  }

  /// Route one entry into the first accepting cluster, or start a new one.
  pub fn assign(&mut self, entry: LogEntry) -> Result<ClusterKey, ClusterError> {
    let (signature, source) = entry.into_parts();
    if !self.seen.insert(source.clone()) {
      return Err(ClusterError::DuplicateSource(source.0));
    }

    let found = self
      .set
      .clusters
      .iter()
      .position(|c| self.accepts(c.representative(), &signature));

    match found {
      Some(idx) => {
        trace!(%source, cluster = idx, "joined cluster");
        self.set.clusters[idx].push(source);
        Ok(ClusterKey(idx))
      }
      None => {
        let key = self.set.create(signature, source);
        debug!(cluster = key.0, "new cluster");
        Ok(key)
      }
    }
  }

  pub fn clusters(&self) -> &ClusterSet {
    &self.set
  }

  pub fn into_clusters(self) -> ClusterSet {
    self.set
  }
}
