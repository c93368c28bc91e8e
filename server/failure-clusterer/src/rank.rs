//! Order clusters for review: largest first, ties in creation order.

use crate::cluster::ClusterSet;
use crate::types::RankedCluster;

/// Rank clusters by descending member count.
///
/// `sort_by` is stable, so clusters of equal size keep their creation order.
pub fn rank(set: ClusterSet) -> Vec<RankedCluster> {
  let mut ranked: Vec<RankedCluster> = set
    .into_clusters()
    .into_iter()
    .map(RankedCluster::from)
    .collect();
  ranked.sort_by(|a, b| b.count().cmp(&a.count()));
  ranked
}
