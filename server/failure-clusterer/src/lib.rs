//! CI failure clusterer: deterministic, rule-based grouping of failed build logs.
//!
//! Reduces each console log to a signature (lines matching error predicates),
//! clusters signatures first-fit under a length-normalized Sift4 threshold,
//! ranks clusters by size and renders a review report.
//!
//! Single-threaded and order-sensitive: the same input order always yields
//! the same clusters.

pub mod cluster;
pub mod config;
pub mod distance;
pub mod error;
pub mod pipeline;
pub mod rank;
pub mod report;
pub mod signature;
pub mod source;
pub mod telemetry;
pub mod types;

pub use cluster::{ClusterSet, Clusterer};
pub use config::Config;
pub use error::ClusterError;
pub use pipeline::{Pipeline, PipelineOutput};
pub use signature::{LinePredicate, MatchRule};
pub use types::{Cluster, ClusterKey, LogEntry, RankedCluster, RawLog, RunSummary, SourceRef};
