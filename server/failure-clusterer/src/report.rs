//! Report assembly: HTML index + one page per cluster, and a JSON summary.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use tracing::info;

use crate::error::ClusterError;
use crate::types::{RankedCluster, RunSummary};

const HTML_HEADER: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1, shrink-to-fit=no">
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@4.0.0/dist/css/bootstrap.min.css">
  </head>
"#;

// Unreserved URL characters stay literal; everything else in a file name is encoded.
const PATH_SEGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'.')
  .remove(b'_')
  .remove(b'~');

/// Where and how to write the report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
  pub out_dir: PathBuf,
  /// Prefix for member links on detail pages, relative to `out_dir`.
  pub log_link_prefix: String,
}

// ---------------------------------------------------------------------------
// JSON summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
  pub cluster_id: String,
  pub rank: usize,
  pub label: String,
  pub count: usize,
  pub representative: String,
  pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
  pub generated_at: String,
  pub threshold: u32,
  pub max_offset: usize,
  pub run: RunSummary,
  pub clusters: Vec<ClusterSummary>,
}

impl ReportSummary {
  pub fn new(
    clusters: &[RankedCluster],
    run: &RunSummary,
    threshold: u32,
    max_offset: usize,
    generated_at: DateTime<Utc>,
  ) -> Self {
    Self {
      generated_at: generated_at.to_rfc3339(),
      threshold,
      max_offset,
      run: run.clone(),
      clusters: clusters
        .iter()
        .enumerate()
        .map(|(rank, c)| ClusterSummary {
          cluster_id: c.cluster_id(),
          rank,
          label: c.label().to_string(),
          count: c.count(),
          representative: c.representative.clone(),
          members: c.members.iter().map(|m| m.0.clone()).collect(),
        })
        .collect(),
    }
  }
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

/// Minimal HTML escaping for text and attribute values.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(ch),
    }
  }
  out
}

pub fn detail_file_name(rank: usize) -> String {
  format!("{}.html", rank)
}

/// Index table: one row per cluster in ranked order.
pub fn render_index(clusters: &[RankedCluster]) -> String {
  let mut html = String::from(HTML_HEADER);
  html.push_str("<body>\n");
  html.push_str("<table class=\"table\"><tr><th>Message</th><th>Count</th></tr>\n");
  for (rank, c) in clusters.iter().enumerate() {
    let _ = writeln!(
      html,
      "<tr><td><a href=\"{}\">{}</a></td><td>{}</td></tr>",
      detail_file_name(rank),
      escape_html(c.label()),
      c.count()
    );
  }
  html.push_str("</table>\n</body></html>\n");
  html
}

/// Detail page: full representative and a link per member log.
pub fn render_detail(cluster: &RankedCluster, log_link_prefix: &str) -> String {
  let prefix = log_link_prefix.trim_end_matches('/');
  let mut html = String::from(HTML_HEADER);
  let _ = write!(
    html,
    "<body><pre>{}</pre><ul>",
    escape_html(&cluster.representative)
  );
  for member in &cluster.members {
    let name = escape_html(member.file_name());
    let segment = utf8_percent_encode(member.file_name(), PATH_SEGMENT_SET).to_string();
    let href = if prefix.is_empty() {
      segment
    } else {
      format!("{}/{}", escape_html(prefix), segment)
    };
    let _ = write!(html, "<li><a href=\"{}\">{}</a></li>", href, name);
  }
  html.push_str("</ul></body></html>\n");
  html
}

fn recreate_dir(dir: &Path) -> Result<(), ClusterError> {
  if dir.exists() {
    fs::remove_dir_all(dir)?;
  }
  fs::create_dir_all(dir)?;
  Ok(())
}

/// Write `index.html`, `<rank>.html` per cluster and `clusters.json`.
///
/// The output directory is wiped first so stale pages never linger.
pub fn write_report(
  clusters: &[RankedCluster],
  summary: &ReportSummary,
  opts: &ReportOptions,
) -> Result<(), ClusterError> {
  recreate_dir(&opts.out_dir)?;

  for (rank, c) in clusters.iter().enumerate() {
    fs::write(
      opts.out_dir.join(detail_file_name(rank)),
      render_detail(c, &opts.log_link_prefix),
    )?;
  }
  fs::write(opts.out_dir.join("index.html"), render_index(clusters))?;
  fs::write(
    opts.out_dir.join("clusters.json"),
    serde_json::to_vec_pretty(summary)?,
  )?;

  info!(
    out_dir = %opts.out_dir.display(),
    clusters = clusters.len(),
    "report written"
  );
  Ok(())
}
