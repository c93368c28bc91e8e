//! Failed-build listing and per-build fetch outcomes.

use std::collections::HashSet;

use failure_clusterer::RawLog;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

// `%` itself is encoded so distinct names never collide after encoding.
const JOB_ENCODE_SET: &AsciiSet = &CONTROLS.add(b'%').add(b'/').add(b'\\');
// Builds also escape `.`, which keeps the last `.` before `txt` a separator.
const BUILD_ENCODE_SET: &AsciiSet = &JOB_ENCODE_SET.add(b'.');

/// One line of the failed-build listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedBuild {
  pub job: String,
  pub build: String,
  pub console_url: String,
}

impl FailedBuild {
  /// `<job>.<build>.txt`, percent-encoding folder separators and `%`.
  ///
  /// Distinct `(job, build)` pairs always map to distinct names.
  pub fn file_name(&self) -> String {
    format!(
      "{}.{}.txt",
      utf8_percent_encode(&self.job, JOB_ENCODE_SET),
      utf8_percent_encode(&self.build, BUILD_ENCODE_SET)
    )
  }
}

/// Parse the script console output: `job\tbuild\tconsoleTextUrl` per line.
///
/// Returns the builds in listing order plus the number of lines skipped as
/// malformed or repeated. Blank lines are ignored silently.
pub fn parse_listing(text: &str) -> (Vec<FailedBuild>, usize) {
  let mut builds = Vec::new();
  let mut seen: HashSet<(String, String)> = HashSet::new();
  let mut malformed = 0;
  for line in text.lines() {
    if line.trim().is_empty() {
      continue;
    }
    let parts: Vec<&str> = line.split('\t').collect();
    match parts.as_slice() {
      [job, build, url, ..] if !job.is_empty() && !build.is_empty() && !url.is_empty() => {
        if !seen.insert((job.to_string(), build.to_string())) {
          tracing::warn!(job, build, "skipping repeated listing line");
          malformed += 1;
          continue;
        }
        builds.push(FailedBuild {
          job: job.to_string(),
          build: build.to_string(),
          console_url: url.trim().to_string(),
        });
      }
      _ => {
        tracing::warn!(line, "skipping malformed listing line");
        malformed += 1;
      }
    }
  }
  (builds, malformed)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
  Fetched(String),
  Failed(String),
  /// Still in flight when the batch deadline passed.
  TimedOut,
}

/// Result of one fetch batch, in listing order.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
  pub outcomes: Vec<(FailedBuild, FetchOutcome)>,
  pub malformed: usize,
}

impl FetchReport {
  pub fn fetched(&self) -> usize {
    self.count(|o| matches!(o, FetchOutcome::Fetched(_)))
  }

  pub fn failed(&self) -> usize {
    self.count(|o| matches!(o, FetchOutcome::Failed(_)))
  }

  pub fn timed_out(&self) -> usize {
    self.count(|o| matches!(o, FetchOutcome::TimedOut))
  }

  fn count(&self, pred: impl Fn(&FetchOutcome) -> bool) -> usize {
    self.outcomes.iter().filter(|(_, o)| pred(o)).count()
  }

  /// Fetched logs as a clusterer batch, in listing order.
  pub fn raw_logs(&self) -> Vec<RawLog> {
    self
      .outcomes
      .iter()
      .filter_map(|(b, o)| match o {
        FetchOutcome::Fetched(text) => Some(RawLog::new(b.file_name(), text.clone())),
        _ => None,
      })
      .collect()
  }
}
