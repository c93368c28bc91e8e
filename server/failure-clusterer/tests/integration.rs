//! Integration tests for the failure clusterer.

use std::fs;

use failure_clusterer::report::{self, ReportOptions, ReportSummary};
use failure_clusterer::{source, Pipeline, RankedCluster, RawLog};

fn gradle_log(detail: &str) -> String {
  format!(
    "Started by timer\n\
     > Task :compileJava\n\
     Exception in thread \"main\" java.lang.RuntimeException: NullPointer{detail}\n\
     BUILD FAILED in 12s\n"
  )
}

fn scenario() -> Vec<RawLog> {
  vec![
    RawLog::new("job-a.1.txt", gradle_log("")),
    RawLog::new("job-b.4.txt", gradle_log(" at line 9")),
    RawLog::new("job-c.2.txt", "> Task :build\nBUILD SUCCESSFUL in 3s\n"),
  ]
}

fn shape(clusters: &[RankedCluster]) -> Vec<(String, Vec<String>)> {
  clusters
    .iter()
    .map(|c| {
      (
        c.representative.clone(),
        c.members.iter().map(|m| m.0.clone()).collect(),
      )
    })
    .collect()
}

#[test]
fn near_identical_exceptions_cluster_together() {
  let out = Pipeline::with_defaults().run_logs(scenario()).unwrap();

  assert_eq!(out.clusters.len(), 2);
  let top = &out.clusters[0];
  assert_eq!(top.count(), 2);
  assert_eq!(
    top.representative,
    "Exception in thread \"main\" java.lang.RuntimeException: NullPointer"
  );
  assert_eq!(top.members[0].as_str(), "job-a.1.txt");
  assert_eq!(top.members[1].as_str(), "job-b.4.txt");

  let rest = &out.clusters[1];
  assert_eq!(rest.representative, "");
  assert_eq!(rest.label(), "NO EXCEPTION");
  assert_eq!(rest.members[0].as_str(), "job-c.2.txt");
}

#[test]
fn deterministic_output_across_runs() {
  let first = Pipeline::with_defaults().run_logs(scenario()).unwrap();
  let second = Pipeline::with_defaults().run_logs(scenario()).unwrap();
  assert_eq!(shape(&first.clusters), shape(&second.clusters));
  assert_eq!(first.summary, second.summary);
}

#[test]
fn input_order_changes_membership() {
  let base: String = "Error: could not resolve org.example:lib:1.0 from central"
    .chars()
    .take(50)
    .collect();
  let a = base.clone();
  let b = format!("{base}0123456789ABCDE");
  let candidate = format!("{base}01234567");

  let forward = vec![
    RawLog::new("a", a.clone()),
    RawLog::new("b", b.clone()),
    RawLog::new("p", candidate.clone()),
  ];
  let candidate_first = vec![
    RawLog::new("p", candidate),
    RawLog::new("a", a),
    RawLog::new("b", b),
  ];

  let one = Pipeline::with_defaults().run_logs(forward).unwrap();
  let two = Pipeline::with_defaults().run_logs(candidate_first).unwrap();

  // Forward: the candidate lands with `a`, `b` stays alone.
  assert_eq!(one.clusters.len(), 2);
  // Candidate first: it anchors a cluster that both `a` and `b` fall into.
  assert_eq!(two.clusters.len(), 1);
  assert_ne!(shape(&one.clusters), shape(&two.clusters));
}

#[test]
fn directory_to_report_end_to_end() {
  let root = tempfile::tempdir().unwrap();
  let logs = root.path().join("jenkins-failed");
  fs::create_dir_all(&logs).unwrap();
  fs::write(logs.join("job-a.1.txt"), gradle_log("")).unwrap();
  fs::write(logs.join("job-b.4.txt"), gradle_log(" at line 9")).unwrap();
  fs::write(logs.join("job-c.2.txt"), "BUILD SUCCESSFUL\n").unwrap();
  fs::write(logs.join("job-d.8.txt"), b"\xc3\x28").unwrap();

  let pipeline = Pipeline::with_defaults();
  let out = pipeline.run(source::read_dir_logs(&logs).unwrap()).unwrap();
  assert_eq!(out.summary.total, 4);
  assert_eq!(out.summary.skipped, 1);
  assert_eq!(out.clusters.len(), 2);

  let html = root.path().join("jenkins-failed-html");
  let summary = ReportSummary::new(&out.clusters, &out.summary, 20, 100, chrono::Utc::now());
  report::write_report(
    &out.clusters,
    &summary,
    &ReportOptions {
      out_dir: html.clone(),
      log_link_prefix: "../jenkins-failed".into(),
    },
  )
  .unwrap();

  let index = fs::read_to_string(html.join("index.html")).unwrap();
  assert!(index.contains("NullPointer</a></td><td>2</td>"));
  assert!(index.contains("NO EXCEPTION</a></td><td>1</td>"));
  let detail = fs::read_to_string(html.join("0.html")).unwrap();
  assert!(detail.contains("href=\"../jenkins-failed/job-a.1.txt\""));
  assert!(detail.contains("href=\"../jenkins-failed/job-b.4.txt\""));
}
