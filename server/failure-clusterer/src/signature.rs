//! Signature extraction: reduce a raw log to the lines that say why it failed.
//!
//! Lines are kept when any configured predicate matches; kept lines are joined
//! with `\n` in their original order. A log with no matching line yields the
//! empty signature.

use serde::{Deserialize, Serialize};

/// How a single line is tested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
  Contains(String),
  StartsWith(String),
}

impl MatchRule {
  pub fn matches(&self, line: &str) -> bool {
    match self {
      Self::Contains(needle) => line.contains(needle.as_str()),
      Self::StartsWith(prefix) => line.starts_with(prefix.as_str()),
    }
  }

  pub fn pattern(&self) -> &str {
    match self {
      Self::Contains(s) | Self::StartsWith(s) => s,
    }
  }
}

/// A named line-selection rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinePredicate {
  pub description: String,
  pub rule: MatchRule,
}

impl LinePredicate {
  pub fn contains(description: &str, needle: &str) -> Self {
    Self {
      description: description.to_string(),
      rule: MatchRule::Contains(needle.to_string()),
    }
  }

  pub fn starts_with(description: &str, prefix: &str) -> Self {
    Self {
      description: description.to_string(),
      rule: MatchRule::StartsWith(prefix.to_string()),
    }
  }

  pub fn matches(&self, line: &str) -> bool {
    self.rule.matches(line)
  }
}

/// Predicates tuned for Gradle/Maven builds on Jenkins.
pub fn default_predicates() -> Vec<LinePredicate> {
  vec![
    LinePredicate::contains("java exception message", "Exception:"),
    LinePredicate::contains("error message", "Error:"),
    LinePredicate::contains("error log level", "ERROR"),
    LinePredicate::contains("gradle exception banner", "An exception occurred"),
    LinePredicate::starts_with("unknown gradle extension", "Extension with name"),
    LinePredicate::starts_with(
      "mavenLocal() outside repositories block",
      "Could not find method mavenLocal()",
    ),
    LinePredicate::contains(
      "unresolvable jackson jsr310 RELEASE",
      "Could not find com.fasterxml.jackson.datatype:jackson-datatype-jsr310:RELEASE",
    ),
    LinePredicate::contains(
      "dependency resolution failure",
      "Could not resolve all files for configuration",
    ),
    LinePredicate::contains(
      "versionless publication",
      "Publication only contains dependencies and/or constraints without a version",
    ),
    LinePredicate::contains(
      "pluginManagement() outside settings",
      "Could not find method pluginManagement()",
    ),
    LinePredicate::contains(
      "configureEach on realizable task collection",
      "No signature of method: org.gradle.api.internal.tasks.RealizableTaskCollection.configureEach() is applicable for argument types",
    ),
    LinePredicate::contains(
      "ambiguous multi-publication project dependency",
      "Publishing is not able to resolve a dependency on a project with multiple publications that have different coordinates.",
    ),
    LinePredicate::starts_with("stack frame", "\tat"),
  ]
}

/// Extract a signature from already-split lines.
pub fn extract<'a, I>(lines: I, predicates: &[LinePredicate]) -> String
where
  I: IntoIterator<Item = &'a str>,
{
  let kept: Vec<&str> = lines
    .into_iter()
    .filter(|line| predicates.iter().any(|p| p.matches(line)))
    .collect();
  kept.join("\n")
}

/// Split on `\n`, `\r\n` or a lone `\r`; a trailing terminator adds no line.
///
/// Console logs use bare `\r` for progress output, so `str::lines` is not
/// enough.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
  let mut rest = text;
  std::iter::from_fn(move || {
    if rest.is_empty() {
      return None;
    }
    match rest.find(['\r', '\n']) {
      Some(i) => {
        let line = &rest[..i];
        let terminator = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[i + terminator..];
        Some(line)
      }
      None => {
        let line = rest;
        rest = "";
        Some(line)
      }
    }
  })
}

/// Extract a signature from a whole log blob.
pub fn extract_text(text: &str, predicates: &[LinePredicate]) -> String {
  extract(split_lines(text), predicates)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keeps_matching_lines_in_order() {
    let log = "\
> Task :compileJava
FAILURE: Build failed with an exception.
java.lang.IllegalStateException: no toolchain
\tat org.gradle.Foo.bar(Foo.java:10)
BUILD FAILED in 3s
[ERROR] something else";
    let sig = extract_text(log, &default_predicates());
    assert_eq!(
      sig,
      "java.lang.IllegalStateException: no toolchain\n\tat org.gradle.Foo.bar(Foo.java:10)\n[ERROR] something else"
    );
  }

  #[test]
  fn no_match_yields_empty_signature() {
    let sig = extract_text("BUILD SUCCESSFUL\nTotal time: 2s", &default_predicates());
    assert_eq!(sig, "");
  }

  #[test]
  fn empty_input_yields_empty_signature() {
    assert_eq!(extract(std::iter::empty(), &default_predicates()), "");
    assert_eq!(extract_text("", &default_predicates()), "");
  }

  #[test]
  fn crlf_lines_are_split_cleanly() {
    let sig = extract_text("ok\r\nError: disk full\r\nok", &default_predicates());
    assert_eq!(sig, "Error: disk full");
  }

  #[test]
  fn bare_carriage_return_ends_a_line() {
    let log = "Download 40%\r\tat Foo.bar(Foo.java:3)\rDownload 80%\nError: late";
    let sig = extract_text(log, &default_predicates());
    assert_eq!(sig, "\tat Foo.bar(Foo.java:3)\nError: late");
  }

  #[test]
  fn split_lines_handles_every_terminator() {
    let lines: Vec<&str> = split_lines("a\r\nb\rc\n\nd\r").collect();
    assert_eq!(lines, vec!["a", "b", "c", "", "d"]);
    assert_eq!(split_lines("").count(), 0);
    assert_eq!(split_lines("\n").collect::<Vec<_>>(), vec![""]);
  }

  #[test]
  fn starts_with_rules_are_anchored() {
    let preds = default_predicates();
    assert_eq!(extract_text("  Extension with name 'x'", &preds), "");
    assert_eq!(
      extract_text("Extension with name 'x' does not exist.", &preds),
      "Extension with name 'x' does not exist."
    );
    // Space-indented frames are not stack continuation lines.
    assert_eq!(extract_text("    at Foo.bar", &preds), "");
  }

  #[test]
  fn predicate_order_does_not_affect_selection() {
    let log = "a\nError: one\n\tat X\nb\nsome Exception: two";
    let forward = default_predicates();
    let mut reversed = default_predicates();
    reversed.reverse();
    assert_eq!(extract_text(log, &forward), extract_text(log, &reversed));
  }

  #[test]
  fn extraction_is_idempotent() {
    let preds = default_predicates();
    let once = extract_text("x\nError: a\n\tat b\ny", &preds);
    assert_eq!(extract_text(&once, &preds), once);
  }

  #[test]
  fn rules_deserialize_from_snake_case_tags() {
    let p: LinePredicate = serde_json::from_str(
      r#"{"description": "npm", "rule": {"starts_with": "npm ERR!"}}"#,
    )
    .unwrap();
    assert_eq!(p.rule, MatchRule::StartsWith("npm ERR!".into()));
    assert!(p.matches("npm ERR! code E404"));
    assert!(!p.matches("info npm ERR!"));
  }
}
