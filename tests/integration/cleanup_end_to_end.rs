use serde_json::json;
use test_support::{cmd_bin, tempdir};

fn branch(name: &str, sha: &str) -> serde_json::Value {
  json!({"name": name, "commit": {"sha": sha}})
}

fn commit(date: &str) -> serde_json::Value {
  json!({"commit": {"committer": {"date": date}}})
}

fn fixtures() -> Vec<(&'static str, String)> {
  let branches = json!([
    branch("main", "s-main"),
    branch("feature/old", "s-old"),
    branch("feature/locked", "s-locked"),
    branch("feature/fresh", "s-fresh"),
    branch("feature/in-review", "s-review"),
    branch("feature/keep-me", "s-keep"),
    branch("chore/old", "s-chore"),
  ]);
  let open_pulls = json!([
    {"number": 9, "state": "open", "head": {"ref": "feature/in-review"}, "base": {"ref": "main"}},
  ]);
  let commits = json!({
    "s-main": commit("2020-01-01T00:00:00Z"),
    "s-old": commit("2024-01-01T00:00:00Z"),
    "s-locked": commit("2024-02-01T00:00:00Z"),
    "s-fresh": commit("2024-05-25T00:00:00Z"),
    "s-review": commit("2023-01-01T00:00:00Z"),
    "s-keep": commit("2023-01-01T00:00:00Z"),
    "s-chore": commit("2023-01-01T00:00:00Z"),
  });

  vec![
    ("GITHUB_REPOSITORY", "acme/widgets".into()),
    ("INPUT_GITHUB-TOKEN", "token".into()),
    ("INPUT_ALLOWED-BRANCHES-PATTERN", "^feature/".into()),
    ("INPUT_IGNORE-BRANCHES-PATTERN", "keep".into()),
    ("INPUT_LAST-COMMIT-AGE-DAYS", "30".into()),
    ("RA_TEST_REPOSITORY_JSON", json!({"default_branch": "main"}).to_string()),
    ("RA_TEST_BRANCHES_JSON", branches.to_string()),
    ("RA_TEST_OPEN_PULLS_JSON", open_pulls.to_string()),
    ("RA_TEST_COMMITS_JSON", commits.to_string()),
    ("RA_TEST_DELETE_FAILURES_JSON", json!(["heads/feature/locked"]).to_string()),
  ]
}

fn run_cleanup(extra: &[(&str, &str)]) -> (i32, String, String) {
  let files = tempdir();
  let output_path = files.path().join("output.txt");

  let mut cmd = cmd_bin("release-actions");
  cmd.args(["cleanup-stale-branches", "--now-override", "2024-06-01T00:00:00"]).env("GITHUB_OUTPUT", &output_path);

  for (k, v) in fixtures() {
    cmd.env(k, v);
  }
  for (k, v) in extra {
    cmd.env(k, v);
  }

  let out = cmd.output().unwrap();
  (
    out.status.code().unwrap_or(-1),
    String::from_utf8_lossy(&out.stdout).to_string(),
    std::fs::read_to_string(&output_path).unwrap_or_default(),
  )
}

#[test]
fn deletes_stale_branches_and_reports_failures() {
  let (code, stdout, output) = run_cleanup(&[]);

  assert_eq!(code, 0, "{}", stdout);
  assert!(output.starts_with("deletable-branches<<ghadelimiter_"), "{}", output);
  assert!(output.contains("\nfeature/old,feature/locked\nghadelimiter_"), "{}", output);

  assert!(stdout.contains("Ignoring feature/keep-me because it is in the ignore list"), "{}", stdout);
  assert!(stdout.contains("Ignoring feature/in-review because it has open pull requests"));
  assert!(stdout.contains("Ignoring feature/fresh because last commit is newer than"));
  assert!(stdout.contains("Deleted branch feature/old"));
  assert!(stdout.contains("::warning::Failed to delete branch feature/locked"));
  assert!(!stdout.contains("chore/old"));
}

#[test]
fn dry_run_lists_branches_without_deleting() {
  let (code, stdout, output) = run_cleanup(&[("INPUT_DRY-RUN", "true")]);

  assert_eq!(code, 0);
  assert!(stdout.contains("Dry run is enabled, no branches will be deleted."), "{}", stdout);
  assert!(!stdout.contains("Deleted branch"));
  assert!(!stdout.contains("Failed to delete"));
  assert!(output.contains("\nfeature/old,feature/locked\nghadelimiter_"));
}

#[test]
fn invalid_pattern_is_reported_without_failing_the_job() {
  let (code, stdout, output) = run_cleanup(&[("INPUT_ALLOWED-BRANCHES-PATTERN", "feature/(")]);

  assert_eq!(code, 0);
  assert!(stdout.contains("::error::Invalid allowed-branches-pattern"), "{}", stdout);
  // Nothing was selected, so the output is published empty.
  assert!(output.starts_with("deletable-branches<<ghadelimiter_"));
  assert!(!output.contains("feature/old"));
}

#[test]
fn age_beyond_the_calendar_selects_nothing() {
  let (code, stdout, output) = run_cleanup(&[("INPUT_LAST-COMMIT-AGE-DAYS", "100000000")]);

  assert_eq!(code, 0, "{}", stdout);
  assert!(stdout.contains("Ignoring feature/old because last commit is newer than"), "{}", stdout);
  assert!(!stdout.contains("Deleted branch"));
  assert!(output.contains("deletable-branches<<ghadelimiter_"));
  assert!(!output.contains("feature/old"));
}

#[test]
fn malformed_repository_still_publishes_outputs() {
  let (code, stdout, output) = run_cleanup(&[("GITHUB_REPOSITORY", "widgets")]);

  assert_eq!(code, 0, "{}", stdout);
  assert!(stdout.contains("::error::GITHUB_REPOSITORY must look like owner/name"), "{}", stdout);
  assert!(output.starts_with("deletable-branches<<ghadelimiter_"), "{}", output);
  assert!(!stdout.contains("Deleted branch"));
}
