use serde_json::json;
use test_support::{cmd_bin, init_fixture_repo, rev_parse, tempdir};

struct Run {
  code: i32,
  stdout: String,
  summary: String,
  output: String,
}

fn run_audit(workspace: &std::path::Path, env: &[(&str, String)]) -> Run {
  let files = tempdir();
  let summary_path = files.path().join("summary.md");
  let output_path = files.path().join("output.txt");

  let mut cmd = cmd_bin("release-actions");
  cmd
    .args(["audit-changes", "--now-override", "2025-09-01T00:00:00"])
    .env("GITHUB_REPOSITORY", "acme/widgets")
    .env("GITHUB_WORKSPACE", workspace)
    .env("GITHUB_STEP_SUMMARY", &summary_path)
    .env("GITHUB_OUTPUT", &output_path);

  for (k, v) in env {
    cmd.env(k, v);
  }

  let out = cmd.output().unwrap();

  Run {
    code: out.status.code().unwrap_or(-1),
    stdout: String::from_utf8_lossy(&out.stdout).to_string(),
    summary: std::fs::read_to_string(&summary_path).unwrap_or_default(),
    output: std::fs::read_to_string(&output_path).unwrap_or_default(),
  }
}

#[test]
fn audits_changes_between_published_releases() {
  let repo = init_fixture_repo();
  let c1 = rev_parse(repo.path(), "HEAD~2");
  let tagged = rev_parse(repo.path(), test_support::FIXTURE_TAG);
  let c2 = rev_parse(repo.path(), "HEAD~1");
  let c3 = rev_parse(repo.path(), "HEAD");
  assert_eq!(tagged, c2);

  let releases = json!([
    {"tag_name": "v0.0.1", "target_commitish": c1, "published_at": "2025-08-12T10:00:00Z"},
    {"tag_name": "v0.1.0", "target_commitish": c2, "published_at": "2025-08-13T10:00:00Z"},
    {"tag_name": "v0.2.0", "target_commitish": c3, "published_at": "2025-08-14T10:00:00Z"},
  ]);
  let commit_pulls = json!({
    c3.clone(): [
      {"number": 6, "state": "open", "title": "Docs draft", "html_url": "https://github.com/acme/widgets/pull/6"},
      {
        "number": 5,
        "state": "closed",
        "title": "Describe widget cache",
        "body": "Fixes AB#101",
        "html_url": "https://github.com/acme/widgets/pull/5",
        "user": {"login": "dev"}
      }
    ],
  });
  let reviews = json!({"5": [{"state": "APPROVED", "user": {"login": "rev"}}]});
  let work_items = json!({"101": {"fields": {"System.State": "Resolved"}}});

  let run = run_audit(
    repo.path(),
    &[
      ("GITHUB_SHA", c3.clone()),
      ("INPUT_GITHUB-TOKEN", "token".into()),
      ("INPUT_RELEASE-TAG", "v0.2.0".into()),
      ("INPUT_ADD-RELEASE-NOTES-LINK", "true".into()),
      ("INPUT_ADO-ORGANIZATION-URL", "https://dev.azure.com/acme/".into()),
      ("RA_TEST_RELEASES_JSON", releases.to_string()),
      ("RA_TEST_COMMIT_PULLS_JSON", commit_pulls.to_string()),
      ("RA_TEST_REVIEWS_JSON", reviews.to_string()),
      ("RA_TEST_WORK_ITEMS_JSON", work_items.to_string()),
    ],
  );

  assert_eq!(run.code, 0, "stdout: {}", run.stdout);
  assert!(run.summary.contains("Compare Changes (1 total)"), "{}", run.summary);
  assert!(run.summary.contains("https://github.com/acme/widgets/compare/v0.1.0...v0.2.0"));
  assert!(run.summary.contains("https://github.com/acme/widgets/releases/tag/v0.2.0"));
  assert!(run.summary.contains("Released On: 2025-09-01"));
  assert!(run.summary.contains("AB#101"));
  assert!(run.summary.contains("Resolved"));
  assert!(run.summary.contains("#5 - Describe widget cache"));
  assert!(run.summary.contains("rev"));
  assert!(!run.summary.contains("#6 - "));

  assert!(run.output.starts_with("change-notes<<ghadelimiter_"), "{}", run.output);
  assert!(run.output.contains("Compare Changes (1 total)"));
}

#[test]
fn missing_token_ends_the_action_without_failing() {
  let repo = init_fixture_repo();

  let run = run_audit(repo.path(), &[("INPUT_RELEASE-TAG", "v0.2.0".into())]);

  assert_eq!(run.code, 0);
  assert!(run.stdout.contains("::error::GitHub token is required"), "{}", run.stdout);
  assert!(run.summary.is_empty());
  // The declared output is still published, empty.
  assert!(run.output.starts_with("change-notes<<ghadelimiter_"));
}

#[test]
fn unreadable_workspace_fails_but_still_publishes_outputs() {
  let not_a_repo = tempdir();

  let run = run_audit(
    not_a_repo.path(),
    &[("INPUT_GITHUB-TOKEN", "token".into()), ("RA_TEST_RELEASES_JSON", "[]".into())],
  );

  assert_eq!(run.code, 1);
  assert!(run.stdout.contains("::error::audit-changes failed"), "{}", run.stdout);
  assert!(run.output.starts_with("change-notes<<ghadelimiter_"));
}

#[test]
fn malformed_repository_ends_the_action_with_empty_outputs() {
  let repo = init_fixture_repo();

  let run = run_audit(
    repo.path(),
    &[("GITHUB_REPOSITORY", "widgets".into()), ("INPUT_GITHUB-TOKEN", "token".into())],
  );

  assert_eq!(run.code, 0);
  assert!(run.stdout.contains("::error::GITHUB_REPOSITORY must look like owner/name"), "{}", run.stdout);
  assert!(run.summary.is_empty());
  assert!(run.output.starts_with("change-notes<<ghadelimiter_"), "{}", run.output);
}
