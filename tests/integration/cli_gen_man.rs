use predicates::prelude::*;

#[test]
fn man_page_documents_both_actions() {
  test_support::cmd_bin("release-actions")
    .arg("--gen-man")
    .assert()
    .success()
    .stdout(predicate::str::contains(".TH"))
    .stdout(predicate::str::contains("release\\-actions").or(predicate::str::contains("release-actions")))
    .stdout(predicate::str::contains("audit\\-changes").or(predicate::str::contains("audit-changes")))
    .stdout(predicate::str::contains("cleanup\\-stale\\-branches").or(predicate::str::contains("cleanup-stale-branches")));
}

#[test]
fn missing_action_is_a_usage_error() {
  test_support::cmd_bin("release-actions")
    .assert()
    .failure()
    .stderr(predicate::str::contains("audit-changes | cleanup-stale-branches"));
}
