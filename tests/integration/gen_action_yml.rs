use predicates::prelude::*;

#[test]
fn writes_action_manifests_without_running_actions() {
  let out_dir = test_support::tempdir();

  test_support::cmd_bin("release-actions")
    .arg("--gen-action-yml")
    .arg(out_dir.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("action.yml"));

  let audit = std::fs::read_to_string(out_dir.path().join("audit-changes").join("action.yml")).unwrap();
  assert!(audit.contains("name: audit-changes"));
  assert!(audit.contains("release-tag:"));
  assert!(audit.contains("ado-organization-url:"));
  assert!(audit.contains("change-notes:"));
  assert!(audit.contains("../../../Dockerfile"));

  let cleanup = std::fs::read_to_string(out_dir.path().join("cleanup-stale-branches").join("action.yml")).unwrap();
  assert!(cleanup.contains("last-commit-age-days:"));
  assert!(cleanup.contains("deletable-branches:"));
  assert!(!cleanup.contains("release-tag:"));
}
