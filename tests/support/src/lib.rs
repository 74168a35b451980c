//! test-support: helpers for robust, nextest-friendly tests.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support" }
//! ```
//!
//! Then in tests:
//! ```rust,no_run
//! use test_support::{init_fixture_repo, rev_parse};
//!
//! let repo = init_fixture_repo();
//! let head = rev_parse(repo.path(), "HEAD");
//! assert_eq!(head.len(), 40);
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::env;
use std::path::Path;
use std::process::Command;

/// Subjects of the fixture history, oldest first. Index 0 is the root commit.
pub const FIXTURE_COMMITS: [&str; 4] = [
  "chore: initial commit",
  "feat: add widget model",
  "fix: handle empty widget names",
  "docs: describe widget cache",
];

/// Tag placed on `FIXTURE_COMMITS[2]`.
pub const FIXTURE_TAG: &str = "v0.1.0";

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
  static INIT: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env()
      .or_else(|_| EnvFilter::try_new("warn,test=info"))
      .unwrap();
    // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
  });
  Lazy::force(&INIT);
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
  tempfile::tempdir().expect("create tempdir")
}

/// Set multiple environment variables for the duration of the returned guard.
pub fn with_env(vars: &[(&str, &str)]) -> EnvGuard {
  EnvGuard::set_many(vars)
}

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
///
/// Runner variables that leak in from a real workflow run are cleared so tests
/// only see what they set.
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
  init_tracing();
  let mut cmd = assert_cmd::Command::cargo_bin(bin).expect("binary target not found");

  for (key, _) in env::vars() {
    if key.starts_with("INPUT_") || key.starts_with("GITHUB_") || key.starts_with("RA_TEST_") || key == "GH_TOKEN" {
      cmd.env_remove(&key);
    }
  }
  // Action logs are asserted on, so the binary's default filter applies.
  cmd.env_remove("RUST_LOG");

  cmd
}

/// Guard for temporarily setting environment variables.
pub struct EnvGuard {
  prev: Vec<(String, Option<String>)>,
}

impl EnvGuard {
  pub fn set_many(kv: &[(&str, &str)]) -> Self {
    let mut prev = Vec::with_capacity(kv.len());
    for (k, v) in kv {
      prev.push((k.to_string(), env::var(k).ok()));
      env::set_var(k, v);
    }
    Self { prev }
  }
}

impl Drop for EnvGuard {
  fn drop(&mut self) {
    for (k, old) in self.prev.drain(..) {
      match old {
        Some(v) => env::set_var(&k, v),
        None => env::remove_var(&k),
      }
    }
  }
}

pub fn run(repo: &Path, args: &[&str]) {
  let status = Command::new("git").args(args).current_dir(repo).status().unwrap();
  assert!(status.success(), "git {:?} failed", args);
}

/// Full sha of `rev` in `repo`.
pub fn rev_parse(repo: &Path, rev: &str) -> String {
  let out = Command::new("git").args(["rev-parse", rev]).current_dir(repo).output().unwrap();
  assert!(out.status.success(), "git rev-parse {} failed", rev);
  String::from_utf8_lossy(&out.stdout).trim().to_string()
}

fn commit_at(repo: &Path, message: &str, date: &str) {
  let status = Command::new("git")
    .args(["commit", "-q", "-m", message])
    .current_dir(repo)
    .env("GIT_AUTHOR_DATE", date)
    .env("GIT_COMMITTER_DATE", date)
    .status()
    .unwrap();

  assert!(status.success(), "git commit {:?} failed", message);
}

/// Linear history on `main` with one commit per `FIXTURE_COMMITS` entry.
pub fn init_fixture_repo() -> tempfile::TempDir {
  let dir = tempdir();
  let path = dir.path();

  run(path, &["init", "-q", "-b", "main"]);
  run(path, &["config", "user.name", "Fixture Bot"]);
  run(path, &["config", "user.email", "fixture@example.com"]);
  run(path, &["config", "commit.gpgsign", "false"]);
  run(path, &["config", "tag.gpgsign", "false"]);

  for (i, message) in FIXTURE_COMMITS.iter().enumerate() {
    std::fs::write(path.join(format!("change-{}.txt", i)), format!("{}\n", message)).unwrap();
    run(path, &["add", "."]);
    commit_at(path, message, &format!("2025-08-1{}T09:00:00+00:00", i + 1));

    if i == 2 {
      run(path, &["tag", FIXTURE_TAG]);
    }
  }

  dir
}
