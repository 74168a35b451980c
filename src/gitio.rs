// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Source-control gateway over the git CLI: commit windows, one tag index per window, initial commit, shallow handling
// role: gateway/source-control
// inputs: repository path, boundary refs
// outputs: Commit values (oldest first), shas, booleans
// side_effects: Spawns git; unshallow performs a fetch
// invariants:
// - list_commits is the half-open window (from, to]; blank boundaries yield an empty list
// - Failures below the window query are logged and degrade to empty/None
// errors: Only open() fails (not a git repository); everything else is best-effort
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::model::{Commit, Person};
use crate::util::run_git;

const LOG_FORMAT: &str = "%H%x00%an%x00%ae%x00%ad%x00%cn%x00%ce%x00%cd%x00%s%x1e";
const TAG_FORMAT: &str = "%(objectname) %(*objectname) %(refname:short)";

pub trait SourceControl: Sync {
  /// Commits in `(from, to]`, oldest first.
  fn list_commits(&self, from: &str, to: &str) -> Vec<Commit>;
  fn initial_commit_sha(&self) -> Option<String>;
}

pub struct GitCli {
  repo: String,
}

impl GitCli {
  /// Opens the checkout at `repo`, deepening it first when it is shallow.
  pub fn open(repo: &str) -> Result<Self> {
    run_git(repo, &["rev-parse".into(), "--is-inside-work-tree".into()])
      .with_context(|| format!("Not a git repository: {}", repo))?;

    let git = Self { repo: repo.to_string() };
    git.unshallow_if_needed();

    Ok(git)
  }

  pub fn is_shallow(&self) -> Result<bool> {
    let out = run_git(&self.repo, &["rev-parse".into(), "--is-shallow-repository".into()])?;
    Ok(out.trim() == "true")
  }

  pub fn unshallow(&self) -> Result<()> {
    run_git(&self.repo, &["fetch".into(), "--unshallow".into()])?;
    Ok(())
  }

  fn unshallow_if_needed(&self) {
    match self.is_shallow() {
      Ok(true) => match self.unshallow() {
        Ok(()) => info!("Successfully performed unshallow fetch"),
        Err(e) => error!("Failed to perform unshallow fetch: {:#}", e),
      },
      Ok(false) => {}
      Err(e) => error!("Failed to check for a shallow repository: {:#}", e),
    }
  }

  /// Tag names keyed by the commit they point at, annotated tags peeled.
  pub fn tag_index(&self) -> HashMap<String, String> {
    match run_git(&self.repo, &["for-each-ref".into(), format!("--format={}", TAG_FORMAT), "refs/tags".into()]) {
      Ok(out) => parse_tag_index(&out),
      Err(e) => {
        warn!("Failed to list tags: {:#}", e);
        HashMap::new()
      }
    }
  }
}

impl SourceControl for GitCli {
  fn list_commits(&self, from: &str, to: &str) -> Vec<Commit> {
    if from.trim().is_empty() || to.trim().is_empty() {
      error!("Both fromCommit and toCommit must be provided");
      return Vec::new();
    }

    let args: Vec<String> = vec![
      "-c".into(),
      "log.showSignature=false".into(),
      "log".into(),
      "--reverse".into(),
      "--date=iso-strict".into(),
      format!("--pretty=format:{}", LOG_FORMAT),
      format!("{}..{}", from, to),
    ];

    let out = match run_git(&self.repo, &args) {
      Ok(o) => o,
      Err(e) => {
        error!("Failed to get commits within range {}..{}: {:#}", from, to, e);
        return Vec::new();
      }
    };

    let tags = self.tag_index();

    parse_log(&out)
      .into_iter()
      .map(|mut c| {
        c.tag = tags.get(&c.sha).cloned();
        c
      })
      .collect()
  }

  fn initial_commit_sha(&self) -> Option<String> {
    match run_git(&self.repo, &["rev-list".into(), "--max-parents=0".into(), "HEAD".into()]) {
      // A history with several roots lists one per line; the first is the oldest reachable root.
      Ok(out) => out.lines().map(str::trim).find(|l| !l.is_empty()).map(String::from),
      Err(e) => {
        warn!("Failed to get initial commit SHA: {:#}", e);
        None
      }
    }
  }
}

/// Parses `TAG_FORMAT` lines; several tags on one commit are joined with ", " in ref order.
pub fn parse_tag_index(out: &str) -> HashMap<String, String> {
  let mut index: HashMap<String, String> = HashMap::new();

  for line in out.lines() {
    let mut parts = line.splitn(3, ' ');
    let (Some(object), Some(peeled), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
      continue;
    };
    let name = name.trim();
    if name.is_empty() {
      continue;
    }

    let sha = if peeled.is_empty() { object } else { peeled };
    index
      .entry(sha.to_string())
      .and_modify(|names| {
        names.push_str(", ");
        names.push_str(name);
      })
      .or_insert_with(|| name.to_string());
  }

  index
}

/// Parses records produced with `LOG_FORMAT` (NUL-separated fields, RS-terminated records).
pub fn parse_log(out: &str) -> Vec<Commit> {
  out
    .split('\u{1e}')
    .map(|rec| rec.trim_start_matches(|c| c == '\n' || c == '\r'))
    .filter(|rec| !rec.trim().is_empty())
    .map(|rec| {
      let parts: Vec<&str> = rec.split('\u{0}').collect();
      let get = |i: usize| -> String { parts.get(i).unwrap_or(&"").to_string() };

      Commit {
        sha: get(0),
        author: Person { name: get(1), email: get(2), date: get(3) },
        committer: Person { name: get(4), email: get(5), date: get(6) },
        message: get(7),
        tag: None,
      }
    })
    .collect()
}
