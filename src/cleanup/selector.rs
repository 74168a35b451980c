// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Decide which branches are stale and safe to delete
// role: cleanup/selection
// inputs: Branches, allow/ignore patterns, default branch, open pull requests, age cutoff, commit-date lookup
// outputs: Verdict per branch; selected branches in listing order
// invariants:
// - The default branch and head/base refs of open pull requests are never selected
// - A branch is stale only when its commit date is strictly before the cutoff; unknown dates are never stale
// - The commit-date lookup runs only for branches that pass every other check
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use tracing::info;

use crate::model::{Branch, PullRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
  Delete,
  DefaultBranch,
  Ignored,
  OpenPullRequestHead,
  OpenPullRequestBase,
  TooRecent { cutoff: DateTime<Utc> },
  UnknownCommitDate,
}

impl fmt::Display for Verdict {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Verdict::Delete => write!(f, "meets the criteria for deletion"),
      Verdict::DefaultBranch => write!(f, "it is the default branch"),
      Verdict::Ignored => write!(f, "it is in the ignore list"),
      Verdict::OpenPullRequestHead => write!(f, "it has open pull requests"),
      Verdict::OpenPullRequestBase => write!(f, "it is the base for a pull request of another branch"),
      Verdict::TooRecent { cutoff } => write!(f, "last commit is newer than {}", cutoff.to_rfc3339()),
      Verdict::UnknownCommitDate => write!(f, "its last commit date could not be determined"),
    }
  }
}

pub struct SelectionRules<'a> {
  pub default_branch: &'a str,
  pub ignore: Option<&'a Regex>,
  pub open_pulls: &'a [PullRequest],
  pub cutoff: DateTime<Utc>,
}

/// `now - days`.
/// `now - days`; an age reaching past the earliest representable instant keeps every branch.
pub fn cutoff(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
  now.checked_sub_signed(Duration::days(i64::from(days))).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Branches whose name matches the allow pattern.
pub fn filter_allowed(branches: Vec<Branch>, allowed: &Regex) -> Vec<Branch> {
  branches.into_iter().filter(|b| allowed.is_match(&b.name)).collect()
}

pub fn evaluate<F>(branch: &Branch, rules: &SelectionRules, commit_date: F) -> Verdict
where
  F: Fn(&str) -> Option<DateTime<Utc>>,
{
  let name = branch.name.as_str();

  if name == rules.default_branch {
    return Verdict::DefaultBranch;
  }

  if rules.ignore.is_some_and(|re| re.is_match(name)) {
    return Verdict::Ignored;
  }

  if rules.open_pulls.iter().any(|pr| pr.head_ref() == Some(name)) {
    return Verdict::OpenPullRequestHead;
  }

  if rules.open_pulls.iter().any(|pr| pr.base_ref() == Some(name)) {
    return Verdict::OpenPullRequestBase;
  }

  match commit_date(&branch.commit.sha) {
    Some(date) if date < rules.cutoff => Verdict::Delete,
    Some(_) => Verdict::TooRecent { cutoff: rules.cutoff },
    None => Verdict::UnknownCommitDate,
  }
}

/// Branches selected for deletion, with each decision logged.
pub fn select<F>(branches: &[Branch], rules: &SelectionRules, commit_date: F) -> Vec<Branch>
where
  F: Fn(&str) -> Option<DateTime<Utc>>,
{
  let mut out = Vec::new();

  for branch in branches {
    match evaluate(branch, rules, &commit_date) {
      Verdict::Delete => {
        info!("Branch {} meets the criteria for deletion", branch.name);
        out.push(branch.clone());
      }
      other => info!("Ignoring {} because {}", branch.name, other),
    }
  }

  out
}
