// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the typed model (commits, pull requests, releases, branches, work items) shared by gateways, aggregation and rendering
// role: model/types
// outputs: Deserializable forge payload types and derived audit records
// invariants: Optional forge fields default instead of failing; actor display precedence is name > email > login
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Person {
  pub name: String,
  pub email: String,
  pub date: String,
}

/// A commit in the audited window, as read from `git log`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Commit {
  pub sha: String,
  pub author: Person,
  pub committer: Person,
  /// Subject line.
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tag: Option<String>,
}

/// A forge user. Every field is optional because each endpoint fills a different subset.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Actor {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub login: Option<String>,
  #[serde(default)]
  pub html_url: Option<String>,
}

impl Actor {
  /// First non-empty of name, email, login.
  pub fn display_name(&self) -> Option<&str> {
    [&self.name, &self.email, &self.login]
      .into_iter()
      .filter_map(|v| v.as_deref())
      .map(str::trim)
      .find(|v| !v.is_empty())
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
  Open,
  Closed,
  #[serde(other)]
  Unknown,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GitRef {
  #[serde(rename = "ref")]
  pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PullRequest {
  pub number: u64,
  pub state: PullRequestState,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub body: Option<String>,
  #[serde(default)]
  pub html_url: String,
  #[serde(default, rename = "user")]
  pub author: Option<Actor>,
  #[serde(default)]
  pub head: Option<GitRef>,
  #[serde(default)]
  pub base: Option<GitRef>,
  /// Filled from the reviews endpoint; never part of the pull request payload.
  #[serde(default, skip_deserializing)]
  pub approvers: Vec<Actor>,
}

impl PullRequest {
  pub fn is_closed(&self) -> bool {
    self.state == PullRequestState::Closed
  }

  pub fn head_ref(&self) -> Option<&str> {
    self.head.as_ref().map(|r| r.name.as_str())
  }

  pub fn base_ref(&self) -> Option<&str> {
    self.base.as_ref().map(|r| r.name.as_str())
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Review {
  #[serde(default)]
  pub state: String,
  #[serde(default)]
  pub user: Option<Actor>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Release {
  pub tag_name: String,
  #[serde(default)]
  pub target_commitish: String,
  #[serde(default)]
  pub published_at: Option<String>,
  #[serde(default)]
  pub draft: bool,
  #[serde(default)]
  pub prerelease: bool,
  #[serde(default)]
  pub html_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BranchCommit {
  pub sha: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Branch {
  pub name: String,
  pub commit: BranchCommit,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Repository {
  pub default_branch: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Signature {
  #[serde(default)]
  pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct CommitPayload {
  #[serde(default)]
  pub committer: Option<Signature>,
}

/// `GET /repos/{owner}/{repo}/commits/{ref}`, reduced to what branch selection reads.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CommitDetail {
  #[serde(default)]
  pub sha: String,
  #[serde(default)]
  pub commit: CommitPayload,
}

impl CommitDetail {
  pub fn committer_date(&self) -> Option<&str> {
    self.commit.committer.as_ref().and_then(|c| c.date.as_deref())
  }
}

/// One `AB#<id>` reference found in a pull request body.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WorkItemRef {
  /// Normalized key, e.g. "AB#123".
  pub external_id: String,
  pub numeric_id: u64,
  pub link: String,
}

/// One commit of the window with the pull request chosen to represent it.
#[derive(Debug, Clone)]
pub struct ChangeRecord {
  pub commit: Commit,
  pub primary_pull_request: Option<PullRequest>,
  pub committer_display: String,
  pub formatted_date: String,
}

/// Everything known about one work item across the whole window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItemAggregate {
  pub reference: WorkItemRef,
  pub state: String,
  pub contributors: Vec<Actor>,
  pub approvers: Vec<Actor>,
  pub pull_request_numbers: Vec<u64>,
  pub pull_request_links: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn display_name_precedence() {
    let mut a = Actor { login: Some("octo".into()), ..Default::default() };
    assert_eq!(a.display_name(), Some("octo"));
    a.email = Some("octo@example.com".into());
    assert_eq!(a.display_name(), Some("octo@example.com"));
    a.name = Some("Octo Cat".into());
    assert_eq!(a.display_name(), Some("Octo Cat"));
  }

  #[test]
  fn display_name_skips_empty_values() {
    let a = Actor { name: Some("".into()), email: Some("  ".into()), login: Some("octo".into()), html_url: None };
    assert_eq!(a.display_name(), Some("octo"));
    assert_eq!(Actor::default().display_name(), None);
  }

  #[test]
  fn pull_request_deserializes_from_forge_payload() {
    let v = serde_json::json!({
      "number": 7,
      "state": "closed",
      "title": "Add widget",
      "body": null,
      "html_url": "https://github.com/acme/widgets/pull/7",
      "user": {"login": "octo", "html_url": "https://github.com/octo"},
      "head": {"ref": "feature/widget"},
      "base": {"ref": "main"},
      "merged_at": "2024-01-01T00:00:00Z"
    });
    let pr: PullRequest = serde_json::from_value(v).unwrap();
    assert!(pr.is_closed());
    assert_eq!(pr.head_ref(), Some("feature/widget"));
    assert_eq!(pr.base_ref(), Some("main"));
    assert_eq!(pr.author.unwrap().login.as_deref(), Some("octo"));
    assert!(pr.approvers.is_empty());
  }

  #[test]
  fn unknown_pull_request_state_does_not_fail() {
    let pr: PullRequest = serde_json::from_value(serde_json::json!({"number": 1, "state": "merged"})).unwrap();
    assert_eq!(pr.state, PullRequestState::Unknown);
    assert!(!pr.is_closed());
  }

  #[test]
  fn commit_detail_reads_committer_date() {
    let v = serde_json::json!({"sha": "abc", "commit": {"committer": {"date": "2024-01-01T00:00:00Z"}}});
    let d: CommitDetail = serde_json::from_value(v).unwrap();
    assert_eq!(d.committer_date(), Some("2024-01-01T00:00:00Z"));
  }
}
