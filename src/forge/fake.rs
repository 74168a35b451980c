// In-memory GithubApi used by unit tests across the crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::forge::github_api::{GithubApi, PER_PAGE};
use crate::http::ApiError;
use crate::model::{
  Actor, Branch, BranchCommit, CommitDetail, CommitPayload, GitRef, PullRequest, PullRequestState, Release, Repository,
  Review, Signature,
};

#[derive(Default)]
pub struct FakeGithub {
  pub releases: Vec<Release>,
  pub fail_releases: bool,
  pub pulls: HashMap<String, Vec<PullRequest>>,
  pub failing_pull_lookups: Vec<String>,
  pub reviews: HashMap<u64, Vec<Review>>,
  pub default_branch: Option<String>,
  pub branches: Vec<Branch>,
  pub open_pulls: Vec<PullRequest>,
  pub commit_dates: HashMap<String, String>,
  pub failing_refs: Vec<String>,
  pub deleted: Mutex<Vec<String>>,
  pub repository_calls: AtomicUsize,
  pub open_pull_calls: AtomicUsize,
}

impl FakeGithub {
  pub fn deleted(&self) -> Vec<String> {
    self.deleted.lock().map(|d| d.clone()).unwrap_or_default()
  }
}

fn page_of<T: Clone>(items: &[T], page: u32) -> Vec<T> {
  items.iter().skip((page.saturating_sub(1) as usize) * PER_PAGE).take(PER_PAGE).cloned().collect()
}

impl GithubApi for FakeGithub {
  fn get_release_by_tag(&self, tag: &str) -> Result<Release, ApiError> {
    if self.fail_releases {
      return Err(ApiError::Status { status: 500, url: "releases".into(), body: "boom".into() });
    }
    self.releases.iter().find(|r| r.tag_name == tag).cloned().ok_or_else(|| ApiError::NotFound(tag.into()))
  }

  fn list_releases(&self, page: u32) -> Result<Vec<Release>, ApiError> {
    if self.fail_releases {
      return Err(ApiError::Transport { url: "releases".into(), message: "reset".into() });
    }
    Ok(page_of(&self.releases, page))
  }

  fn list_pulls_for_commit(&self, sha: &str) -> Result<Vec<PullRequest>, ApiError> {
    if self.failing_pull_lookups.iter().any(|s| s == sha) {
      return Err(ApiError::Status { status: 502, url: sha.into(), body: "bad gateway".into() });
    }
    Ok(self.pulls.get(sha).cloned().unwrap_or_default())
  }

  fn list_reviews(&self, number: u64) -> Result<Vec<Review>, ApiError> {
    Ok(self.reviews.get(&number).cloned().unwrap_or_default())
  }

  fn get_repository(&self) -> Result<Repository, ApiError> {
    self.repository_calls.fetch_add(1, Ordering::SeqCst);
    self
      .default_branch
      .clone()
      .map(|default_branch| Repository { default_branch })
      .ok_or_else(|| ApiError::NotFound("repository".into()))
  }

  fn list_branches(&self, page: u32) -> Result<Vec<Branch>, ApiError> {
    Ok(page_of(&self.branches, page))
  }

  fn list_open_pulls(&self, page: u32) -> Result<Vec<PullRequest>, ApiError> {
    self.open_pull_calls.fetch_add(1, Ordering::SeqCst);
    Ok(page_of(&self.open_pulls, page))
  }

  fn get_commit(&self, sha: &str) -> Result<CommitDetail, ApiError> {
    let date = self.commit_dates.get(sha).ok_or_else(|| ApiError::NotFound(sha.into()))?;
    Ok(CommitDetail {
      sha: sha.to_string(),
      commit: CommitPayload { committer: Some(Signature { date: Some(date.clone()) }) },
    })
  }

  fn delete_ref(&self, git_ref: &str) -> Result<(), ApiError> {
    if self.failing_refs.iter().any(|r| r == git_ref) {
      return Err(ApiError::Status { status: 422, url: git_ref.into(), body: "Reference does not exist".into() });
    }
    if let Ok(mut d) = self.deleted.lock() {
      d.push(git_ref.to_string());
    }
    Ok(())
  }
}

pub fn actor(login: &str) -> Actor {
  Actor { login: Some(login.to_string()), ..Default::default() }
}

pub fn pull(number: u64, state: PullRequestState, body: &str) -> PullRequest {
  PullRequest {
    number,
    state,
    title: format!("Change {}", number),
    body: if body.is_empty() { None } else { Some(body.to_string()) },
    html_url: format!("https://github.com/acme/widgets/pull/{}", number),
    author: Some(actor(&format!("dev{}", number))),
    head: None,
    base: None,
    approvers: Vec::new(),
  }
}

pub fn open_pull(number: u64, head: &str, base: &str) -> PullRequest {
  PullRequest {
    head: Some(GitRef { name: head.to_string() }),
    base: Some(GitRef { name: base.to_string() }),
    ..pull(number, PullRequestState::Open, "")
  }
}

pub fn approval(login: &str) -> Review {
  Review { state: "APPROVED".into(), user: Some(actor(login)) }
}

pub fn release(tag: &str, sha: &str, published_at: Option<&str>) -> Release {
  Release {
    tag_name: tag.to_string(),
    target_commitish: sha.to_string(),
    published_at: published_at.map(String::from),
    draft: published_at.is_none(),
    prerelease: false,
    html_url: format!("https://github.com/acme/widgets/releases/tag/{}", tag),
  }
}

pub fn branch(name: &str, sha: &str) -> Branch {
  Branch { name: name.to_string(), commit: BranchCommit { sha: sha.to_string() } }
}
