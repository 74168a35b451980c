// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Best-effort forge service: releases, pull requests with approvers, branches, commit dates, branch deletion
// role: gateway/forge-service
// inputs: Box<dyn GithubApi> (HTTP, env fixtures, or test fakes)
// outputs: Typed values with neutral fallbacks (None / empty) for audit lookups; Results for cleanup safety inputs
// side_effects: Logs lookup failures; delete_branch removes a ref on the forge
// invariants:
// - Release list is fetched once per invocation: all pages, published only, newest first
// - A release without published_at is treated as absent
// - Branch-safety inputs (default branch, open pull requests) propagate errors instead of degrading
// errors: Audit lookups never fail; cleanup lookups return anyhow::Result
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::cmp::Reverse;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::forge::github_api::{GithubApi, PER_PAGE};
use crate::http::ApiError;
use crate::model::{Actor, Branch, PullRequest, Release};
use crate::util::parse_timestamp;

pub struct Forge {
  api: Box<dyn GithubApi>,
  releases: OnceCell<Vec<Release>>,
}

/// Walks `page = 1..` until a short page comes back.
fn collect_pages<T, F>(fetch: F) -> Result<Vec<T>, ApiError>
where
  F: Fn(u32) -> Result<Vec<T>, ApiError>,
{
  let mut out = Vec::new();
  let mut page = 1;

  loop {
    let batch = fetch(page)?;
    let len = batch.len();
    out.extend(batch);

    if len < PER_PAGE {
      return Ok(out);
    }

    page += 1;
  }
}

impl Forge {
  pub fn new(api: Box<dyn GithubApi>) -> Self {
    Self { api, releases: OnceCell::new() }
  }

  // --- Releases ---

  pub fn get_release_by_tag(&self, tag: &str) -> Option<Release> {
    if tag.trim().is_empty() {
      info!("No release tag provided");
      return None;
    }

    match self.api.get_release_by_tag(tag) {
      Ok(r) if r.published_at.is_some() => Some(r),
      Ok(_) => {
        info!("Release {} is not published yet", tag);
        None
      }
      Err(e) if e.is_not_found() => {
        info!("Release {} not found", tag);
        None
      }
      Err(e) => {
        warn!("Failed to get release by tag {}: {}", tag, e);
        None
      }
    }
  }

  /// Published releases, newest first.
  pub fn valid_releases(&self) -> &[Release] {
    self.releases.get_or_init(|| {
      let all = match collect_pages(|page| self.api.list_releases(page)) {
        Ok(all) => all,
        Err(e) => {
          warn!("Failed to list releases: {}", e);
          return Vec::new();
        }
      };

      let mut dated: Vec<(DateTime<Utc>, Release)> = all
        .into_iter()
        .filter_map(|r| {
          let at = r.published_at.as_deref().and_then(parse_timestamp)?;
          Some((at, r))
        })
        .collect();

      dated.sort_by_key(|(at, _)| Reverse(*at));
      debug!("Found {} published releases", dated.len());

      dated.into_iter().map(|(_, r)| r).collect()
    })
  }

  /// The release published just before `tag`.
  ///
  /// A tag that is not (yet) released counts as newer than every release,
  /// so its previous release is the latest one.
  pub fn previous_release(&self, tag: &str) -> Option<Release> {
    let releases = self.valid_releases();
    let next = releases.iter().position(|r| r.tag_name == tag).map(|i| i + 1).unwrap_or(0);

    releases.get(next).cloned()
  }

  pub fn latest_release(&self) -> Option<Release> {
    self.valid_releases().first().cloned()
  }

  // --- Pull requests ---

  /// Pull requests associated with `sha`, each carrying its approvers.
  pub fn pull_requests_for_commit(&self, sha: &str) -> Vec<PullRequest> {
    let pulls = match self.api.list_pulls_for_commit(sha) {
      Ok(p) => p,
      Err(e) => {
        warn!("Failed to get pull requests for commit {}: {}", sha, e);
        return Vec::new();
      }
    };

    pulls
      .into_iter()
      .map(|mut pr| {
        pr.approvers = self.approvers(pr.number);
        pr
      })
      .collect()
  }

  /// Reviewers whose review state is APPROVED, in review order.
  pub fn approvers(&self, number: u64) -> Vec<Actor> {
    match self.api.list_reviews(number) {
      Ok(reviews) => reviews.into_iter().filter(|r| r.state == "APPROVED").filter_map(|r| r.user).collect(),
      Err(e) => {
        warn!("Failed to get approvers for pull request #{}: {}", number, e);
        Vec::new()
      }
    }
  }

  // --- Branches ---

  pub fn default_branch(&self) -> Result<String> {
    let repo = self.api.get_repository().context("Failed to read repository metadata")?;
    Ok(repo.default_branch)
  }

  pub fn list_branches(&self) -> Result<Vec<Branch>> {
    collect_pages(|page| self.api.list_branches(page)).context("Failed to list branches")
  }

  pub fn open_pull_requests(&self) -> Result<Vec<PullRequest>> {
    collect_pages(|page| self.api.list_open_pulls(page)).context("Failed to list open pull requests")
  }

  /// Committer date of `sha`; `None` when it cannot be determined.
  pub fn commit_date(&self, sha: &str) -> Option<DateTime<Utc>> {
    match self.api.get_commit(sha) {
      Ok(detail) => {
        let date = detail.committer_date().and_then(parse_timestamp);
        if date.is_none() {
          warn!("Commit {} has no readable committer date", sha);
        }
        date
      }
      Err(e) => {
        warn!("Failed to get commit {}: {}", sha, e);
        None
      }
    }
  }

  /// Deletes the branch ref `heads/<name>`.
  pub fn delete_branch(&self, name: &str) -> Result<(), ApiError> {
    self.api.delete_ref(&format!("heads/{}", name))
  }
}
