// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: GitHub REST seam (GithubApi trait) with HTTP, env-fixture and caching backends, plus token discovery
// role: gateway/github-api
// inputs: ActionContext (api URL, repository slug); token; RA_TEST_* fixture variables
// outputs: Typed releases, pull requests, reviews, branches, commits; ref deletion
// side_effects: Network calls to the GitHub API (HTTP backend only)
// invariants:
// - Backends never panic; every failure is an ApiError
// - The env backend is selected whenever any RA_TEST_* fixture variable is present
// - The cache only stores successful responses, keyed per run
// errors: ApiError (NotFound distinguishes absent releases/commits from transport failures)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;
use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::actions::context::{ActionContext, RepoSlug};
use crate::ext::serde_json::JsonFetch;
use crate::http::{self, ApiError};
use crate::model::{Branch, CommitDetail, PullRequest, Release, Repository, Review};

pub const PER_PAGE: usize = 100;

/// Discover a GitHub token from the environment when the input is blank.
pub fn get_github_token() -> Option<String> {
  ["GITHUB_TOKEN", "GH_TOKEN"]
    .into_iter()
    .filter_map(|var| std::env::var(var).ok())
    .map(|t| t.trim().to_string())
    .find(|t| !t.is_empty())
}

// --- Trait seam for GitHub API ---
pub trait GithubApi: Send + Sync {
  fn get_release_by_tag(&self, tag: &str) -> Result<Release, ApiError>;
  fn list_releases(&self, page: u32) -> Result<Vec<Release>, ApiError>;
  fn list_pulls_for_commit(&self, sha: &str) -> Result<Vec<PullRequest>, ApiError>;
  fn list_reviews(&self, number: u64) -> Result<Vec<Review>, ApiError>;
  fn get_repository(&self) -> Result<Repository, ApiError>;
  fn list_branches(&self, page: u32) -> Result<Vec<Branch>, ApiError>;
  fn list_open_pulls(&self, page: u32) -> Result<Vec<PullRequest>, ApiError>;
  fn get_commit(&self, sha: &str) -> Result<CommitDetail, ApiError>;
  /// Deletes `refs/<git_ref>`, e.g. `heads/feature/x`.
  fn delete_ref(&self, git_ref: &str) -> Result<(), ApiError>;
}

/// Percent-encodes each path segment while keeping the separators.
fn encode_path(path: &str) -> String {
  path.split('/').map(|seg| urlencoding::encode(seg).into_owned()).collect::<Vec<_>>().join("/")
}

struct GithubHttpApi {
  agent: ureq::Agent,
  api_url: String,
  repository: RepoSlug,
  authorization: String,
}

impl GithubHttpApi {
  fn new(token: &str, api_url: &str, repository: RepoSlug) -> Self {
    Self {
      agent: http::agent(),
      api_url: api_url.to_string(),
      repository,
      authorization: format!("Bearer {}", token),
    }
  }

  fn repo_url(&self, tail: &str) -> String {
    format!("{}/repos/{}/{}/{}", self.api_url, self.repository.owner, self.repository.name, tail)
  }

  fn get<T: DeserializeOwned>(&self, tail: &str) -> Result<T, ApiError> {
    let url = self.repo_url(tail);
    http::get_json(&self.agent, &url, &self.headers())
  }

  fn headers(&self) -> [(&str, &str); 3] {
    [
      ("Accept", "application/vnd.github+json"),
      ("X-GitHub-Api-Version", "2022-11-28"),
      ("Authorization", self.authorization.as_str()),
    ]
  }
}

impl GithubApi for GithubHttpApi {
  fn get_release_by_tag(&self, tag: &str) -> Result<Release, ApiError> {
    self.get(&format!("releases/tags/{}", urlencoding::encode(tag)))
  }

  fn list_releases(&self, page: u32) -> Result<Vec<Release>, ApiError> {
    self.get(&format!("releases?per_page={}&page={}", PER_PAGE, page))
  }

  fn list_pulls_for_commit(&self, sha: &str) -> Result<Vec<PullRequest>, ApiError> {
    self.get(&format!("commits/{}/pulls", sha))
  }

  fn list_reviews(&self, number: u64) -> Result<Vec<Review>, ApiError> {
    self.get(&format!("pulls/{}/reviews?per_page={}", number, PER_PAGE))
  }

  fn get_repository(&self) -> Result<Repository, ApiError> {
    let url = format!("{}/repos/{}/{}", self.api_url, self.repository.owner, self.repository.name);
    http::get_json(&self.agent, &url, &self.headers())
  }

  fn list_branches(&self, page: u32) -> Result<Vec<Branch>, ApiError> {
    self.get(&format!("branches?per_page={}&page={}", PER_PAGE, page))
  }

  fn list_open_pulls(&self, page: u32) -> Result<Vec<PullRequest>, ApiError> {
    self.get(&format!("pulls?state=open&per_page={}&page={}", PER_PAGE, page))
  }

  fn get_commit(&self, sha: &str) -> Result<CommitDetail, ApiError> {
    self.get(&format!("commits/{}", encode_path(sha)))
  }

  fn delete_ref(&self, git_ref: &str) -> Result<(), ApiError> {
    let url = self.repo_url(&format!("git/refs/{}", encode_path(git_ref)));
    http::delete(&self.agent, &url, &self.headers())
  }
}

// --- Env-backed fixtures (integration tests drive the binary through these) ---
const ENV_RELEASES: &str = "RA_TEST_RELEASES_JSON";
const ENV_COMMIT_PULLS: &str = "RA_TEST_COMMIT_PULLS_JSON";
const ENV_REVIEWS: &str = "RA_TEST_REVIEWS_JSON";
const ENV_REPOSITORY: &str = "RA_TEST_REPOSITORY_JSON";
const ENV_BRANCHES: &str = "RA_TEST_BRANCHES_JSON";
const ENV_OPEN_PULLS: &str = "RA_TEST_OPEN_PULLS_JSON";
const ENV_COMMITS: &str = "RA_TEST_COMMITS_JSON";
const ENV_DELETE_FAILURES: &str = "RA_TEST_DELETE_FAILURES_JSON";

fn env_json(var: &str) -> Option<serde_json::Value> {
  std::env::var(var).ok().and_then(|s| serde_json::from_str::<serde_json::Value>(&s).ok())
}

/// Array fixtures are served entirely on page 1.
fn env_page<T: DeserializeOwned>(var: &str, page: u32) -> Result<Vec<T>, ApiError> {
  if page > 1 {
    return Ok(Vec::new());
  }
  Ok(env_json(var).map(|v| v.fetch().to_or_default::<Vec<T>>()).unwrap_or_default())
}

struct GithubEnvApi;

impl GithubApi for GithubEnvApi {
  fn get_release_by_tag(&self, tag: &str) -> Result<Release, ApiError> {
    env_page::<Release>(ENV_RELEASES, 1)?
      .into_iter()
      .find(|r| r.tag_name == tag)
      .ok_or_else(|| ApiError::NotFound(format!("release {}", tag)))
  }

  fn list_releases(&self, page: u32) -> Result<Vec<Release>, ApiError> {
    env_page(ENV_RELEASES, page)
  }

  fn list_pulls_for_commit(&self, sha: &str) -> Result<Vec<PullRequest>, ApiError> {
    Ok(env_json(ENV_COMMIT_PULLS).map(|v| v.fetch_key(sha).to_or_default()).unwrap_or_default())
  }

  fn list_reviews(&self, number: u64) -> Result<Vec<Review>, ApiError> {
    Ok(env_json(ENV_REVIEWS).map(|v| v.fetch_id(number).to_or_default()).unwrap_or_default())
  }

  fn get_repository(&self) -> Result<Repository, ApiError> {
    env_json(ENV_REPOSITORY)
      .and_then(|v| v.fetch().to::<Repository>())
      .ok_or_else(|| ApiError::NotFound("repository".into()))
  }

  fn list_branches(&self, page: u32) -> Result<Vec<Branch>, ApiError> {
    env_page(ENV_BRANCHES, page)
  }

  fn list_open_pulls(&self, page: u32) -> Result<Vec<PullRequest>, ApiError> {
    env_page(ENV_OPEN_PULLS, page)
  }

  fn get_commit(&self, sha: &str) -> Result<CommitDetail, ApiError> {
    env_json(ENV_COMMITS)
      .and_then(|v| v.fetch_key(sha).to::<CommitDetail>())
      .ok_or_else(|| ApiError::NotFound(format!("commit {}", sha)))
  }

  fn delete_ref(&self, git_ref: &str) -> Result<(), ApiError> {
    let failures: Vec<String> = env_json(ENV_DELETE_FAILURES).map(|v| v.fetch().to_or_default()).unwrap_or_default();

    if failures.iter().any(|f| f == git_ref) {
      return Err(ApiError::Status {
        status: 422,
        url: format!("git/refs/{}", git_ref),
        body: "Reference does not exist".into(),
      });
    }
    Ok(())
  }
}

fn env_wants_mock() -> bool {
  std::env::vars().any(|(k, _)| k.starts_with("RA_TEST_") && k.ends_with("_JSON"))
}

// --- Lightweight in-memory caching wrapper ---
// Caches successful responses per run to avoid duplicate HTTP calls
// (several commits often share one pull request).
pub struct GithubCachedApi {
  inner: Box<dyn GithubApi>,
  pulls_for_commit: Mutex<HashMap<String, Vec<PullRequest>>>,
  reviews: Mutex<HashMap<u64, Vec<Review>>>,
  commits: Mutex<HashMap<String, CommitDetail>>,
  repository: Mutex<Option<Repository>>,
}

impl GithubCachedApi {
  pub fn new(inner: Box<dyn GithubApi>) -> Self {
    Self {
      inner,
      pulls_for_commit: Mutex::new(HashMap::new()),
      reviews: Mutex::new(HashMap::new()),
      commits: Mutex::new(HashMap::new()),
      repository: Mutex::new(None),
    }
  }
}

fn cached<K, V, F>(cache: &Mutex<HashMap<K, V>>, key: K, load: F) -> Result<V, ApiError>
where
  K: std::hash::Hash + Eq,
  V: Clone,
  F: FnOnce() -> Result<V, ApiError>,
{
  if let Some(v) = cache.lock().ok().and_then(|m| m.get(&key).cloned()) {
    return Ok(v);
  }

  let v = load()?;

  if let Ok(mut m) = cache.lock() {
    m.insert(key, v.clone());
  }

  Ok(v)
}

impl GithubApi for GithubCachedApi {
  fn get_release_by_tag(&self, tag: &str) -> Result<Release, ApiError> {
    self.inner.get_release_by_tag(tag)
  }

  fn list_releases(&self, page: u32) -> Result<Vec<Release>, ApiError> {
    self.inner.list_releases(page)
  }

  fn list_pulls_for_commit(&self, sha: &str) -> Result<Vec<PullRequest>, ApiError> {
    cached(&self.pulls_for_commit, sha.to_string(), || self.inner.list_pulls_for_commit(sha))
  }

  fn list_reviews(&self, number: u64) -> Result<Vec<Review>, ApiError> {
    cached(&self.reviews, number, || self.inner.list_reviews(number))
  }

  fn get_repository(&self) -> Result<Repository, ApiError> {
    if let Some(r) = self.repository.lock().ok().and_then(|g| g.clone()) {
      return Ok(r);
    }

    let r = self.inner.get_repository()?;

    if let Ok(mut g) = self.repository.lock() {
      *g = Some(r.clone());
    }

    Ok(r)
  }

  fn list_branches(&self, page: u32) -> Result<Vec<Branch>, ApiError> {
    self.inner.list_branches(page)
  }

  fn list_open_pulls(&self, page: u32) -> Result<Vec<PullRequest>, ApiError> {
    self.inner.list_open_pulls(page)
  }

  fn get_commit(&self, sha: &str) -> Result<CommitDetail, ApiError> {
    cached(&self.commits, sha.to_string(), || self.inner.get_commit(sha))
  }

  fn delete_ref(&self, git_ref: &str) -> Result<(), ApiError> {
    self.inner.delete_ref(git_ref)
  }
}

/// Select the backend for this run: env fixtures when present, otherwise HTTP.
pub fn build_api(token: &str, ctx: &ActionContext) -> Box<dyn GithubApi> {
  let inner: Box<dyn GithubApi> = if env_wants_mock() {
    Box::new(GithubEnvApi)
  } else {
    Box::new(GithubHttpApi::new(token, &ctx.api_url, ctx.repository.clone()))
  };

  Box::new(GithubCachedApi::new(inner))
}
