// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Resolve the workflow run context (repository, sha, server/api URLs, workspace, output files) once per invocation
// role: actions/context
// inputs: GITHUB_* runner environment; origin remote of the workspace as a fallback for the repository slug
// outputs: ActionContext value passed explicitly to both actions
// invariants:
// - URLs never end with '/'
// - sha falls back to HEAD when GITHUB_SHA is absent (local runs)
// errors: Missing/invalid repository slug is a configuration error
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;
use std::path::PathBuf;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::util::{non_blank, run_git};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoSlug {
  pub owner: String,
  pub name: String,
}

impl RepoSlug {
  /// Parses "owner/name".
  pub fn parse(s: &str) -> Option<Self> {
    let (owner, name) = s.trim().split_once('/')?;

    if owner.is_empty() || name.is_empty() || name.contains('/') {
      return None;
    }

    Some(Self { owner: owner.to_string(), name: name.to_string() })
  }
}

impl fmt::Display for RepoSlug {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.owner, self.name)
  }
}

/// Parse `remote.origin.url` to extract the slug when hosted on GitHub.
pub fn parse_origin_github(repo: &str) -> Option<RepoSlug> {
  static RE_ORIGIN: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"^(?:git@github\.com:|https?://github\.com/)([^/]+)/([^/]+?)(?:\.git)?/?$").unwrap());

  let url = run_git(repo, &["config".into(), "--get".into(), "remote.origin.url".into()]).ok()?;
  let c = RE_ORIGIN.captures(url.trim())?;

  Some(RepoSlug {
    owner: c.get(1)?.as_str().to_string(),
    name: c.get(2)?.as_str().to_string(),
  })
}

#[derive(Debug, Clone)]
pub struct ActionContext {
  pub repository: RepoSlug,
  pub sha: String,
  pub server_url: String,
  pub api_url: String,
  /// Checkout used for git queries.
  pub workspace: String,
  pub output_file: Option<PathBuf>,
  pub summary_file: Option<PathBuf>,
}

impl ActionContext {
  pub fn from_env() -> Result<Self> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| non_blank(lookup(key).as_deref());

    let workspace = get("GITHUB_WORKSPACE").unwrap_or_else(|| ".".to_string());

    let repository = match get("GITHUB_REPOSITORY") {
      Some(raw) => match RepoSlug::parse(&raw) {
        Some(slug) => slug,
        None => bail!("GITHUB_REPOSITORY must look like owner/name, got {:?}", raw),
      },
      None => match parse_origin_github(&workspace) {
        Some(slug) => slug,
        None => bail!("GITHUB_REPOSITORY is not set and the origin remote is not a GitHub repository"),
      },
    };

    Ok(Self {
      repository,
      sha: get("GITHUB_SHA").unwrap_or_else(|| "HEAD".to_string()),
      server_url: trim_url(get("GITHUB_SERVER_URL").unwrap_or_else(|| "https://github.com".to_string())),
      api_url: trim_url(get("GITHUB_API_URL").unwrap_or_else(|| "https://api.github.com".to_string())),
      workspace,
      output_file: get("GITHUB_OUTPUT").map(PathBuf::from),
      summary_file: get("GITHUB_STEP_SUMMARY").map(PathBuf::from),
    })
  }

  /// `GITHUB_OUTPUT` on its own, for publishing outputs when the rest of the context is unusable.
  pub fn output_file_from_env() -> Option<PathBuf> {
    non_blank(std::env::var("GITHUB_OUTPUT").ok().as_deref()).map(PathBuf::from)
  }

  /// `<server>/<owner>/<repo>`
  pub fn repository_url(&self) -> String {
    format!("{}/{}", self.server_url, self.repository)
  }
}

fn trim_url(url: String) -> String {
  url.trim_end_matches('/').to_string()
}
