// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Shared blocking HTTP plumbing (ureq agent, JSON GET, DELETE) and the ApiError taxonomy for forge and tracker backends
// role: integration/http
// inputs: URL, request headers
// outputs: Deserialized JSON bodies or classified ApiError values
// side_effects: Network calls
// invariants:
// - 404 always maps to ApiError::NotFound so callers can treat it as an empty state
// - No retries; one request per call
// errors: Every failure is returned as ApiError; nothing panics
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::util::truncate;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),
  #[error("HTTP {status} from {url}: {body}")]
  Status { status: u16, url: String, body: String },
  #[error("request to {url} failed: {message}")]
  Transport { url: String, message: String },
  #[error("could not decode response from {url}: {message}")]
  Decode { url: String, message: String },
}

impl ApiError {
  pub fn is_not_found(&self) -> bool {
    matches!(self, ApiError::NotFound(_))
  }
}

pub const USER_AGENT: &str = concat!("release-actions/", env!("CARGO_PKG_VERSION"));

pub fn agent() -> ureq::Agent {
  ureq::AgentBuilder::new().user_agent(USER_AGENT).build()
}

pub fn get_json<T: DeserializeOwned>(agent: &ureq::Agent, url: &str, headers: &[(&str, &str)]) -> Result<T, ApiError> {
  let mut req = agent.get(url);

  for (name, value) in headers {
    req = req.set(name, value);
  }

  let resp = req.call().map_err(|e| classify(url, e))?;

  resp.into_json::<T>().map_err(|e| ApiError::Decode {
    url: url.to_string(),
    message: e.to_string(),
  })
}

pub fn delete(agent: &ureq::Agent, url: &str, headers: &[(&str, &str)]) -> Result<(), ApiError> {
  let mut req = agent.delete(url);

  for (name, value) in headers {
    req = req.set(name, value);
  }

  req.call().map(|_| ()).map_err(|e| classify(url, e))
}

fn classify(url: &str, err: ureq::Error) -> ApiError {
  match err {
    ureq::Error::Status(404, _) => ApiError::NotFound(url.to_string()),
    ureq::Error::Status(status, resp) => {
      let body = resp.into_string().unwrap_or_default();
      ApiError::Status {
        status,
        url: url.to_string(),
        body: truncate(body.trim(), 200),
      }
    }
    ureq::Error::Transport(t) => ApiError::Transport {
      url: url.to_string(),
      message: t.to_string(),
    },
  }
}
