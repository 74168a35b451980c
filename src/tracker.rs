// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Issue-tracking gateway (Azure DevOps): resolve work-item state and canonical links
// role: gateway/issue-tracker
// inputs: organization URL, personal access token; RA_TEST_WORK_ITEMS_JSON fixtures
// outputs: Work-item state strings ("Unknown" when unavailable), fallback links
// side_effects: Network calls to Azure DevOps (HTTP backend only)
// invariants:
// - state() never fails; any lookup failure yields "Unknown"
// - An unconfigured tracker never issues requests
// errors: Logged as warnings at this boundary
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use tracing::{info, warn};

use crate::ext::serde_json::JsonFetch;
use crate::http::{self, ApiError};

pub const UNKNOWN_STATE: &str = "Unknown";

const ENV_WORK_ITEMS: &str = "RA_TEST_WORK_ITEMS_JSON";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkItemFields {
  #[serde(default, rename = "System.State")]
  pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkItem {
  #[serde(default)]
  pub fields: WorkItemFields,
}

pub trait WorkItemApi: Send + Sync {
  fn get_work_item(&self, id: u64) -> Result<WorkItem, ApiError>;
}

struct AdoHttpApi {
  agent: ureq::Agent,
  org_url: String,
  authorization: String,
}

impl AdoHttpApi {
  fn new(org_url: &str, token: &str) -> Self {
    Self {
      agent: http::agent(),
      org_url: org_url.to_string(),
      // PATs go in the password slot with an empty user name.
      authorization: format!("Basic {}", STANDARD.encode(format!(":{}", token))),
    }
  }
}

impl WorkItemApi for AdoHttpApi {
  fn get_work_item(&self, id: u64) -> Result<WorkItem, ApiError> {
    let url = format!("{}/_apis/wit/workitems/{}?api-version=7.0", self.org_url, id);
    let headers = [("Accept", "application/json"), ("Authorization", self.authorization.as_str())];
    http::get_json(&self.agent, &url, &headers)
  }
}

struct AdoEnvApi;

impl WorkItemApi for AdoEnvApi {
  fn get_work_item(&self, id: u64) -> Result<WorkItem, ApiError> {
    std::env::var(ENV_WORK_ITEMS)
      .ok()
      .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).ok())
      .and_then(|v| v.fetch_id(id).to::<WorkItem>())
      .ok_or_else(|| ApiError::NotFound(format!("work item {}", id)))
  }
}

pub struct WorkItemTracker {
  org_url: String,
  api: Option<Box<dyn WorkItemApi>>,
}

impl WorkItemTracker {
  /// Builds the tracker for this run; without both an organization URL and a token
  /// (and no fixtures in the environment) every state resolves to "Unknown".
  pub fn new(org_url: Option<&str>, token: Option<&str>) -> Self {
    let org_url = org_url.map(|u| u.trim().trim_end_matches('/').to_string()).unwrap_or_default();

    let api: Option<Box<dyn WorkItemApi>> = if std::env::var_os(ENV_WORK_ITEMS).is_some() {
      Some(Box::new(AdoEnvApi))
    } else {
      match token.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) if !org_url.is_empty() => Some(Box::new(AdoHttpApi::new(&org_url, t))),
        _ => {
          info!("Azure DevOps is not configured; work item states will be reported as {}", UNKNOWN_STATE);
          None
        }
      }
    };

    Self { org_url, api }
  }

  #[cfg(test)]
  pub fn with_api(org_url: &str, api: Box<dyn WorkItemApi>) -> Self {
    Self { org_url: org_url.trim_end_matches('/').to_string(), api: Some(api) }
  }

  /// Current `System.State` of the work item, or "Unknown".
  pub fn state(&self, id: u64) -> String {
    let Some(api) = &self.api else {
      return UNKNOWN_STATE.to_string();
    };

    match api.get_work_item(id) {
      Ok(item) => item.fields.state.filter(|s| !s.trim().is_empty()).unwrap_or_else(|| UNKNOWN_STATE.to_string()),
      Err(e) => {
        warn!("Failed to get state for work item {}: {}", id, e);
        UNKNOWN_STATE.to_string()
      }
    }
  }

  /// Link used when the pull request body does not carry one.
  pub fn work_item_url(&self, id: u64) -> String {
    format!("{}/_apis/wit/workitems/{}", self.org_url, id)
  }
}
