// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: cleanup-stale-branches action: list branches, select stale ones, delete them (or report in dry-run)
// role: action/cleanup-stale-branches
// inputs: CleanupConfig, ActionContext, now
// outputs: deletable-branches output (comma-joined names)
// side_effects: Forge requests; ref deletion unless dry-run
// invariants:
// - Repository metadata and open pull requests are fetched once per run
// - Dry-run never issues a delete request
// - A failed deletion is logged and the loop continues
// errors: Missing token is logged and ends the action without failure; listing failures propagate
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod selector;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::actions::{ActionContext, Outputs};
use crate::cli::CleanupConfig;
use crate::forge::github_api::{build_api, get_github_token};
use crate::forge::Forge;
use crate::model::Branch;

use self::selector::SelectionRules;

pub const OUTPUT_DELETABLE_BRANCHES: &str = "deletable-branches";

pub const OUTPUTS: &[(&str, &str)] =
  &[(OUTPUT_DELETABLE_BRANCHES, "Comma-separated list of branches that met deletion criteria.")];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeletionReport {
  pub deleted: Vec<String>,
  pub failed: Vec<String>,
}

/// Branches of the repository that are stale under `cfg` at `now`.
pub fn deletable_branches(forge: &Forge, cfg: &CleanupConfig, now: DateTime<Utc>) -> Result<Vec<Branch>> {
  let branches = forge.list_branches()?;
  info!("Found {} branches", branches.len());

  let candidates = selector::filter_allowed(branches, &cfg.allowed);
  if candidates.is_empty() {
    info!("No branches match the allowed pattern");
    return Ok(Vec::new());
  }

  let default_branch = forge.default_branch()?;
  let open_pulls = forge.open_pull_requests()?;

  let rules = SelectionRules {
    default_branch: &default_branch,
    ignore: cfg.ignore.as_ref(),
    open_pulls: &open_pulls,
    cutoff: selector::cutoff(now, cfg.max_age_days),
  };

  Ok(selector::select(&candidates, &rules, |sha| forge.commit_date(sha)))
}

pub fn delete_branches(forge: &Forge, branches: &[Branch], dry_run: bool) -> DeletionReport {
  let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
  info!("Branches queued for deletion: [{}]", names.join(", "));

  let mut report = DeletionReport::default();

  if dry_run {
    info!("Dry run is enabled, no branches will be deleted.");
    return report;
  }

  for name in names {
    match forge.delete_branch(name) {
      Ok(()) => {
        info!("Deleted branch {}", name);
        report.deleted.push(name.to_string());
      }
      Err(e) => {
        warn!("Failed to delete branch {}: {}", name, e);
        report.failed.push(name.to_string());
      }
    }
  }

  report
}

pub fn run(cfg: &CleanupConfig, ctx: &ActionContext, now: DateTime<Utc>, outputs: &mut Outputs) -> Result<()> {
  let Some(token) = cfg.github_token.clone().or_else(get_github_token) else {
    error!("GitHub token is required");
    return Ok(());
  };

  let forge = Forge::new(build_api(&token, ctx));

  let deletable = deletable_branches(&forge, cfg, now)?;
  delete_branches(&forge, &deletable, cfg.dry_run);

  let names: Vec<&str> = deletable.iter().map(|b| b.name.as_str()).collect();
  outputs.set(OUTPUT_DELETABLE_BRANCHES, names.join(","));

  Ok(())
}
