// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: audit-changes action: resolve the release window, aggregate changes, publish the job summary and change-notes output
// role: action/audit-changes
// inputs: AuditConfig, ActionContext, now
// outputs: change-notes output; job summary
// side_effects: git subprocesses, forge/tracker requests, summary file append
// invariants:
// - Window = (previous release sha | initial commit, release sha | run sha]
// - A tag without a published release is an in-progress release compared against the latest release
// errors: Missing token is logged and ends the action without failure; repository access errors propagate
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod aggregate;
pub mod render;
pub mod work_items;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::actions::{ActionContext, Outputs};
use crate::cli::AuditConfig;
use crate::forge::github_api::{build_api, get_github_token};
use crate::forge::Forge;
use crate::gitio::{GitCli, SourceControl};
use crate::tracker::WorkItemTracker;

use self::aggregate::ChangeAggregator;
use self::render::{render_summary, ReportInput};

pub const OUTPUT_CHANGE_NOTES: &str = "change-notes";

pub const OUTPUTS: &[(&str, &str)] = &[(OUTPUT_CHANGE_NOTES, "Change notes generated for the release.")];

/// Boundaries of the audited window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseWindow {
  pub from_sha: String,
  pub from_tag: Option<String>,
  pub to_sha: String,
}

pub fn resolve_window(forge: &Forge, git: &dyn SourceControl, tag: &str, run_sha: &str) -> ReleaseWindow {
  let release = forge.get_release_by_tag(tag);

  let previous = match &release {
    Some(_) => forge.previous_release(tag),
    None => {
      info!("No release found for tag {}. Assuming this is an ongoing release.", tag);
      forge.latest_release()
    }
  };

  if previous.is_none() {
    info!("No previous release found. Assuming this is the first release.");
  }

  let to_sha = release.map(|r| r.target_commitish).unwrap_or_else(|| run_sha.to_string());

  let (from_sha, from_tag) = match previous {
    Some(p) => (p.target_commitish, Some(p.tag_name)),
    None => (git.initial_commit_sha().unwrap_or_default(), None),
  };

  ReleaseWindow { from_sha, from_tag, to_sha }
}

pub fn run(cfg: &AuditConfig, ctx: &ActionContext, now: DateTime<Utc>, outputs: &mut Outputs) -> Result<()> {
  let Some(token) = cfg.github_token.clone().or_else(get_github_token) else {
    error!("GitHub token is required");
    return Ok(());
  };

  info!("Audit changes action started...");

  let git = GitCli::open(&ctx.workspace)?;
  let forge = Forge::new(build_api(&token, ctx));
  let tracker = WorkItemTracker::new(cfg.ado_organization_url.as_deref(), cfg.ado_token.as_deref());

  let tag = cfg.release_tag.as_deref().unwrap_or("");
  let window = resolve_window(&forge, &git, tag, &ctx.sha);
  info!("Auditing changes in {}..{}", window.from_sha, window.to_sha);

  let aggregation = ChangeAggregator::new(&git, &forge, &tracker).aggregate(&window.from_sha, &window.to_sha);

  let repository_url = ctx.repository_url();
  let summary = render_summary(&ReportInput {
    aggregation: &aggregation,
    from_sha: &window.from_sha,
    from_tag: window.from_tag.as_deref(),
    to_sha: &window.to_sha,
    to_tag: cfg.release_tag.as_deref(),
    pre_release: cfg.pre_release,
    add_release_notes_link: cfg.add_release_notes_link,
    repository_url: &repository_url,
    now,
  });

  let notes = summary.stringify().to_string();
  info!("Summary of changes:");
  info!("{}", notes);

  match &ctx.summary_file {
    Some(path) => summary.write(path)?,
    None => warn!("GITHUB_STEP_SUMMARY is not set; the job summary was not written"),
  }

  outputs.set(OUTPUT_CHANGE_NOTES, notes);
  info!("Audit changes action completed successfully.");

  Ok(())
}
