use anyhow::{bail, Context, Result};
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};
use regex::Regex;
use std::path::PathBuf;

use crate::util::non_blank;

pub const DEFAULT_LAST_COMMIT_AGE_DAYS: u32 = 90;

#[derive(Parser, Debug)]
#[command(
    name = "release-actions",
    version,
    about = "GitHub Actions for release audits and stale branch cleanup",
    long_about = None
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Option<Command>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Write action.yml manifests for every action under DIR (internal; for packaging)
  #[arg(long = "gen-action-yml", value_name = "DIR", hide = true)]
  pub gen_action_yml: Option<PathBuf>,

  /// Override the "now" instant used for release dates and branch age (hidden; tests only)
  #[arg(long = "now-override", hide = true, global = true)]
  pub now_override: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Audit changes between two releases and summarize pull requests and work items.
  AuditChanges(AuditArgs),
  /// Delete stale branches that match a pattern and are safe to remove.
  CleanupStaleBranches(CleanupArgs),
}

impl Command {
  pub fn name(&self) -> &'static str {
    match self {
      Command::AuditChanges(_) => "audit-changes",
      Command::CleanupStaleBranches(_) => "cleanup-stale-branches",
    }
  }
}

#[derive(Args, Debug, Clone, Default)]
pub struct AuditArgs {
  /// Adds link to release notes.
  #[arg(
    long = "add-release-notes-link",
    env = "INPUT_ADD-RELEASE-NOTES-LINK",
    action = ArgAction::SetTrue,
    value_parser = FalseyValueParser::new()
  )]
  pub add_release_notes_link: bool,

  /// Organization ADO url in which to connect to. Example: https://dev.azure.com/my-org
  #[arg(long = "ado-organization-url", env = "INPUT_ADO-ORGANIZATION-URL")]
  pub ado_organization_url: Option<String>,

  /// ADO token required for authentication.
  #[arg(long = "ado-token", env = "INPUT_ADO-TOKEN", hide_env_values = true)]
  pub ado_token: Option<String>,

  /// GitHub token required for authentication.
  #[arg(long = "github-token", env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
  pub github_token: Option<String>,

  /// Indicates if this is a pre-release run.
  #[arg(
    long = "pre-release",
    env = "INPUT_PRE-RELEASE",
    action = ArgAction::SetTrue,
    value_parser = FalseyValueParser::new()
  )]
  pub pre_release: bool,

  /// Release tag generated for the release.
  #[arg(long = "release-tag", env = "INPUT_RELEASE-TAG")]
  pub release_tag: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CleanupArgs {
  /// Regex pattern to match branches that are allowed to be deleted.
  #[arg(long = "allowed-branches-pattern", env = "INPUT_ALLOWED-BRANCHES-PATTERN")]
  pub allowed_branches_pattern: Option<String>,

  /// If true, the action will only simulate the deletion of branches without actually deleting them.
  #[arg(
    long = "dry-run",
    env = "INPUT_DRY-RUN",
    action = ArgAction::SetTrue,
    value_parser = FalseyValueParser::new()
  )]
  pub dry_run: bool,

  /// GitHub token required for authentication.
  #[arg(long = "github-token", env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
  pub github_token: Option<String>,

  /// Regex pattern to match branches that should be ignored and not deleted.
  #[arg(long = "ignore-branches-pattern", env = "INPUT_IGNORE-BRANCHES-PATTERN")]
  pub ignore_branches_pattern: Option<String>,

  /// The maximum age (in days) of a branch to be considered for deletion.
  #[arg(long = "last-commit-age-days", env = "INPUT_LAST-COMMIT-AGE-DAYS", default_value = "90")]
  pub last_commit_age_days: String,
}

#[derive(Debug)]
pub enum RunMode {
  ManPage,
  GenerateManifest(PathBuf),
  Execute(Command),
}

/// Decide what this invocation does before any action side effect happens.
pub fn run_mode(cli: Cli) -> Result<RunMode> {
  if cli.gen_man {
    return Ok(RunMode::ManPage);
  }

  if let Some(dir) = cli.gen_action_yml {
    return Ok(RunMode::GenerateManifest(dir));
  }

  match cli.command {
    Some(cmd) => Ok(RunMode::Execute(cmd)),
    None => bail!("Provide an action to run: audit-changes | cleanup-stale-branches"),
  }
}

#[derive(Debug, Clone)]
pub struct AuditConfig {
  pub release_tag: Option<String>,
  pub pre_release: bool,
  pub add_release_notes_link: bool,
  pub github_token: Option<String>,
  pub ado_token: Option<String>,
  pub ado_organization_url: Option<String>,
}

pub fn normalize_audit(args: AuditArgs) -> AuditConfig {
  AuditConfig {
    release_tag: non_blank(args.release_tag.as_deref()),
    pre_release: args.pre_release,
    add_release_notes_link: args.add_release_notes_link,
    github_token: non_blank(args.github_token.as_deref()),
    ado_token: non_blank(args.ado_token.as_deref()),
    ado_organization_url: non_blank(args.ado_organization_url.as_deref()).map(|u| u.trim_end_matches('/').to_string()),
  }
}

#[derive(Debug, Clone)]
pub struct CleanupConfig {
  /// Blank pattern matches every branch.
  pub allowed: Regex,
  /// `None` when the ignore pattern is blank.
  pub ignore: Option<Regex>,
  pub max_age_days: u32,
  pub dry_run: bool,
  pub github_token: Option<String>,
}

pub fn normalize_cleanup(args: CleanupArgs) -> Result<CleanupConfig> {
  let allowed_src = non_blank(args.allowed_branches_pattern.as_deref()).unwrap_or_default();
  let allowed =
    Regex::new(&allowed_src).with_context(|| format!("Invalid allowed-branches-pattern: {}", allowed_src))?;

  let ignore = match non_blank(args.ignore_branches_pattern.as_deref()) {
    Some(p) => Some(Regex::new(&p).with_context(|| format!("Invalid ignore-branches-pattern: {}", p))?),
    None => None,
  };

  let max_age_days = match non_blank(Some(&args.last_commit_age_days)) {
    Some(raw) => match raw.parse::<u32>() {
      Ok(days) => days,
      Err(_) => bail!("last-commit-age-days must be a non-negative whole number of days, got {:?}", raw),
    },
    None => DEFAULT_LAST_COMMIT_AGE_DAYS,
  };

  Ok(CleanupConfig {
    allowed,
    ignore,
    max_age_days,
    dry_run: args.dry_run,
    github_token: non_blank(args.github_token.as_deref()),
  })
}
