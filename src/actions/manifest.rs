// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Generate action.yml for each action from the CLI definition (inputs) and declared outputs
// role: persistence/manifest
// inputs: clap Command tree; base directory
// outputs: <dir>/<action>/action.yml files
// side_effects: Creates directories and writes files
// invariants:
// - Inputs are exactly the subcommand arguments bound to INPUT_* variables, sorted by name
// - Defaults and descriptions come from the argument definitions, so flags and manifests never drift
// errors: Unknown action name; IO errors surfaced with full path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::CommandFactory;
use serde::Serialize;

use crate::cli::Cli;
use crate::{audit, cleanup};

/// Image path relative to `<dir>/<action>/action.yml` when `<dir>` is `.github/actions`.
pub const DOCKER_IMAGE: &str = "../../../Dockerfile";

const INPUT_ENV_PREFIX: &str = "INPUT_";

/// Inputs the action cannot run without.
const REQUIRED_INPUTS: &[&str] = &["github-token"];

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct InputSpec {
  pub description: String,
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub required: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct OutputSpec {
  pub description: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Runs {
  pub using: String,
  pub image: String,
  pub args: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ActionManifest {
  pub name: String,
  pub description: String,
  pub inputs: BTreeMap<String, InputSpec>,
  pub outputs: BTreeMap<String, OutputSpec>,
  pub runs: Runs,
}

fn declared_outputs(action: &str) -> &'static [(&'static str, &'static str)] {
  match action {
    "audit-changes" => audit::OUTPUTS,
    "cleanup-stale-branches" => cleanup::OUTPUTS,
    _ => &[],
  }
}

pub fn action_names() -> Vec<String> {
  Cli::command().get_subcommands().map(|s| s.get_name().to_string()).filter(|n| n != "help").collect()
}

pub fn manifest_for(action: &str) -> Result<ActionManifest> {
  let cmd = Cli::command();
  let sub = cmd
    .get_subcommands()
    .find(|s| s.get_name() == action)
    .with_context(|| format!("Unknown action: {}", action))?;

  let mut inputs = BTreeMap::new();

  for arg in sub.get_arguments() {
    let Some(env) = arg.get_env().and_then(|e| e.to_str()) else {
      continue;
    };
    let Some(name) = env.strip_prefix(INPUT_ENV_PREFIX) else {
      continue;
    };
    let name = name.to_lowercase();

    let default = arg.get_default_values().first().map(|v| v.to_string_lossy().to_string());

    inputs.insert(
      name.clone(),
      InputSpec {
        description: arg.get_help().map(|h| h.to_string()).unwrap_or_default(),
        required: REQUIRED_INPUTS.contains(&name.as_str()),
        default,
      },
    );
  }

  let outputs = declared_outputs(action)
    .iter()
    .map(|(name, description)| (name.to_string(), OutputSpec { description: description.to_string() }))
    .collect();

  Ok(ActionManifest {
    name: action.to_string(),
    description: sub.get_about().map(|a| a.to_string()).unwrap_or_default(),
    inputs,
    outputs,
    runs: Runs { using: "docker".into(), image: DOCKER_IMAGE.into(), args: vec![action.to_string()] },
  })
}

/// Writes `<dir>/<action>/action.yml` for every action; returns the written paths.
pub fn write_all(dir: &Path) -> Result<Vec<PathBuf>> {
  let mut written = Vec::new();

  for action in action_names() {
    let manifest = manifest_for(&action)?;
    let yaml = serde_yml::to_string(&manifest).with_context(|| format!("serializing manifest for {}", action))?;

    let action_dir = dir.join(&action);
    std::fs::create_dir_all(&action_dir).with_context(|| format!("creating {}", action_dir.display()))?;

    let path = action_dir.join("action.yml");
    std::fs::write(&path, yaml).with_context(|| format!("writing {}", path.display()))?;
    written.push(path);
  }

  Ok(written)
}
