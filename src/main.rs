use std::process::ExitCode;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{error, info};

mod actions;
mod audit;
mod cleanup;
mod cli;
mod ext;
mod forge;
mod gitio;
mod http;
mod logging;
mod model;
mod tracker;
mod util;

use crate::actions::{ActionContext, Outputs};
use crate::cli::{normalize_audit, normalize_cleanup, run_mode, Cli, Command, RunMode};

fn main() -> Result<ExitCode> {
  let cli = Cli::parse();
  logging::init();

  let now_override = util::parse_now(cli.now_override.as_deref())?;

  match run_mode(cli)? {
    RunMode::ManPage => {
      let page = util::render_man_page::<Cli>()?;
      print!("{}", page);
      Ok(ExitCode::SUCCESS)
    }
    RunMode::GenerateManifest(dir) => {
      for path in actions::manifest::write_all(&dir)? {
        info!("Wrote {}", path.display());
      }
      Ok(ExitCode::SUCCESS)
    }
    RunMode::Execute(cmd) => execute(cmd, util::effective_now(now_override)),
  }
}

/// Runs one action; outputs are published whether or not the action body succeeds.
fn execute(cmd: Command, now: DateTime<Utc>) -> Result<ExitCode> {
  let action = cmd.name();

  let mut outputs = match &cmd {
    Command::AuditChanges(_) => Outputs::declared(&[audit::OUTPUT_CHANGE_NOTES]),
    Command::CleanupStaleBranches(_) => Outputs::declared(&[cleanup::OUTPUT_DELETABLE_BRANCHES]),
  };

  let ctx = match ActionContext::from_env() {
    Ok(ctx) => ctx,
    Err(e) => {
      error!("{:#}", e);
      outputs.publish(ActionContext::output_file_from_env().as_deref())?;
      return Ok(ExitCode::SUCCESS);
    }
  };

  let result = run_action(cmd, &ctx, now, &mut outputs);
  outputs.publish(ctx.output_file.as_deref())?;

  match result {
    Ok(()) => Ok(ExitCode::SUCCESS),
    Err(e) => {
      error!("{} failed: {:#}", action, e);
      Ok(ExitCode::FAILURE)
    }
  }
}

fn run_action(cmd: Command, ctx: &ActionContext, now: DateTime<Utc>, outputs: &mut Outputs) -> Result<()> {
  match cmd {
    Command::AuditChanges(args) => audit::run(&normalize_audit(args), ctx, now, outputs),
    Command::CleanupStaleBranches(args) => match normalize_cleanup(args) {
      Ok(cfg) => cleanup::run(&cfg, ctx, now, outputs),
      // Bad inputs end the action without failing the job.
      Err(e) => {
        error!("{:#}", e);
        Ok(())
      }
    },
  }
}
