// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for git subprocesses, time formatting, report text helpers, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; DateTime; clap CommandFactory
// outputs: Command output, formatted timestamps, encoded/truncated text, man page text
// side_effects: run_git invokes subprocesses
// invariants:
// - truncate never splits a UTF-8 character and never exceeds max_chars
// - format_utc_date is locale-independent: "YYYY-MM-DD HH:MM:SS UTC"
// - effective_now honors the override before the wall clock
// errors: run_git surfaces command + stderr; parse_now reports the offending value
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::process::Command;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use clap::CommandFactory;

pub fn run_git(repo: &str, args: &[String]) -> Result<String> {
  let out = Command::new("git")
    .args(args)
    .current_dir(repo)
    .output()
    .with_context(|| format!("spawning git {:?}", args))?;

  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    let stderr = String::from_utf8_lossy(&out.stderr);
    anyhow::bail!("git {:?} failed: {}", args, stderr.trim())
  }
}

/// Shortens a SHA to the 7 characters used in report text.
pub fn short_sha(full: &str) -> String {
  full.chars().take(7).collect()
}

/// Escapes the characters that would otherwise be read as HTML markup.
pub fn html_encode(s: &str) -> String {
  s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Truncates to `max_chars` characters, ending with "..." when clipped.
pub fn truncate(s: &str, max_chars: usize) -> String {
  if s.chars().count() <= max_chars {
    return s.to_string();
  }

  let keep = max_chars.saturating_sub(3);
  let mut out: String = s.chars().take(keep).collect();
  out.push_str("...");
  out
}

/// Parses a timestamp from git or the GitHub API (RFC3339 / ISO-8601 with offset).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
  let v = value.trim();

  if v.is_empty() {
    return None;
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
    return Some(dt.with_timezone(&Utc));
  }

  // `git log --date=iso` style: "2025-08-12 14:03:00 +0200"
  DateTime::parse_from_str(v, "%Y-%m-%d %H:%M:%S %z")
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}

/// Formats a timestamp as "YYYY-MM-DD HH:MM:SS UTC".
pub fn format_utc_date(dt: DateTime<Utc>) -> String {
  dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Parses the hidden `--now-override` value (RFC3339 or naive `%Y-%m-%dT%H:%M:%S`, read as UTC).
pub fn parse_now(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  let Some(s) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
    return Ok(None);
  };

  if let Some(dt) = parse_timestamp(s) {
    return Ok(Some(dt));
  }

  let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
    .with_context(|| format!("invalid --now-override value: {}", s))?;

  Ok(Some(naive.and_utc()))
}

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise
/// the current UTC time is used. Keeps the wall clock out of the
/// selection and rendering code so tests stay deterministic.
pub fn effective_now(override_now: Option<DateTime<Utc>>) -> DateTime<Utc> {
  override_now.unwrap_or_else(Utc::now)
}

/// Returns the trimmed value, or `None` when it is missing or blank.
pub fn non_blank(value: Option<&str>) -> Option<String> {
  value.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
