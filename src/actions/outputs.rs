// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Collect action outputs during a run and publish them to $GITHUB_OUTPUT
// role: actions/outputs
// inputs: Output name/value pairs; optional output file path
// outputs: Heredoc-style records appended to the output file (or ::set-output commands on stdout)
// side_effects: Appends to the output file or prints to stdout
// invariants:
// - Setting a name twice keeps the latest value in its original position
// - Each record uses a fresh random delimiter that never occurs in the value
// errors: I/O failures writing the output file
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::logging::escape_data;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Outputs {
  entries: Vec<(String, String)>,
}

impl Outputs {
  /// Starts from the declared outputs with empty values.
  pub fn declared(names: &[&str]) -> Self {
    Self { entries: names.iter().map(|n| (n.to_string(), String::new())).collect() }
  }

  pub fn set(&mut self, name: &str, value: impl Into<String>) {
    let value = value.into();

    match self.entries.iter_mut().find(|(n, _)| n == name) {
      Some(entry) => entry.1 = value,
      None => self.entries.push((name.to_string(), value)),
    }
  }

  #[cfg(test)]
  pub fn get(&self, name: &str) -> Option<&str> {
    self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
  }

  pub fn publish(&self, output_file: Option<&Path>) -> Result<()> {
    let Some(path) = output_file else {
      for (name, value) in &self.entries {
        println!("::set-output name={}::{}", name, escape_data(value));
      }
      return Ok(());
    };

    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .with_context(|| format!("opening output file {}", path.display()))?;

    for (name, value) in &self.entries {
      let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
      let record = format_output(name, value, &delimiter)?;
      file
        .write_all(record.as_bytes())
        .with_context(|| format!("writing output {} to {}", name, path.display()))?;
    }

    Ok(())
  }
}

/// `name<<delimiter` / value / `delimiter`, each line newline-terminated.
pub fn format_output(name: &str, value: &str, delimiter: &str) -> Result<String> {
  if name.contains(delimiter) {
    bail!("Unexpected input: name should not contain the delimiter \"{}\"", delimiter);
  }

  if value.contains(delimiter) {
    bail!("Unexpected input: value should not contain the delimiter \"{}\"", delimiter);
  }

  Ok(format!("{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter))
}
