// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Extract AB#<id> work-item references and their links from pull request bodies
// role: audit/work-items
// inputs: Pull request body text; fallback link builder
// outputs: Distinct WorkItemRef values in first-seen order
// invariants:
// - Matching is case-insensitive; keys are normalized to "AB#<digits>"
// - A body repeating a reference yields it once
// - An explicit markdown link to dev.azure.com wins over the synthesized link
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::WorkItemRef;

static RE_WORK_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)AB#(\d+)").unwrap());

pub fn external_id(numeric_id: u64) -> String {
  format!("AB#{}", numeric_id)
}

/// Distinct numeric ids referenced in `body`, in first-seen order.
pub fn referenced_ids(body: &str) -> Vec<u64> {
  let mut ids: Vec<u64> = Vec::new();

  for cap in RE_WORK_ITEM.captures_iter(body) {
    let Some(id) = cap.get(1).and_then(|m| m.as_str().parse::<u64>().ok()) else {
      continue;
    };

    if !ids.contains(&id) {
      ids.push(id);
    }
  }

  ids
}

/// URL of a `[AB#<id>](https://dev.azure.com/...)` link in `body`, if present.
/// The reference may be written with leading zeros (`AB#007`).
pub fn explicit_link(body: &str, numeric_id: u64) -> Option<String> {
  let pattern = format!(r"(?i)\[AB#0*{}\]\((https://dev\.azure\.com/[^)]+)\)", numeric_id);
  let re = Regex::new(&pattern).ok()?;

  re.captures(body).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

/// Work items referenced by a pull request body, with their links resolved.
pub fn extract_references<F>(body: &str, fallback_link: F) -> Vec<WorkItemRef>
where
  F: Fn(u64) -> String,
{
  referenced_ids(body)
    .into_iter()
    .map(|id| WorkItemRef {
      external_id: external_id(id),
      numeric_id: id,
      link: explicit_link(body, id).unwrap_or_else(|| fallback_link(id)),
    })
    .collect()
}
