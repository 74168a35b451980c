// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Release-window change aggregation: commits -> change records -> distinct pull requests -> work-item aggregates
// role: audit/aggregation
// inputs: SourceControl, Forge, WorkItemTracker; window boundaries (from exclusive, to inclusive)
// outputs: Aggregation { changes, pull_requests, work_items }
// side_effects: Gateway lookups (parallel fetches, sequential folding)
// invariants:
// - One ChangeRecord per commit in (from, to], oldest first
// - Primary pull request = first closed pull request the forge lists for the commit
// - Pull requests are distinct by number, first-seen order; non-positive numbers are dropped
// - Work-item folding is idempotent; every collection is an insertion-ordered set
// errors: None; gateway failures have already degraded to neutral values
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::actions::summary::anchor;
use crate::audit::work_items;
use crate::forge::Forge;
use crate::gitio::SourceControl;
use crate::model::{Actor, ChangeRecord, Commit, PullRequest, WorkItemAggregate, WorkItemRef};
use crate::tracker::WorkItemTracker;
use crate::util::{format_utc_date, parse_timestamp};

pub const UNKNOWN_DATE: &str = "Unknown";

/// Work-item aggregates keyed by external reference, in first-seen order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkItemMap {
  entries: Vec<WorkItemAggregate>,
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
  if !items.contains(&item) {
    items.push(item);
  }
}

fn push_unique_actor(actors: &mut Vec<Actor>, actor: &Actor) {
  let Some(name) = actor.display_name() else {
    return;
  };

  if !actors.iter().any(|a| a.display_name() == Some(name)) {
    actors.push(actor.clone());
  }
}

impl WorkItemMap {
  /// Folds one (pull request, work item) pair into the map.
  pub fn fold(&mut self, pr: &PullRequest, reference: &WorkItemRef, state: &str) {
    let idx = match self.entries.iter().position(|e| e.reference.external_id == reference.external_id) {
      Some(i) => i,
      None => {
        self.entries.push(WorkItemAggregate {
          reference: reference.clone(),
          state: state.to_string(),
          contributors: Vec::new(),
          approvers: Vec::new(),
          pull_request_numbers: Vec::new(),
          pull_request_links: Vec::new(),
        });
        self.entries.len() - 1
      }
    };

    let entry = &mut self.entries[idx];

    if let Some(author) = &pr.author {
      push_unique_actor(&mut entry.contributors, author);
    }

    for approver in &pr.approvers {
      push_unique_actor(&mut entry.approvers, approver);
    }

    push_unique(&mut entry.pull_request_numbers, pr.number);
    push_unique(&mut entry.pull_request_links, anchor(&pr.number.to_string(), &pr.html_url));
  }

  #[cfg(test)]
  pub fn get(&self, external_id: &str) -> Option<&WorkItemAggregate> {
    self.entries.iter().find(|e| e.reference.external_id == external_id)
  }

  pub fn iter(&self) -> impl Iterator<Item = &WorkItemAggregate> {
    self.entries.iter()
  }

  /// References linked to pull request `number`, in map order.
  pub fn references_for_pull(&self, number: u64) -> Vec<&WorkItemRef> {
    self.entries.iter().filter(|e| e.pull_request_numbers.contains(&number)).map(|e| &e.reference).collect()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[derive(Debug, Default, Clone)]
pub struct Aggregation {
  pub changes: Vec<ChangeRecord>,
  pub pull_requests: Vec<PullRequest>,
  pub work_items: WorkItemMap,
}

/// First closed pull request, in the order the forge returned them.
pub fn primary_pull_request(pulls: Vec<PullRequest>) -> Option<PullRequest> {
  pulls.into_iter().find(PullRequest::is_closed)
}

pub fn change_record(commit: Commit, primary_pull_request: Option<PullRequest>) -> ChangeRecord {
  let committer_display = if commit.committer.name.trim().is_empty() {
    commit.committer.email.clone()
  } else {
    commit.committer.name.clone()
  };

  let formatted_date =
    parse_timestamp(&commit.committer.date).map(format_utc_date).unwrap_or_else(|| UNKNOWN_DATE.to_string());

  ChangeRecord { commit, primary_pull_request, committer_display, formatted_date }
}

/// One-line rendering of a change: short sha, subject, committer, date and any tags.
pub fn change_line(record: &ChangeRecord) -> String {
  let commit = &record.commit;
  let short_sha: String = commit.sha.chars().take(7).collect();
  let tag = commit.tag.as_deref().map(|t| format!(" ({})", t)).unwrap_or_default();

  format!("{} {} by {} on {}{}", short_sha, commit.message, record.committer_display, record.formatted_date, tag)
}

/// Primary pull requests of `changes`, distinct by number, first-seen order.
pub fn distinct_pull_requests(changes: &[ChangeRecord]) -> Vec<PullRequest> {
  let mut out: Vec<PullRequest> = Vec::new();

  for pr in changes.iter().filter_map(|c| c.primary_pull_request.as_ref()) {
    if pr.number == 0 || out.iter().any(|p| p.number == pr.number) {
      continue;
    }
    out.push(pr.clone());
  }

  out
}

pub struct ChangeAggregator<'a> {
  git: &'a dyn SourceControl,
  forge: &'a Forge,
  tracker: &'a WorkItemTracker,
}

impl<'a> ChangeAggregator<'a> {
  pub fn new(git: &'a dyn SourceControl, forge: &'a Forge, tracker: &'a WorkItemTracker) -> Self {
    Self { git, forge, tracker }
  }

  /// Change records for `(from, to]`.
  pub fn change_records(&self, from: &str, to: &str) -> Vec<ChangeRecord> {
    let commits = self.git.list_commits(from, to);
    info!("Found {} commits between {} and {}", commits.len(), from, to);

    let pulls: Vec<Vec<PullRequest>> =
      commits.par_iter().map(|c| self.forge.pull_requests_for_commit(&c.sha)).collect();

    commits
      .into_iter()
      .zip(pulls)
      .map(|(commit, pulls)| {
        let primary = primary_pull_request(pulls);
        if primary.is_none() {
          debug!("No closed pull request found for commit {}", commit.sha);
        }
        let record = change_record(commit, primary);
        debug!("{}", change_line(&record));
        record
      })
      .collect()
  }

  /// Work-item aggregates for the given pull requests.
  pub fn work_items(&self, pulls: &[PullRequest]) -> WorkItemMap {
    let per_pull: Vec<(&PullRequest, Vec<WorkItemRef>)> = pulls
      .iter()
      .map(|pr| {
        let body = pr.body.as_deref().unwrap_or("");
        (pr, work_items::extract_references(body, |id| self.tracker.work_item_url(id)))
      })
      .collect();

    let mut ids: Vec<u64> = Vec::new();
    for (_, refs) in &per_pull {
      for r in refs {
        push_unique(&mut ids, r.numeric_id);
      }
    }

    let states: HashMap<u64, String> = ids.par_iter().map(|id| (*id, self.tracker.state(*id))).collect();

    let mut map = WorkItemMap::default();
    for (pr, refs) in &per_pull {
      for r in refs {
        let state = states.get(&r.numeric_id).map(String::as_str).unwrap_or(crate::tracker::UNKNOWN_STATE);
        map.fold(pr, r, state);
      }
    }

    map
  }

  pub fn aggregate(&self, from: &str, to: &str) -> Aggregation {
    let changes = self.change_records(from, to);
    let pull_requests = distinct_pull_requests(&changes);
    let work_items = self.work_items(&pull_requests);

    info!(
      "Aggregated {} changes, {} pull requests, {} work items",
      changes.len(),
      pull_requests.len(),
      work_items.len()
    );

    Aggregation { changes, pull_requests, work_items }
  }
}
