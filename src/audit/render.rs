// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Render the release audit job summary (header lines, compare link, work-item and pull-request tables)
// role: audit/render
// inputs: Aggregation; window boundaries (sha + optional tag); pre-release and release-notes flags; repository URL; now
// outputs: Summary buffer
// invariants:
// - Titles are truncated to 50 chars then HTML-encoded
// - Pre-release runs compare against the sha, never the release tag
// - Empty tables are replaced by a placeholder line
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};

use crate::actions::summary::{anchor, table_rows};
use crate::actions::Summary;
use crate::audit::aggregate::Aggregation;
use crate::model::{Actor, PullRequest};
use crate::util::{format_utc_date, html_encode, short_sha, truncate};

pub const TITLE_MAX_CHARS: usize = 50;

pub const WORK_ITEM_HEADERS: [&str; 5] = ["Work Item", "State", "Pull Request(s)", "Contributor(s)", "Approver(s)"];
pub const PULL_REQUEST_HEADERS: [&str; 4] = ["ID - Title", "Work Item(s)", "Contributor(s)", "Approver(s)"];

pub struct ReportInput<'a> {
  pub aggregation: &'a Aggregation,
  pub from_sha: &'a str,
  pub from_tag: Option<&'a str>,
  pub to_sha: &'a str,
  pub to_tag: Option<&'a str>,
  pub pre_release: bool,
  pub add_release_notes_link: bool,
  /// `<server>/<owner>/<repo>`
  pub repository_url: &'a str,
  pub now: DateTime<Utc>,
}

fn actor_cell(actor: &Actor) -> Option<String> {
  let name = html_encode(actor.display_name()?);

  Some(match actor.html_url.as_deref().filter(|u| !u.is_empty()) {
    Some(url) => anchor(&name, url),
    None => name,
  })
}

fn actors_cell(actors: &[Actor]) -> String {
  actors.iter().filter_map(actor_cell).collect::<Vec<_>>().join(", ")
}

fn pull_request_title(pr: &PullRequest) -> String {
  let title = format!("#{} - {}", pr.number, html_encode(&truncate(&pr.title, TITLE_MAX_CHARS)));
  anchor(&title, &pr.html_url)
}

fn work_item_rows(input: &ReportInput) -> Vec<Vec<String>> {
  input
    .aggregation
    .work_items
    .iter()
    .map(|w| {
      vec![
        anchor(&w.reference.external_id, &w.reference.link),
        w.state.clone(),
        w.pull_request_links.join(", "),
        actors_cell(&w.contributors),
        actors_cell(&w.approvers),
      ]
    })
    .collect()
}

fn pull_request_rows(input: &ReportInput) -> Vec<Vec<String>> {
  input
    .aggregation
    .pull_requests
    .iter()
    .map(|pr| {
      let work_items = input
        .aggregation
        .work_items
        .references_for_pull(pr.number)
        .into_iter()
        .map(|r| anchor(&r.external_id, &r.link))
        .collect::<Vec<_>>()
        .join(", ");

      vec![
        pull_request_title(pr),
        work_items,
        pr.author.as_ref().and_then(actor_cell).unwrap_or_default(),
        actors_cell(&pr.approvers),
      ]
    })
    .collect()
}

pub fn render_summary(input: &ReportInput) -> Summary {
  let short_from = short_sha(input.from_sha);
  let short_to = short_sha(input.to_sha);

  // Pre-releases are not tagged yet, so the tag is only a target for full releases.
  let released_tag = input.to_tag.filter(|_| !input.pre_release);

  let compare_url = format!(
    "{}/compare/{}...{}",
    input.repository_url,
    input.from_tag.unwrap_or(input.from_sha),
    released_tag.unwrap_or(input.to_sha)
  );

  let mut s = Summary::new();
  s.add_raw(&format!("🧬 SHA: {}", short_to)).add_break();

  if let Some(tag) = input.to_tag.filter(|_| input.add_release_notes_link) {
    s.add_raw(&format!("🏷️ Release Tag: {}", tag)).add_break();

    if !input.pre_release {
      let release_url = format!("{}/releases/tag/{}", input.repository_url, tag);
      s.add_raw(&format!("🚀 Released On: {}", format_utc_date(input.now)))
        .add_break()
        .add_link("🔗 Go to Release", &release_url)
        .add_break();
    }
  }

  s.add_link(&format!("🔗 Compare Changes ({} total)", input.aggregation.changes.len()), &compare_url)
    .add_break()
    .add_raw(&format!(
      "🔍 Comparing {} to {}",
      input.from_tag.map(String::from).unwrap_or(short_from),
      released_tag.map(String::from).unwrap_or(short_to)
    ))
    .add_break()
    .add_heading("Work Items", 2);

  if input.aggregation.work_items.is_empty() {
    s.add_raw("No work items found.").add_break();
  } else {
    s.add_table(&table_rows(&WORK_ITEM_HEADERS, work_item_rows(input)));
  }

  s.add_heading("Pull Requests", 2);

  let rows = pull_request_rows(input);
  if rows.is_empty() {
    s.add_raw("No pull requests found.").add_break();
  } else {
    s.add_table(&table_rows(&PULL_REQUEST_HEADERS, rows));
  }

  s
}
