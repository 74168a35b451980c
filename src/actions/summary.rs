// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Job-summary buffer builder (raw text, breaks, links, headings, tables) and writer for $GITHUB_STEP_SUMMARY
// role: actions/summary
// inputs: Text fragments and table rows
// outputs: HTML fragment string; appended summary file
// side_effects: write() appends to the summary file
// invariants:
// - Every block element is followed by a newline
// - Empty data cells render as "-"
// errors: I/O failures writing the summary file
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

pub const EMPTY_CELL: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCell {
  Header(String),
  Data(String),
}

/// A header row followed by data rows; empty data renders as [`EMPTY_CELL`].
pub fn table_rows(headers: &[&str], rows: Vec<Vec<String>>) -> Vec<Vec<TableCell>> {
  let mut out = Vec::with_capacity(rows.len() + 1);
  out.push(headers.iter().map(|h| TableCell::Header(h.to_string())).collect());

  for row in rows {
    out.push(
      row
        .into_iter()
        .map(|cell| TableCell::Data(if cell.trim().is_empty() { EMPTY_CELL.to_string() } else { cell }))
        .collect(),
    );
  }

  out
}

/// `<a href="href">text</a>`
pub fn anchor(text: &str, href: &str) -> String {
  format!("<a href=\"{}\">{}</a>", href, text)
}

#[derive(Debug, Default, Clone)]
pub struct Summary {
  buffer: String,
}

impl Summary {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_raw(&mut self, text: &str) -> &mut Self {
    self.buffer.push_str(text);
    self
  }

  pub fn add_eol(&mut self) -> &mut Self {
    self.buffer.push('\n');
    self
  }

  pub fn add_break(&mut self) -> &mut Self {
    self.add_raw("<br>").add_eol()
  }

  pub fn add_link(&mut self, text: &str, href: &str) -> &mut Self {
    self.add_raw(&anchor(text, href)).add_eol()
  }

  pub fn add_heading(&mut self, text: &str, level: u8) -> &mut Self {
    let level = level.clamp(1, 6);
    self.add_raw(&format!("<h{}>{}</h{}>", level, text, level)).add_eol()
  }

  pub fn add_table(&mut self, rows: &[Vec<TableCell>]) -> &mut Self {
    let mut html = String::from("<table>");

    for row in rows {
      html.push_str("<tr>");
      for cell in row {
        match cell {
          TableCell::Header(t) => html.push_str(&format!("<th>{}</th>", t)),
          TableCell::Data(t) => html.push_str(&format!("<td>{}</td>", t)),
        }
      }
      html.push_str("</tr>");
    }

    html.push_str("</table>");
    self.add_raw(&html).add_eol()
  }

  pub fn stringify(&self) -> &str {
    &self.buffer
  }

  /// Appends the buffer to the job summary file.
  pub fn write(&self, path: &Path) -> Result<()> {
    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .with_context(|| format!("opening job summary {}", path.display()))?;

    file
      .write_all(self.buffer.as_bytes())
      .with_context(|| format!("writing job summary {}", path.display()))
  }
}
