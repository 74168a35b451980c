// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Install the tracing subscriber; render events as GitHub workflow commands on stdout
// role: observability/logging
// inputs: RUST_LOG, ACTIONS_STEP_DEBUG
// outputs: One stdout line per event: "::warning::", "::error::", "::debug::" prefixes, plain text for info
// invariants:
// - Message data is escaped (% CR LF) so a multi-line message stays one workflow command
// - init() is idempotent; later calls are no-ops
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber for this process.
pub fn init() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives()));

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stdout)
    .event_format(WorkflowCommandFormat)
    .try_init();
}

/// `ACTIONS_STEP_DEBUG=true` (runner debug logging) lowers our level to debug.
fn default_directives() -> String {
  let debug = std::env::var("ACTIONS_STEP_DEBUG").map(|v| v.trim().eq_ignore_ascii_case("true")).unwrap_or(false);

  format!("warn,release_actions={}", if debug { "debug" } else { "info" })
}

pub struct WorkflowCommandFormat;

impl<S, N> FormatEvent<S, N> for WorkflowCommandFormat
where
  S: Subscriber + for<'a> LookupSpan<'a>,
  N: for<'a> FormatFields<'a> + 'static,
{
  fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
    let mut message = String::new();
    ctx.field_format().format_fields(Writer::new(&mut message), event)?;

    writeln!(writer, "{}", render_line(*event.metadata().level(), &message))
  }
}

fn command_for(level: Level) -> Option<&'static str> {
  match level {
    Level::ERROR => Some("error"),
    Level::WARN => Some("warning"),
    Level::DEBUG | Level::TRACE => Some("debug"),
    _ => None,
  }
}

pub fn render_line(level: Level, message: &str) -> String {
  match command_for(level) {
    Some(cmd) => format!("::{}::{}", cmd, escape_data(message)),
    None => message.to_string(),
  }
}

/// Escapes workflow command data.
pub fn escape_data(s: &str) -> String {
  s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}
