// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: GitHub Actions runtime surface: run context, outputs, job summary, action.yml generation
// role: actions/runtime
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod context;
pub mod manifest;
pub mod outputs;
pub mod summary;

pub use self::context::ActionContext;
pub use self::outputs::Outputs;
pub use self::summary::Summary;
