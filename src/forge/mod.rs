// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Forge gateway (GitHub): raw API seam plus the best-effort service both actions call
// role: gateway/forge
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod github;
pub mod github_api;

#[cfg(test)]
pub mod fake;

pub use github::Forge;
