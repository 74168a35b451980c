// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Extension traits over third-party types used by the fixture-backed gateways
// role: module/aggregation
// outputs: JsonFetch for RA_TEST_* fixture payloads
// invariants: No side effects
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod serde_json;
