// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Library surface for per-language change statistics and review-time estimation of pull requests
// role: crate/root
// outputs: Public modules; the binary in main.rs is a thin CLI over `run`
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod cli;
pub mod error;
pub mod filter;
pub mod language;
pub mod model;
pub mod render;
pub mod review;
pub mod run;
pub mod source;
pub mod stats;
pub mod util;

pub use language::classify;
pub use review::estimate_review_time;
pub use stats::aggregate;
