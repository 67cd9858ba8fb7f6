// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Estimate reviewer time (minutes) from per-language line totals and the large-file count
// role: engine/estimation
// inputs: AggregationResult (in-memory; no IO)
// outputs: ReviewTimeEstimate with integer min/max bounds
// invariants:
// - Deterministic math; min_minutes <= max_minutes; never panics
// - Empty input still yields the floor estimate (1..3 minutes with defaults)
// - Policy constants are data (ReviewPolicy), defaults reproduce the published table
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::model::{AggregationResult, ReviewTimeEstimate};

/// Estimate with the default policy.
pub fn estimate_review_time(result: &AggregationResult) -> ReviewTimeEstimate {
  ReviewPolicy::default().estimate(result)
}

/// Knobs for the review-time formula. Heuristic values, not derived constants.
#[derive(Debug, Clone)]
pub struct ReviewPolicy {
  pub lines_per_minute: f64,
  pub large_file_overhead_min: f64,
  pub floor_min: f64,
  pub buffer_factor: f64,
  pub low_factor: f64,
  pub high_factor: f64,
  pub default_multiplier: f64,
  pub multipliers: Vec<(&'static str, f64)>,
}

impl Default for ReviewPolicy {
  fn default() -> Self {
    Self {
      lines_per_minute: 175.0,
      large_file_overhead_min: 5.0,
      floor_min: 2.0,
      buffer_factor: 1.2,
      low_factor: 0.8,
      high_factor: 1.2,
      default_multiplier: 1.0,
      multipliers: vec![
        ("Rust", 1.5),
        ("C", 1.4),
        ("C++", 1.4),
        ("Go", 1.3),
        ("Java", 1.2),
        ("TypeScript", 1.1),
        ("Python", 1.0),
        ("JavaScript", 1.0),
        ("HTML", 0.7),
        ("CSS", 0.7),
        ("Markdown", 0.5),
        ("JSON", 0.3),
        ("YAML", 0.3),
        ("Other", 1.0),
      ],
    }
  }
}

impl ReviewPolicy {
  pub fn with_lines_per_minute(mut self, rate: f64) -> Self {
    self.lines_per_minute = rate;
    self
  }

  /// Complexity multiplier for a language label.
  pub fn multiplier(&self, label: &str) -> f64 {
    self
      .multipliers
      .iter()
      .find(|(l, _)| *l == label)
      .map(|(_, m)| *m)
      .unwrap_or(self.default_multiplier)
  }

  /// Unrounded minutes after floor and buffer; `estimate` derives the bounds from this.
  pub fn buffered_minutes(&self, result: &AggregationResult) -> f64 {
    // Phase 1: per-language reading time
    let rate = if self.lines_per_minute > 0.0 { self.lines_per_minute } else { 1.0 };
    let mut minutes = 0.0f64;

    for (label, bucket) in &result.per_language {
      minutes += (bucket.lines_changed() as f64 / rate) * self.multiplier(label);
    }

    // Phase 2: large-file overhead
    minutes += result.large_file_count as f64 * self.large_file_overhead_min;

    // Phase 3: floor, then buffer
    minutes = minutes.max(self.floor_min);
    minutes * self.buffer_factor
  }

  pub fn estimate(&self, result: &AggregationResult) -> ReviewTimeEstimate {
    let minutes = self.buffered_minutes(result);

    let min_minutes = (minutes * self.low_factor).floor().max(0.0) as u64;
    let max_minutes = ((minutes * self.high_factor).ceil().max(0.0) as u64).max(min_minutes);

    ReviewTimeEstimate { min_minutes, max_minutes, large_file_count: result.large_file_count }
  }
}
