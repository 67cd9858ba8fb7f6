// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fold file-change records into per-language totals, overall totals and a large-file count
// role: engine/aggregation
// inputs: Any finite sequence of FileChangeRecord (empty allowed)
// outputs: A freshly built AggregationResult per call (no retained state)
// invariants:
// - sum(file_count) == totals.total_files == number of input records
// - totals are exact integer sums of the contributing records
// - result is independent of input order (equality ignores first-seen order)
// - large_file_count counts individual records above the threshold, never buckets
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::language::classify;
use crate::model::{AggregationResult, FileChangeRecord, LanguageAggregate, Totals};

/// Files whose own `added + removed` exceeds this are "large".
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 500;

/// Aggregate with the default large-file threshold.
pub fn aggregate<'a, I>(records: I) -> AggregationResult
where
  I: IntoIterator<Item = &'a FileChangeRecord>,
{
  Aggregator::default().aggregate(records)
}

#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
  pub large_file_threshold: u64,
}

impl Default for Aggregator {
  fn default() -> Self {
    Self { large_file_threshold: DEFAULT_LARGE_FILE_THRESHOLD }
  }
}

impl Aggregator {
  pub fn new(large_file_threshold: u64) -> Self {
    Self { large_file_threshold }
  }

  pub fn aggregate<'a, I>(&self, records: I) -> AggregationResult
  where
    I: IntoIterator<Item = &'a FileChangeRecord>,
  {
    let mut result = AggregationResult::default();

    for record in records {
      let label = classify(&record.path);

      if !result.per_language.contains_key(label) {
        result.first_seen.push(label.to_string());
      }

      let bucket = result.per_language.entry(label.to_string()).or_default();

      bucket.added = bucket.added.saturating_add(record.added);
      bucket.removed = bucket.removed.saturating_add(record.removed);
      bucket.file_count += 1;

      if record.lines_changed() > self.large_file_threshold {
        result.large_file_count += 1;
      }
    }

    result.totals = result.per_language.values().fold(Totals::default(), |mut acc, b| {
      acc.total_added = acc.total_added.saturating_add(b.added);
      acc.total_removed = acc.total_removed.saturating_add(b.removed);
      acc.total_files += b.file_count;
      acc
    });

    result
  }
}

impl AggregationResult {
  /// Buckets sorted by lines changed (descending); ties keep first-seen order.
  pub fn ranked(&self) -> Vec<(&str, &LanguageAggregate)> {
    let mut rows: Vec<(&str, &LanguageAggregate)> = self
      .first_seen
      .iter()
      .filter_map(|label| self.per_language.get_key_value(label.as_str()))
      .map(|(k, v)| (k.as_str(), v))
      .collect();

    // Results built by hand or deserialized carry no encounter order.
    if rows.len() != self.per_language.len() {
      rows = self.per_language.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }

    rows.sort_by(|a, b| b.1.lines_changed().cmp(&a.1.lines_changed()));
    rows
  }

  /// Percentage of all changed lines that fall in `label`, or None when nothing changed.
  pub fn share_of(&self, label: &str) -> Option<f64> {
    let total = self.totals.total_added.saturating_add(self.totals.total_removed);

    if total == 0 {
      return None;
    }

    let lines = self.per_language.get(label).map(|b| b.lines_changed()).unwrap_or(0);
    Some(lines as f64 * 100.0 / total as f64)
  }
}
