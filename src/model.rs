// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the change-set and aggregation model shared by sources, the engine and rendering
// role: model/types
// outputs: Serializable structs with stable field names; GitHub API field names accepted as aliases
// invariants: Records are immutable inputs; aggregates hold exact integer sums; estimates satisfy min <= max
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Change status as reported by the upstream source. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
  Added,
  Modified,
  Removed,
  Renamed,
  Copied,
  Changed,
  #[serde(other)]
  Unknown,
}

impl FileStatus {
  /// Map a git `--name-status` code (`A`, `M`, `D`, `R100`, ...) to a status.
  pub fn from_git_code(code: &str) -> Self {
    match code.chars().next() {
      Some('A') => FileStatus::Added,
      Some('M') => FileStatus::Modified,
      Some('D') => FileStatus::Removed,
      Some('R') => FileStatus::Renamed,
      Some('C') => FileStatus::Copied,
      Some('T') => FileStatus::Changed,
      _ => FileStatus::Unknown,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChangeRecord {
  #[serde(alias = "filename")]
  pub path: String,
  #[serde(alias = "additions", default)]
  pub added: u64,
  #[serde(alias = "deletions", default)]
  pub removed: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<FileStatus>,
  #[serde(alias = "previous_filename", default, skip_serializing_if = "Option::is_none")]
  pub previous_path: Option<String>,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub binary: bool,
  /// Lines changed but no diff served (upstream collapsed it as too large to render).
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub diff_not_rendered: bool,
}

impl FileChangeRecord {
  pub fn new(path: impl Into<String>, added: u64, removed: u64) -> Self {
    Self {
      path: path.into(),
      added,
      removed,
      status: None,
      previous_path: None,
      binary: false,
      diff_not_rendered: false,
    }
  }

  pub fn with_status(mut self, status: FileStatus) -> Self {
    self.status = Some(status);
    self
  }

  /// Lines touched by this file alone (saturating).
  pub fn lines_changed(&self) -> u64 {
    self.added.saturating_add(self.removed)
  }
}

/// Running per-language bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageAggregate {
  pub added: u64,
  pub removed: u64,
  pub file_count: u64,
}

impl LanguageAggregate {
  pub fn lines_changed(&self) -> u64 {
    self.added.saturating_add(self.removed)
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
  pub total_added: u64,
  pub total_removed: u64,
  pub total_files: u64,
}

/// Output of one aggregation pass.
///
/// `first_seen` records the order in which labels were first encountered so
/// presentation can break ranking ties; it is not part of equality, so two
/// permutations of the same input compare equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationResult {
  pub per_language: BTreeMap<String, LanguageAggregate>,
  pub totals: Totals,
  pub large_file_count: u64,
  #[serde(skip)]
  pub(crate) first_seen: Vec<String>,
}

impl PartialEq for AggregationResult {
  fn eq(&self, other: &Self) -> bool {
    self.per_language == other.per_language
      && self.totals == other.totals
      && self.large_file_count == other.large_file_count
  }
}

impl Eq for AggregationResult {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTimeEstimate {
  pub min_minutes: u64,
  pub max_minutes: u64,
  pub large_file_count: u64,
}
