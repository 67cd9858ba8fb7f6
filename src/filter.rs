// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Drop machine-generated files from a change-set before aggregation
// role: pipeline/filter
// inputs: FileChangeRecord list; marker list (defaults plus user-supplied)
// outputs: Kept records and the skipped ones with the marker that fired
// invariants:
// - kept.len() + skipped.len() == input length; relative order of kept records preserved
// - Only simple textual markers: binary flag, diff-not-rendered flag, rename-without-changes, file-name markers
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;

use crate::model::{FileChangeRecord, FileStatus};

const DEFAULT_MARKERS: &[&str] = &[
  "package-lock.json",
  "yarn.lock",
  "pnpm-lock.yaml",
  "Cargo.lock",
  "Gemfile.lock",
  "poetry.lock",
  "composer.lock",
  "go.sum",
  "*.min.js",
  "*.min.css",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedReason {
  Binary,
  DiffNotRendered,
  RenamedWithoutChanges,
  Marker(String),
}

impl fmt::Display for GeneratedReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GeneratedReason::Binary => write!(f, "binary file"),
      GeneratedReason::DiffNotRendered => write!(f, "diff not rendered"),
      GeneratedReason::RenamedWithoutChanges => write!(f, "renamed without changes"),
      GeneratedReason::Marker(m) => write!(f, "matches {}", m),
    }
  }
}

#[derive(Debug, Clone)]
pub struct GeneratedFilter {
  markers: Vec<String>,
}

impl Default for GeneratedFilter {
  fn default() -> Self {
    Self { markers: DEFAULT_MARKERS.iter().map(|s| s.to_string()).collect() }
  }
}

#[derive(Debug, Default)]
pub struct Partition {
  pub kept: Vec<FileChangeRecord>,
  pub skipped: Vec<(FileChangeRecord, GeneratedReason)>,
}

impl GeneratedFilter {
  /// Default markers plus extra ones: an exact file name, or `*suffix`.
  pub fn with_markers<I, S>(extra: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let mut f = Self::default();
    f.markers.extend(extra.into_iter().map(Into::into));
    f
  }

  pub fn detect(&self, record: &FileChangeRecord) -> Option<GeneratedReason> {
    if record.binary {
      return Some(GeneratedReason::Binary);
    }

    if record.diff_not_rendered {
      return Some(GeneratedReason::DiffNotRendered);
    }

    if record.status == Some(FileStatus::Renamed) && record.lines_changed() == 0 {
      return Some(GeneratedReason::RenamedWithoutChanges);
    }

    let file_name = record.path.rsplit('/').next().unwrap_or(&record.path);

    self
      .markers
      .iter()
      .find(|m| marker_matches(m, file_name))
      .map(|m| GeneratedReason::Marker(m.clone()))
  }

  pub fn partition(&self, records: Vec<FileChangeRecord>) -> Partition {
    let mut out = Partition::default();

    for record in records {
      match self.detect(&record) {
        Some(reason) => out.skipped.push((record, reason)),
        None => out.kept.push(record),
      }
    }

    out
  }
}

fn marker_matches(marker: &str, file_name: &str) -> bool {
  match marker.strip_prefix('*') {
    Some(suffix) => !suffix.is_empty() && file_name.ends_with(suffix),
    None => file_name == marker,
  }
}
