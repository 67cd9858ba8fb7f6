// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Change-set sources (GitHub API, local git, JSON file) behind one trait, plus an ordered fallback chain
// role: sources/namespace
// outputs: FileChangeRecord lists or a typed SourceError
// invariants:
// - A failed fetch is an error, never an empty list
// - Chain: first Ok wins; fatal errors (rate limit, auth) stop the chain; others fall through
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod file;
pub mod git;
pub mod github_api;

use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};
use crate::model::FileChangeRecord;

pub trait ChangeSetSource {
  /// Short label for logs and the report header, e.g. `github:owner/repo#12`.
  fn describe(&self) -> String;
  fn fetch(&self) -> SourceResult<Vec<FileChangeRecord>>;
}

/// Ordered list of sources tried until one produces a change-set.
pub struct SourceChain {
  sources: Vec<Box<dyn ChangeSetSource>>,
}

impl SourceChain {
  pub fn new(sources: Vec<Box<dyn ChangeSetSource>>) -> Self {
    Self { sources }
  }
}

impl ChangeSetSource for SourceChain {
  fn describe(&self) -> String {
    self.sources.iter().map(|s| s.describe()).collect::<Vec<_>>().join(" -> ")
  }

  fn fetch(&self) -> SourceResult<Vec<FileChangeRecord>> {
    let mut last_err: Option<SourceError> = None;

    for source in &self.sources {
      match source.fetch() {
        Ok(records) => {
          debug!(source = %source.describe(), files = records.len(), "change-set fetched");
          return Ok(records);
        }
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
          warn!(source = %source.describe(), error = %e, "source failed, trying next");
          last_err = Some(e);
        }
      }
    }

    Err(last_err.unwrap_or_else(|| SourceError::Malformed("no change-set source configured".into())))
  }
}
