// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Build a change-set from a local repository diff (base...head) without touching the network
// role: sources/git
// inputs: Repo path; base and head revisions
// outputs: FileChangeRecord per changed path, status and rename origin from --name-status
// side_effects: Spawns `git diff` subprocesses
// invariants:
// - Three-dot range: changes on head since its merge base with base, like a pull request
// - Binary numstat rows (`-\t-`) become 0/0 with binary=true
// - Output order follows git's numstat order
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use crate::error::{SourceError, SourceResult};
use crate::model::{FileChangeRecord, FileStatus};
use crate::source::ChangeSetSource;
use crate::util::run_git;

pub struct GitSource {
  repo: String,
  base: String,
  head: String,
}

impl GitSource {
  pub fn new(repo: impl Into<String>, base: impl Into<String>, head: impl Into<String>) -> Self {
    Self { repo: repo.into(), base: base.into(), head: head.into() }
  }

  fn range(&self) -> String {
    format!("{}...{}", self.base, self.head)
  }

  fn git(&self, args: Vec<String>) -> SourceResult<String> {
    run_git(&self.repo, &args).map_err(|e| SourceError::Git(format!("{:#}", e)))
  }
}

impl ChangeSetSource for GitSource {
  fn describe(&self) -> String {
    format!("git:{}", self.range())
  }

  fn fetch(&self) -> SourceResult<Vec<FileChangeRecord>> {
    let base_args = |mode: &str| -> Vec<String> {
      vec!["diff".into(), mode.into(), "-z".into(), "-M".into(), "--no-color".into(), self.range()]
    };

    let numstat = self.git(base_args("--numstat"))?;
    let name_status = self.git(base_args("--name-status"))?;

    let statuses: HashMap<String, FileStatus> = parse_name_status(&name_status).into_iter().collect();
    let mut records = parse_numstat_z(&numstat)?;

    for r in &mut records {
      r.status = statuses.get(&r.path).copied().or(r.status);
    }

    tracing::debug!(range = %self.range(), files = records.len(), "git diff parsed");
    Ok(records)
  }
}

/// Parse `git diff --numstat -z -M` output.
///
/// Plain rows are `added\tremoved\tpath\0`; renames are `added\tremoved\t\0old\0new\0`.
pub fn parse_numstat_z(out: &str) -> SourceResult<Vec<FileChangeRecord>> {
  let parts: Vec<&str> = out.split('\u{0}').collect();
  let mut res = Vec::new();
  let mut i = 0;

  while i < parts.len() {
    let row = parts[i];
    i += 1;

    if row.is_empty() {
      continue;
    }

    let mut cols = row.splitn(3, '\t');
    let (Some(a), Some(d), Some(path)) = (cols.next(), cols.next(), cols.next()) else {
      return Err(SourceError::Git(format!("unexpected numstat row: {:?}", row)));
    };

    let binary = a == "-" && d == "-";
    let to_int = |s: &str| -> SourceResult<u64> {
      if s == "-" {
        return Ok(0);
      }
      s.parse::<u64>().map_err(|_| SourceError::Git(format!("bad numstat count {:?}", s)))
    };

    let mut record = if path.is_empty() {
      if i + 1 >= parts.len() {
        return Err(SourceError::Git("truncated rename in numstat output".into()));
      }
      let old = parts[i];
      let new = parts[i + 1];
      i += 2;

      let mut r = FileChangeRecord::new(new, to_int(a)?, to_int(d)?).with_status(FileStatus::Renamed);
      r.previous_path = Some(old.to_string());
      r
    } else {
      FileChangeRecord::new(path, to_int(a)?, to_int(d)?)
    };

    record.binary = binary;
    res.push(record);
  }

  Ok(res)
}

/// Parse `git diff --name-status -z -M` output into (path, status) pairs keyed by the new path.
pub fn parse_name_status(out: &str) -> Vec<(String, FileStatus)> {
  let parts: Vec<&str> = out.split('\u{0}').collect();
  let mut res = Vec::new();
  let mut i = 0;

  while i < parts.len() && !parts[i].is_empty() {
    let code = parts[i];
    i += 1;

    if code.starts_with('R') || code.starts_with('C') {
      if i + 1 >= parts.len() {
        break;
      }
      res.push((parts[i + 1].to_string(), FileStatus::from_git_code(code)));
      i += 2;
    } else {
      if i >= parts.len() {
        break;
      }
      let p = parts[i];
      i += 1;

      if !p.is_empty() {
        res.push((p.to_string(), FileStatus::from_git_code(code)));
      }
    }
  }

  res
}
