use std::io::Read;

use serde_json::Value;

use crate::error::{SourceError, SourceResult};
use crate::model::FileChangeRecord;
use crate::source::github_api::records_from_page;
use crate::source::ChangeSetSource;

/// Change-set read from a JSON array on disk (or stdin for `-`).
///
/// Accepts both the native record shape (`path`/`added`/`removed`) and the
/// GitHub files-listing shape (`filename`/`additions`/`deletions`).
pub struct FileSource {
  path: String,
}

impl FileSource {
  pub fn new(path: impl Into<String>) -> Self {
    Self { path: path.into() }
  }

  fn read_raw(&self) -> SourceResult<String> {
    if self.path == "-" {
      let mut buf = String::new();
      std::io::stdin().read_to_string(&mut buf)?;
      return Ok(buf);
    }

    Ok(std::fs::read_to_string(&self.path)?)
  }
}

impl ChangeSetSource for FileSource {
  fn describe(&self) -> String {
    if self.path == "-" {
      "file:<stdin>".to_string()
    } else {
      format!("file:{}", self.path)
    }
  }

  fn fetch(&self) -> SourceResult<Vec<FileChangeRecord>> {
    let raw = self.read_raw()?;
    let v: Value = serde_json::from_str(&raw)?;

    if !v.is_array() {
      return Err(SourceError::Malformed(format!("{}: expected a JSON array of files", self.describe())));
    }

    records_from_page(&v)
  }
}
