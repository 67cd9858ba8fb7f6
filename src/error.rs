use thiserror::Error;

pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Failures of a change-set source. Never folded into an empty change-set.
#[derive(Error, Debug)]
pub enum SourceError {
  #[error("GitHub API rate limit reached: {message}. Try again later or set GITHUB_TOKEN")]
  RateLimited { message: String },
  #[error("GitHub API rejected the credentials (HTTP {status}): {message}")]
  Unauthorized { status: u16, message: String },
  #[error("Not found: {url}")]
  NotFound { url: String },
  #[error("HTTP {status} from {url}")]
  Http { status: u16, url: String },
  #[error("Network error: {0}")]
  Transport(String),
  #[error("Malformed response: {0}")]
  Malformed(String),
  #[error("Git error: {0}")]
  Git(String),
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
  #[error("Serialization error: {0}")]
  Serde(#[from] serde_json::Error),
}

impl SourceError {
  /// Fatal errors stop a fallback chain; retrying elsewhere would hide them.
  pub fn is_fatal(&self) -> bool {
    matches!(self, SourceError::RateLimited { .. } | SourceError::Unauthorized { .. })
  }

  /// Worth retrying against the same endpoint.
  pub fn is_transient(&self) -> bool {
    match self {
      SourceError::Transport(_) => true,
      SourceError::Http { status, .. } => *status >= 500,
      _ => false,
    }
  }
}
