// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fetch the changed-files listing of a GitHub pull request (paginated REST), with token discovery and retries
// role: sources/github-api
// inputs: PrRef; env GITHUB_TOKEN / GH_TOKEN / GITHUB_API_URL; optional `gh` CLI for token fallback; repo path for origin detection
// outputs: FileChangeRecord lists (one per changed file)
// side_effects: Network calls to the GitHub API; spawns `gh` and `git` subprocesses when needed
// invariants:
// - Pagination stops on a short page or at max_pages; the loop always terminates
// - 403/429 or a "rate limit" body message surface as RateLimited, never as an empty list
// - Only transport errors and 5xx are retried, with bounded exponential backoff
// - PLS_TEST_FILES_JSON replaces HTTP with an env-backed listing (tests)
// errors: Typed SourceError; callers decide whether to fall back
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};
use crate::model::{FileChangeRecord, FileStatus};
use crate::source::ChangeSetSource;
use crate::util::run_git;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_PER_PAGE: u32 = 100;
pub const DEFAULT_MAX_PAGES: u32 = 10;
const ENV_FIXTURE: &str = "PLS_TEST_FILES_JSON";

/// A pull request coordinate: `owner/name#number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrRef {
  pub owner: String,
  pub name: String,
  pub number: u64,
}

impl fmt::Display for PrRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}#{}", self.owner, self.name, self.number)
  }
}

impl PrRef {
  /// Parse `owner/name#123` or a pull request URL (`https://github.com/owner/name/pull/123/files`).
  pub fn parse(input: &str) -> Option<PrRef> {
    static RE_SHORT: Lazy<Regex> =
      Lazy::new(|| Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)#(\d+)$").unwrap());
    static RE_URL: Lazy<Regex> =
      Lazy::new(|| Regex::new(r"^https?://[^/]+/([^/]+)/([^/]+)/pull/(\d+)(?:[/?#].*)?$").unwrap());

    let s = input.trim();
    let caps = RE_SHORT.captures(s).or_else(|| RE_URL.captures(s))?;

    Some(PrRef {
      owner: caps.get(1)?.as_str().to_string(),
      name: caps.get(2)?.as_str().to_string(),
      number: caps.get(3)?.as_str().parse().ok()?,
    })
  }
}

/// Parse `remote.origin.url` to extract (owner, repo) when hosted on GitHub.
pub fn parse_origin_github(repo: &str) -> Option<(String, String)> {
  static RE_ORIGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:git@github\.com:|https?://github\.com/)([^/]+)/([^/]+?)(?:\.git)?$").unwrap());

  let url = run_git(repo, &["config".into(), "--get".into(), "remote.origin.url".into()]).ok()?;
  let caps = RE_ORIGIN.captures(url.trim())?;

  Some((caps.get(1)?.as_str().to_string(), caps.get(2)?.as_str().to_string()))
}

/// Discover a GitHub token: env vars first, then `gh auth token` if available.
pub fn get_github_token() -> Option<String> {
  for key in ["GITHUB_TOKEN", "GH_TOKEN"] {
    if let Ok(t) = std::env::var(key) {
      if !t.trim().is_empty() {
        return Some(t.trim().to_string());
      }
    }
  }

  if let Ok(output) = std::process::Command::new("gh").args(["auth", "token"]).output() {
    if output.status.success() {
      let t = String::from_utf8_lossy(&output.stdout).trim().to_string();

      if !t.is_empty() {
        return Some(t);
      }
    }
  }

  None
}

pub fn api_base_url() -> String {
  match std::env::var("GITHUB_API_URL") {
    Ok(u) if !u.trim().is_empty() => u.trim().trim_end_matches('/').to_string(),
    _ => DEFAULT_API_URL.to_string(),
  }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self { max_attempts: 3, initial_backoff: Duration::from_millis(500) }
  }
}

// --- Trait seam for the GitHub API ---
pub trait GithubApi {
  /// One page of `GET /repos/{owner}/{name}/pulls/{number}/files`, as raw JSON.
  fn list_pull_files_page(&self, pr: &PrRef, page: u32, per_page: u32) -> SourceResult<Value>;
}

pub struct GithubHttpApi {
  base_url: String,
  token: Option<String>,
  agent: ureq::Agent,
  retry: RetryPolicy,
}

impl GithubHttpApi {
  pub fn new(base_url: String, token: Option<String>, timeout: Duration, retry: RetryPolicy) -> Self {
    let agent = ureq::AgentBuilder::new()
      .timeout(timeout)
      .user_agent(concat!("pr-language-stats/", env!("CARGO_PKG_VERSION")))
      .build();

    Self { base_url, token, agent, retry }
  }

  fn get_json_once(&self, url: &str) -> SourceResult<Value> {
    let mut req = self.agent.get(url).set("Accept", "application/vnd.github+json");

    if let Some(t) = &self.token {
      req = req.set("Authorization", &format!("Bearer {}", t));
    }

    match req.call() {
      Ok(resp) => resp
        .into_json::<Value>()
        .map_err(|e| SourceError::Malformed(format!("{}: {}", url, e))),
      Err(ureq::Error::Status(status, resp)) => {
        let body = resp.into_json::<Value>().ok();
        Err(classify_status(status, url, body.as_ref()))
      }
      Err(ureq::Error::Transport(t)) => Err(SourceError::Transport(t.to_string())),
    }
  }

  fn get_json(&self, url: &str) -> SourceResult<Value> {
    let mut delay = self.retry.initial_backoff;
    let mut attempt = 1;

    loop {
      match self.get_json_once(url) {
        Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
          warn!(url, attempt, error = %e, "transient GitHub API failure, retrying");
          std::thread::sleep(delay);
          delay = delay.saturating_mul(2);
          attempt += 1;
        }
        other => return other,
      }
    }
  }
}

impl GithubApi for GithubHttpApi {
  fn list_pull_files_page(&self, pr: &PrRef, page: u32, per_page: u32) -> SourceResult<Value> {
    let url = format!(
      "{}/repos/{}/{}/pulls/{}/files?per_page={}&page={}",
      self.base_url, pr.owner, pr.name, pr.number, per_page, page
    );
    self.get_json(&url)
  }
}

/// Serves the listing in `PLS_TEST_FILES_JSON`, paged like the real endpoint.
struct GithubEnvApi;

impl GithubApi for GithubEnvApi {
  fn list_pull_files_page(&self, _pr: &PrRef, page: u32, per_page: u32) -> SourceResult<Value> {
    let raw = std::env::var(ENV_FIXTURE).map_err(|_| SourceError::Malformed(format!("{} is not set", ENV_FIXTURE)))?;
    let v: Value = serde_json::from_str(&raw)?;

    let items = match v {
      Value::Array(items) => items,
      // Error-shaped payloads (e.g. rate limit messages) are returned as-is.
      other => return Ok(other),
    };

    let start = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
    let end = start.saturating_add(per_page as usize).min(items.len());
    let slice = if start < items.len() { items[start..end].to_vec() } else { Vec::new() };

    Ok(Value::Array(slice))
  }
}

fn env_wants_mock() -> bool {
  std::env::var(ENV_FIXTURE).is_ok()
}

/// Select the API backend: env fixture when present, HTTP otherwise.
pub fn build_api(base_url: String, token: Option<String>, timeout: Duration, retry: RetryPolicy) -> Box<dyn GithubApi> {
  if env_wants_mock() {
    debug!("using {} fixture instead of HTTP", ENV_FIXTURE);
    Box::new(GithubEnvApi)
  } else {
    Box::new(GithubHttpApi::new(base_url, token, timeout, retry))
  }
}

fn body_message(body: Option<&Value>) -> Option<String> {
  body?.get("message")?.as_str().map(|s| s.to_string())
}

fn classify_status(status: u16, url: &str, body: Option<&Value>) -> SourceError {
  match status {
    403 | 429 => SourceError::RateLimited {
      message: body_message(body).unwrap_or_else(|| "Rate limit exceeded".to_string()),
    },
    401 => SourceError::Unauthorized {
      status,
      message: body_message(body).unwrap_or_else(|| "Bad credentials".to_string()),
    },
    404 => SourceError::NotFound { url: url.to_string() },
    _ => SourceError::Http { status, url: url.to_string() },
  }
}

/// Convert one page of API JSON into records, detecting error-shaped bodies.
pub fn records_from_page(v: &Value) -> SourceResult<Vec<FileChangeRecord>> {
  let Some(items) = v.as_array() else {
    return Err(match body_message(Some(v)) {
      Some(m) if m.to_ascii_lowercase().contains("rate limit") => SourceError::RateLimited { message: m },
      Some(m) => SourceError::Malformed(m),
      None => SourceError::Malformed("expected an array of changed files".into()),
    });
  };

  let mut out = Vec::with_capacity(items.len());

  for item in items {
    let mut record: FileChangeRecord = serde_json::from_value(item.clone())?;

    // The listing omits `patch` for binary files and for diffs too large to render.
    if item.get("filename").is_some() && item.get("patch").is_none() {
      if item.get("binary").is_none() {
        record.binary = record.lines_changed() == 0 && record.status != Some(FileStatus::Renamed);
      }
      if item.get("diff_not_rendered").is_none() {
        record.diff_not_rendered = record.lines_changed() > 0;
      }
    }

    out.push(record);
  }

  Ok(out)
}

pub struct GithubSource {
  api: Box<dyn GithubApi>,
  pr: PrRef,
  per_page: u32,
  max_pages: u32,
}

impl GithubSource {
  pub fn new(api: Box<dyn GithubApi>, pr: PrRef, max_pages: u32) -> Self {
    Self { api, pr, per_page: DEFAULT_PER_PAGE, max_pages: max_pages.max(1) }
  }

  pub fn with_per_page(mut self, per_page: u32) -> Self {
    self.per_page = per_page.max(1);
    self
  }
}

impl ChangeSetSource for GithubSource {
  fn describe(&self) -> String {
    format!("github:{}", self.pr)
  }

  fn fetch(&self) -> SourceResult<Vec<FileChangeRecord>> {
    let mut out: Vec<FileChangeRecord> = Vec::new();

    for page in 1..=self.max_pages {
      let v = self.api.list_pull_files_page(&self.pr, page, self.per_page)?;
      let batch = records_from_page(&v)?;
      let n = batch.len();

      out.extend(batch);
      debug!(pr = %self.pr, page, files = n, total = out.len(), "fetched files page");

      if n < self.per_page as usize {
        return Ok(out);
      }
    }

    warn!(pr = %self.pr, max_pages = self.max_pages, files = out.len(), "page limit reached; listing may be truncated");
    Ok(out)
  }
}
