use anyhow::{bail, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::render::OutputFormat;
use crate::source::github_api::{parse_origin_github, PrRef, DEFAULT_MAX_PAGES};
use crate::stats::DEFAULT_LARGE_FILE_THRESHOLD;
use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "pr-language-stats",
    version,
    about = "Summarize a pull request's changed lines per language and estimate review time",
    long_about = None
)]
pub struct Cli {
  /// Pull request: owner/repo#123, a pull request URL, or a bare number (uses the origin remote)
  #[arg(long)]
  pub pr: Option<String>,

  /// Path to a Git repository (default: current dir)
  #[arg(long, default_value = ".")]
  pub repo: PathBuf,

  /// Local diff base revision; with --pr it is used as a fallback when the API is unreachable
  #[arg(long)]
  pub base: Option<String>,

  /// Local diff head revision (requires --base)
  #[arg(long)]
  pub head: Option<String>,

  /// Read the change-set from a JSON array of files ("-" for stdin)
  #[arg(long)]
  pub files: Option<String>,

  /// Skip generated files (lockfiles, minified bundles, binaries, pure renames)
  #[arg(long)]
  pub exclude_generated: bool,

  /// Extra generated-file marker: exact file name or "*suffix" (repeatable; implies --exclude-generated)
  #[arg(long = "generated-marker", value_name = "MARKER")]
  pub generated_marker: Vec<String>,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
  pub format: OutputFormat,

  /// Output location: file path or "-" for stdout
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Reviewer reading speed used by the estimate
  #[arg(long, default_value_t = 175.0)]
  pub lines_per_minute: f64,

  /// Files with more changed lines than this count as large
  #[arg(long, default_value_t = DEFAULT_LARGE_FILE_THRESHOLD)]
  pub large_file_threshold: u64,

  /// Upper bound on API pages fetched (100 files per page)
  #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
  pub max_pages: u32,

  /// Debug logging on stderr (RUST_LOG overrides)
  #[arg(short, long)]
  pub verbose: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRange {
  pub base: String,
  pub head: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSelection {
  Files { path: String },
  PullRequest { pr: PrRef, fallback: Option<GitRange> },
  Git { range: GitRange },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub repo: String, // absolute path for stability
  pub source: SourceSelection,
  pub exclude_generated: bool,
  pub generated_markers: Vec<String>,
  pub format: OutputFormat,
  pub out: String,
  pub lines_per_minute: f64,
  pub large_file_threshold: u64,
  pub max_pages: u32,
}

fn resolve_pr(input: &str, repo: &str) -> Result<PrRef> {
  if let Some(pr) = PrRef::parse(input) {
    return Ok(pr);
  }

  let bare = input.trim().trim_start_matches('#');

  if let Ok(number) = bare.parse::<u64>() {
    return match parse_origin_github(repo) {
      Some((owner, name)) => Ok(PrRef { owner, name, number }),
      None => bail!("--pr {}: could not derive owner/repo from the origin remote of {}; use owner/repo#{}", input, repo, number),
    };
  }

  bail!("Unrecognized --pr value {:?}: expected owner/repo#N, a pull request URL, or a number", input)
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let repo = util::canonicalize_lossy(&cli.repo);

  if cli.head.is_some() && cli.base.is_none() {
    bail!("--head requires --base");
  }

  let range = cli.base.as_ref().map(|base| GitRange {
    base: base.clone(),
    head: cli.head.clone().unwrap_or_else(|| "HEAD".to_string()),
  });

  // Validate source selection
  let source = match (&cli.files, &cli.pr, range) {
    (Some(path), None, None) => SourceSelection::Files { path: path.clone() },
    (Some(_), _, _) => bail!("--files cannot be combined with --pr or --base"),
    (None, Some(pr), fallback) => SourceSelection::PullRequest { pr: resolve_pr(pr, &repo)?, fallback },
    (None, None, Some(range)) => SourceSelection::Git { range },
    (None, None, None) => bail!("Provide one of --pr, --base, or --files"),
  };

  if !(cli.lines_per_minute.is_finite() && cli.lines_per_minute > 0.0) {
    bail!("--lines-per-minute must be a positive number");
  }

  if cli.max_pages == 0 {
    bail!("--max-pages must be at least 1");
  }

  let exclude_generated = cli.exclude_generated || !cli.generated_marker.is_empty();

  Ok(EffectiveConfig {
    repo,
    source,
    exclude_generated,
    generated_markers: cli.generated_marker,
    format: cli.format,
    out: cli.out,
    lines_per_minute: cli.lines_per_minute,
    large_file_threshold: cli.large_file_threshold,
    max_pages: cli.max_pages,
  })
}
