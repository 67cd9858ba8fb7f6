// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one run: select a source, fetch, filter, aggregate, estimate, render, write
// role: processing/orchestrator
// inputs: EffectiveConfig
// outputs: Rendered report on stdout or in --out
// side_effects: Network/git via sources; writes the report
// invariants:
// - A source failure aborts the run with context; it never renders an empty report
// - --pr with --base builds a chain: GitHub first, local diff as fallback
// errors: SourceError wrapped into anyhow with the source description
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{EffectiveConfig, GitRange, SourceSelection};
use crate::filter::GeneratedFilter;
use crate::render::{FilterSummary, Report};
use crate::review::ReviewPolicy;
use crate::source::file::FileSource;
use crate::source::git::GitSource;
use crate::source::github_api::{api_base_url, build_api, get_github_token, GithubSource, PrRef, RetryPolicy};
use crate::source::{ChangeSetSource, SourceChain};
use crate::stats::Aggregator;
use crate::util;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

fn github_source(pr: &PrRef, max_pages: u32) -> Box<dyn ChangeSetSource> {
  let token = get_github_token();

  if token.is_none() {
    info!("no GitHub token found; using unauthenticated requests");
  }

  let api = build_api(api_base_url(), token, HTTP_TIMEOUT, RetryPolicy::default());
  Box::new(GithubSource::new(api, pr.clone(), max_pages))
}

fn git_source(repo: &str, range: &GitRange) -> Box<dyn ChangeSetSource> {
  Box::new(GitSource::new(repo, range.base.clone(), range.head.clone()))
}

pub fn build_source(cfg: &EffectiveConfig) -> Box<dyn ChangeSetSource> {
  match &cfg.source {
    SourceSelection::Files { path } => Box::new(FileSource::new(path.clone())),
    SourceSelection::Git { range } => git_source(&cfg.repo, range),
    SourceSelection::PullRequest { pr, fallback: None } => github_source(pr, cfg.max_pages),
    SourceSelection::PullRequest { pr, fallback: Some(range) } => Box::new(SourceChain::new(vec![
      github_source(pr, cfg.max_pages),
      git_source(&cfg.repo, range),
    ])),
  }
}

pub fn build_report(cfg: &EffectiveConfig, source: &dyn ChangeSetSource) -> Result<Report> {
  let label = source.describe();

  // Phase 1: fetch
  let records = source.fetch().with_context(|| format!("fetching change-set from {}", label))?;
  info!(source = %label, files = records.len(), "change-set fetched");

  // Phase 2: filter
  let (records, filters) = if cfg.exclude_generated {
    let filter = GeneratedFilter::with_markers(cfg.generated_markers.iter().cloned());
    let part = filter.partition(records);

    for (r, why) in &part.skipped {
      info!(path = %r.path, reason = %why, "skipping generated file");
    }

    let summary = FilterSummary::from_skipped(&part.skipped);
    (part.kept, summary)
  } else {
    (records, FilterSummary::default())
  };

  // Phase 3: aggregate and estimate
  let result = Aggregator::new(cfg.large_file_threshold).aggregate(&records);
  let estimate = ReviewPolicy::default().with_lines_per_minute(cfg.lines_per_minute).estimate(&result);

  Ok(Report::build(label, &result, estimate, filters, cfg.large_file_threshold))
}

pub fn run(cfg: &EffectiveConfig) -> Result<()> {
  let source = build_source(cfg);
  let report = build_report(cfg, source.as_ref())?;
  let rendered = report.render(cfg.format)?;

  util::write_output(&cfg.out, &rendered)
}
