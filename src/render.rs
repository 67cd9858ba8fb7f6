// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Turn an aggregation and estimate into a Report and render it as a terminal table or JSON
// role: presentation/render
// inputs: Source description, AggregationResult, ReviewTimeEstimate, filter summary
// outputs: Report (serde) and its text/JSON renderings
// invariants:
// - Rows follow AggregationResult::ranked (lines desc, ties by first appearance)
// - Percentages have one decimal and are null when no lines changed
// - Rendering is pure; writing is the caller's concern
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt::Write as _;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::filter::GeneratedReason;
use crate::model::{AggregationResult, FileChangeRecord, ReviewTimeEstimate, Totals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
  Text,
  Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageRow {
  pub language: String,
  pub files: u64,
  pub added: u64,
  pub removed: u64,
  pub percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
  pub path: String,
  pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
  pub exclude_generated: bool,
  pub skipped_generated: Vec<SkippedFile>,
}

impl FilterSummary {
  pub fn from_skipped(skipped: &[(FileChangeRecord, GeneratedReason)]) -> Self {
    Self {
      exclude_generated: true,
      skipped_generated: skipped
        .iter()
        .map(|(r, why)| SkippedFile { path: r.path.clone(), reason: why.to_string() })
        .collect(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
  pub source: String,
  pub filters: FilterSummary,
  pub large_file_threshold: u64,
  pub languages: Vec<LanguageRow>,
  pub totals: Totals,
  pub review_time: ReviewTimeEstimate,
}

fn round1(x: f64) -> f64 {
  (x * 10.0).round() / 10.0
}

impl Report {
  pub fn build(
    source: impl Into<String>,
    result: &AggregationResult,
    review_time: ReviewTimeEstimate,
    filters: FilterSummary,
    large_file_threshold: u64,
  ) -> Self {
    let languages = result
      .ranked()
      .into_iter()
      .map(|(label, bucket)| LanguageRow {
        language: label.to_string(),
        files: bucket.file_count,
        added: bucket.added,
        removed: bucket.removed,
        percentage: result.share_of(label).map(round1),
      })
      .collect();

    Self {
      source: source.into(),
      filters,
      large_file_threshold,
      languages,
      totals: result.totals,
      review_time,
    }
  }

  pub fn render(&self, format: OutputFormat) -> Result<String> {
    match format {
      OutputFormat::Text => Ok(render_text(self)),
      OutputFormat::Json => render_json(self),
    }
  }
}

fn plural(n: u64, one: &str, many: &str) -> String {
  format!("{} {}", n, if n == 1 { one } else { many })
}

/// `~N min` when the bounds agree, `N-M min` otherwise.
pub fn format_review_time(e: &ReviewTimeEstimate) -> String {
  if e.min_minutes == e.max_minutes {
    format!("~{} min", e.min_minutes)
  } else {
    format!("{}-{} min", e.min_minutes, e.max_minutes)
  }
}

pub fn render_text(report: &Report) -> String {
  let mut s = String::new();
  let _ = writeln!(s, "Language Statistics ({})", report.source);
  let _ = writeln!(s, "Estimated review time: {}", format_review_time(&report.review_time));

  if report.review_time.large_file_count > 0 {
    let _ = writeln!(
      s,
      "Warning: {} with more than {} lines changed",
      plural(report.review_time.large_file_count, "large file", "large files"),
      report.large_file_threshold
    );
  }

  if report.filters.exclude_generated && !report.filters.skipped_generated.is_empty() {
    let n = report.filters.skipped_generated.len() as u64;
    let _ = writeln!(s, "Skipped {}", plural(n, "generated file", "generated files"));
  }

  let _ = writeln!(s);

  if report.languages.is_empty() {
    let _ = writeln!(s, "No file changes.");
    return s;
  }

  let width = report
    .languages
    .iter()
    .map(|r| r.language.len())
    .chain(std::iter::once("Total".len()))
    .max()
    .unwrap_or(5);

  for row in &report.languages {
    let pct = match row.percentage {
      Some(p) => format!("{:.1}%", p),
      None => "-".to_string(),
    };
    let _ = writeln!(
      s,
      "  {:<width$}  {:>8}  {:>8}  {:>9}  {:>6}",
      row.language,
      format!("+{}", row.added),
      format!("-{}", row.removed),
      plural(row.files, "file", "files"),
      pct,
      width = width
    );
  }

  let t = &report.totals;
  let _ = writeln!(
    s,
    "  {:<width$}  {:>8}  {:>8}  {:>9}",
    "Total",
    format!("+{}", t.total_added),
    format!("-{}", t.total_removed),
    plural(t.total_files, "file", "files"),
    width = width
  );

  s
}

pub fn render_json(report: &Report) -> Result<String> {
  Ok(serde_json::to_string_pretty(report)?)
}
