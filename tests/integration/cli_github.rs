use predicates::prelude::*;
use serde_json::json;
use serial_test::serial;
use test_support::{cmd_bin, init_fixture_repo, read_fixture_json, read_fixture_text, serve_http, with_env};

const BIN: &str = "pr-language-stats";

fn page_of(n: usize, offset: usize) -> String {
  let items: Vec<serde_json::Value> = (0..n)
    .map(|i| json!({"filename": format!("src/gen/f{}.rs", offset + i), "status": "added", "additions": 1, "deletions": 0, "changes": 1, "patch": "@@"}))
    .collect();
  serde_json::Value::Array(items).to_string()
}

#[test]
fn env_backed_listing_is_used_for_pr() {
  let out = cmd_bin(BIN)
    .env("PLS_TEST_FILES_JSON", read_fixture_text("pr_files.json"))
    .args(["--pr", "https://github.com/octo/demo/pull/7/files", "--format", "json"])
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["source"], "github:octo/demo#7");
  assert_eq!(v["totals"]["total_files"], 5);
  assert_eq!(v["languages"][0]["language"], "Rust");
}

#[test]
fn collapsed_large_diffs_are_skipped_as_generated() {
  let listing = json!([
    {"filename": "src/lib.rs", "status": "modified", "additions": 12, "deletions": 3, "changes": 15, "patch": "@@"},
    {"filename": "dist/bundle.js", "status": "modified", "additions": 48000, "deletions": 47000, "changes": 95000}
  ]);

  let out = cmd_bin(BIN)
    .env("PLS_TEST_FILES_JSON", listing.to_string())
    .args(["--pr", "octo/demo#21", "--format", "json", "--exclude-generated"])
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["filters"]["skipped_generated"][0]["path"], "dist/bundle.js");
  assert_eq!(v["filters"]["skipped_generated"][0]["reason"], "diff not rendered");
  assert_eq!(v["totals"]["total_files"], 1);
  assert_eq!(v["review_time"]["large_file_count"], 0);
  assert_eq!(v["languages"][0]["language"], "Rust");

  // Without the filter the collapsed file still counts.
  let out = cmd_bin(BIN)
    .env("PLS_TEST_FILES_JSON", listing.to_string())
    .args(["--pr", "octo/demo#21", "--format", "json"])
    .output()
    .unwrap();
  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["totals"]["total_files"], 2);
  assert_eq!(v["review_time"]["large_file_count"], 1);
}

#[test]
fn rate_limit_body_is_an_error_not_an_empty_summary() {
  cmd_bin(BIN)
    .env("PLS_TEST_FILES_JSON", json!({"message": "API rate limit exceeded for 10.0.0.1."}).to_string())
    .args(["--pr", "octo/demo#7"])
    .assert()
    .failure()
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("rate limit"))
    .stderr(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
fn http_403_surfaces_rate_limit_and_stops_fallback() {
  let repo = init_fixture_repo();
  let body = json!({"message": "API rate limit exceeded for 127.0.0.1."}).to_string();
  let (base_url, server) = serve_http(vec![("403 Forbidden", body)]);

  cmd_bin(BIN)
    .env("GITHUB_API_URL", &base_url)
    .args(["--pr", "octo/demo#7", "--repo", &repo.path().to_string_lossy(), "--base", "main", "--head", "feature/stats"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("rate limit"))
    .stderr(predicate::str::contains("Try again later"));

  let seen = server.join().unwrap();
  assert_eq!(seen.len(), 1);
  assert!(seen[0].contains("/repos/octo/demo/pulls/7/files?per_page=100&page=1"), "request was {}", seen[0]);
}

#[test]
fn http_pagination_follows_full_pages() {
  let (base_url, server) = serve_http(vec![("200 OK", page_of(100, 0)), ("200 OK", page_of(1, 100))]);

  let out = cmd_bin(BIN)
    .env("GITHUB_API_URL", &base_url)
    .env("GITHUB_TOKEN", "test-token")
    .args(["--pr", "octo/demo#8", "--format", "json"])
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["totals"]["total_files"], 101);
  assert_eq!(v["languages"][0]["language"], "Rust");
  assert_eq!(v["languages"][0]["percentage"], 100.0);

  let seen = server.join().unwrap();
  assert!(seen[0].contains("page=1"));
  assert!(seen[1].contains("page=2"));
}

#[test]
fn page_cap_bounds_requests() {
  let (base_url, server) = serve_http(vec![("200 OK", page_of(100, 0))]);

  let out = cmd_bin(BIN)
    .env("GITHUB_API_URL", &base_url)
    .env("GITHUB_TOKEN", "test-token")
    .args(["--pr", "octo/demo#9", "--format", "json", "--max-pages", "1"])
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["totals"]["total_files"], 100);
  assert_eq!(server.join().unwrap().len(), 1);
}

#[test]
fn not_found_falls_back_to_local_diff() {
  let repo = init_fixture_repo();
  let (base_url, server) = serve_http(vec![("404 Not Found", json!({"message": "Not Found"}).to_string())]);

  let out = cmd_bin(BIN)
    .env("GITHUB_API_URL", &base_url)
    .env("GITHUB_TOKEN", "test-token")
    .args([
      "--pr",
      "octo/private#3",
      "--repo",
      &repo.path().to_string_lossy(),
      "--base",
      "main",
      "--head",
      "feature/stats",
      "--format",
      "json",
    ])
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));
  server.join().unwrap();

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["source"], "github:octo/private#3 -> git:main...feature/stats");
  assert_eq!(v["totals"]["total_files"], 6);
  assert!(String::from_utf8_lossy(&out.stderr).contains("source failed, trying next"));
}

#[test]
fn bare_pr_number_resolves_from_origin_remote() {
  let repo = init_fixture_repo();
  test_support::run(repo.path(), &["remote", "add", "origin", "git@github.com:octo/demo.git"]);

  let out = cmd_bin(BIN)
    .env("PLS_TEST_FILES_JSON", read_fixture_text("pr_files.json"))
    .args(["--pr", "12", "--repo", &repo.path().to_string_lossy(), "--format", "json"])
    .output()
    .unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));

  let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(v["source"], "github:octo/demo#12");
}

#[test]
#[serial]
fn env_backed_listing_in_process() {
  use pr_language_stats::source::github_api::{build_api, GithubSource, PrRef, RetryPolicy};
  use pr_language_stats::model::FileChangeRecord;
  use pr_language_stats::source::ChangeSetSource;
  use pr_language_stats::{aggregate, estimate_review_time};

  test_support::init_tracing();
  let fixture = read_fixture_text("pr_files.json");
  let _env = with_env(&[("PLS_TEST_FILES_JSON", fixture.as_str())]);

  let pr = PrRef::parse("octo/demo#7").unwrap();
  let api = build_api("http://unused.invalid".into(), None, std::time::Duration::from_secs(1), RetryPolicy::default());
  let records = GithubSource::new(api, pr, 10).with_per_page(2).fetch().unwrap();
  let expected: Vec<FileChangeRecord> = read_fixture_json("pr_files.json");
  assert_eq!(records, expected);

  let result = aggregate(&records);
  assert_eq!(result.per_language["Rust"].added, 150);
  assert_eq!(result.per_language["Markdown"].file_count, 2);

  let e = estimate_review_time(&result);
  assert_eq!((e.min_minutes, e.max_minutes), (1, 3));
}
