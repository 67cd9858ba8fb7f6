use predicates::prelude::*;
use test_support::{cmd_bin, init_fixture_repo};

const BIN: &str = "pr-language-stats";

fn run_json(repo: &str, extra: &[&str]) -> serde_json::Value {
  let mut args = vec!["--repo", repo, "--base", "main", "--head", "feature/stats", "--format", "json"];
  args.extend_from_slice(extra);

  let out = cmd_bin(BIN).args(&args).output().unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

fn row<'a>(v: &'a serde_json::Value, language: &str) -> &'a serde_json::Value {
  v["languages"]
    .as_array()
    .unwrap()
    .iter()
    .find(|r| r["language"] == language)
    .unwrap_or_else(|| panic!("no row for {}", language))
}

#[test]
fn local_diff_counts_every_changed_path() {
  let repo = init_fixture_repo();
  let v = run_json(&repo.path().to_string_lossy(), &[]);

  assert_eq!(v["source"], "git:main...feature/stats");
  assert_eq!(v["totals"]["total_files"], 6);
  assert_eq!(v["totals"]["total_added"], 10);
  assert_eq!(v["totals"]["total_removed"], 1);

  let md = row(&v, "Markdown");
  assert_eq!((md["added"].as_u64(), md["removed"].as_u64(), md["files"].as_u64()), (Some(4), Some(1), Some(2)));

  let rust = row(&v, "Rust");
  assert_eq!((rust["added"].as_u64(), rust["files"].as_u64()), (Some(2), Some(1)));

  // Pure rename still counts as a Python file with zero lines.
  let py = row(&v, "Python");
  assert_eq!((py["added"].as_u64(), py["files"].as_u64()), (Some(0), Some(1)));

  let other = row(&v, "Other");
  assert_eq!((other["added"].as_u64(), other["files"].as_u64()), (Some(4), Some(2)));
}

#[test]
fn local_diff_with_generated_filter() {
  let repo = init_fixture_repo();
  let v = run_json(&repo.path().to_string_lossy(), &["--exclude-generated"]);

  let skipped: Vec<&str> = v["filters"]["skipped_generated"]
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["path"].as_str().unwrap())
    .collect();
  assert_eq!(skipped.len(), 3);
  assert!(skipped.contains(&"Cargo.lock"));
  assert!(skipped.contains(&"logo.png"));
  assert!(skipped.contains(&"new_name.py"));

  assert_eq!(v["totals"]["total_files"], 3);
  assert_eq!(v["totals"]["total_added"], 6);
  let langs: Vec<&str> = v["languages"].as_array().unwrap().iter().map(|r| r["language"].as_str().unwrap()).collect();
  assert_eq!(langs, vec!["Markdown", "Rust"]);
}

#[test]
fn unknown_revision_fails_with_git_error() {
  let repo = init_fixture_repo();

  cmd_bin(BIN)
    .args(["--repo", &repo.path().to_string_lossy(), "--base", "no-such-branch"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Git error"));
}
