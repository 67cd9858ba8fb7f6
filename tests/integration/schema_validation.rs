use jsonschema::validator_for;
use test_support::{cmd_bin, fixture_path, init_fixture_repo};

fn read_schema(name: &str) -> serde_json::Value {
  let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
  let path = manifest_dir.join("tests").join("schemas").join(name);
  let data = std::fs::read(&path).expect("schema file");
  serde_json::from_slice(&data).expect("valid schema JSON")
}

fn compile_schema(name: &str) -> jsonschema::Validator {
  let schema = read_schema(name);
  validator_for(&schema).expect("compile schema")
}

fn report_json(args: &[&str]) -> serde_json::Value {
  let out = cmd_bin("pr-language-stats").args(args).args(["--format", "json"]).output().unwrap();
  assert!(out.status.success(), "cli run failed: {}", String::from_utf8_lossy(&out.stderr));
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn file_reports_conform_to_schema() {
  let compiled = compile_schema("pr-language-stats.report.schema.json");

  let plain = report_json(&["--files", &fixture_path("pr_files.json")]);
  compiled.validate(&plain).expect("schema validation failed for plain report");

  let filtered = report_json(&["--files", &fixture_path("with_generated.json"), "--exclude-generated"]);
  compiled.validate(&filtered).expect("schema validation failed for filtered report");
}

#[test]
fn git_report_conforms_to_schema() {
  let repo = init_fixture_repo();
  let v = report_json(&["--repo", &repo.path().to_string_lossy(), "--base", "main", "--head", "feature/stats"]);
  compile_schema("pr-language-stats.report.schema.json")
    .validate(&v)
    .expect("schema validation failed for git report");
}

#[test]
fn schema_rejects_missing_totals() {
  let mut v = report_json(&["--files", &fixture_path("pr_files.json")]);
  v.as_object_mut().unwrap().remove("totals");
  assert!(!compile_schema("pr-language-stats.report.schema.json").is_valid(&v));
}
