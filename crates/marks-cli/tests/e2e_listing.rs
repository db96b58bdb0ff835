//! E2E tests for the read commands: `marks urls`, `marks folders`,
//! `marks stats`, plus error reporting and bookmark path resolution.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

const FIXTURE: &str = include_str!("fixtures/Bookmarks.json");

/// Command isolated from the user's config, cache, and environment.
fn marks_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("marks"));
    cmd.current_dir(home);
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join("config"));
    cmd.env("XDG_CACHE_HOME", home.join("cache"));
    cmd.env("MARKS_LOG", "error");
    cmd.env_remove("MARKS_BOOKMARKS");
    cmd.env_remove("FORMAT");
    cmd
}

fn write_bookmarks(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("Bookmarks");
    std::fs::write(&path, contents).expect("write bookmarks");
    path
}

fn run_json(home: &Path, args: &[&str]) -> Value {
    let output = marks_cmd(home)
        .args(args)
        .arg("--json")
        .output()
        .expect("marks should not crash");
    assert!(
        output.status.success(),
        "marks {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

fn ids(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v["id"].as_str().expect("id"))
        .collect()
}

// ---------------------------------------------------------------------------
// marks urls
// ---------------------------------------------------------------------------

#[test]
fn urls_are_sorted_by_date_added() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), FIXTURE);

    let urls = run_json(dir.path(), &["urls", "--no-cache", "--file", file.to_str().unwrap()]);
    assert_eq!(ids(&urls), vec!["21", "10", "20", "31", "30", "32"]);
}

#[test]
fn urls_carry_folder_and_resolved_last_visited() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), FIXTURE);

    let urls = run_json(dir.path(), &["urls", "--no-cache", "--file", file.to_str().unwrap()]);
    let by_id = |id: &str| {
        urls.as_array()
            .unwrap()
            .iter()
            .find(|u| u["id"] == id)
            .cloned()
            .unwrap()
    };

    let book = by_id("10");
    assert_eq!(book["folder_name"], "Bookmarks bar");
    assert_eq!(book["date_added"], "2021-09-15T12:34:56.789012Z");
    assert_eq!(book["last_visited"], "2023-06-10T18:45:00Z");

    // date_last_used is "0": falls through to last_visited_desktop.
    let ownership = by_id("20");
    assert_eq!(ownership["folder_name"], "Reading");
    assert_eq!(ownership["last_visited"], "2023-07-04T00:00:00Z");

    assert_eq!(by_id("30")["last_visited"], "2024-02-29T12:00:00Z");
    assert!(by_id("21")["last_visited"].is_null());
}

#[test]
fn urls_search_and_folder_filters() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), FIXTURE);
    let file = file.to_str().unwrap();

    let urls = run_json(dir.path(), &["urls", "--no-cache", "--file", file, "--search", "Rust"]);
    assert_eq!(ids(&urls), vec!["10", "20"]);

    let urls = run_json(dir.path(), &["urls", "--no-cache", "--file", file, "--search", "reddit.com"]);
    assert_eq!(ids(&urls), vec!["30"]);

    let urls = run_json(
        dir.path(),
        &["urls", "--no-cache", "--file", file, "--folder", "Other bookmarks", "--limit", "2"],
    );
    assert_eq!(ids(&urls), vec!["31", "30"]);
}

#[test]
fn urls_text_output_is_one_row_per_url() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), FIXTURE);

    let output = marks_cmd(dir.path())
        .args(["urls", "--no-cache", "--format", "text", "--file"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 6);
    assert!(stdout.lines().all(|line| line.split('\t').count() == 6));
}

#[test]
fn bookmarks_env_var_is_used_without_file_flag() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), FIXTURE);

    let output = marks_cmd(dir.path())
        .env("MARKS_BOOKMARKS", &file)
        .args(["urls", "--no-cache", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let urls: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(urls.as_array().unwrap().len(), 6);
}

// dirs resolves XDG_CONFIG_HOME only on Linux.
#[cfg(target_os = "linux")]
#[test]
fn config_file_supplies_bookmarks_and_output() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), FIXTURE);
    let config_dir = dir.path().join("config/marks");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        format!("bookmarks = {:?}\noutput = \"json\"\n", file.to_str().unwrap()),
    )
    .unwrap();

    let output = marks_cmd(dir.path()).args(["folders", "--no-cache"]).output().unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let folders: Value = serde_json::from_slice(&output.stdout).expect("config output = json");
    assert_eq!(ids(&folders), vec!["1", "2", "3", "4"]);
}

// ---------------------------------------------------------------------------
// marks folders
// ---------------------------------------------------------------------------

#[test]
fn folders_are_pre_order_with_parents_and_depth() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), FIXTURE);

    let folders = run_json(dir.path(), &["folders", "--no-cache", "--file", file.to_str().unwrap()]);
    assert_eq!(ids(&folders), vec!["1", "2", "3", "4"]);
    assert!(folders[0]["parent_id"].is_null());
    assert_eq!(folders[1]["parent_id"], "1");
    assert_eq!(folders[1]["depth"], 1);
    assert_eq!(folders[3]["name"], "Mobile bookmarks");
    assert_eq!(folders[3]["depth"], 0);
}

// ---------------------------------------------------------------------------
// marks stats
// ---------------------------------------------------------------------------

#[test]
fn stats_json_has_expected_fields() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), FIXTURE);

    let stats = run_json(dir.path(), &["stats", "--no-cache", "--file", file.to_str().unwrap()]);
    assert_eq!(stats["urls"], 6);
    assert_eq!(stats["folders"], 4);
    assert_eq!(stats["missing_last_visited"], 3);
    assert_eq!(stats["added_by_month"]["2022-01"], 2);
    assert_eq!(stats["visited_by_month"]["2023-07"], 1);

    let sites: Vec<(&str, u64)> = stats["top_sites"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| (s["key"].as_str().unwrap(), s["count"].as_u64().unwrap()))
        .collect();
    assert_eq!(sites[0], ("doc.rust-lang.org", 2));
    assert_eq!(sites[1], ("example.org", 2));
    assert!(sites.contains(&("reddit.com/r/rust", 1)));
}

#[test]
fn stats_top_limits_sites() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), FIXTURE);

    let stats = run_json(
        dir.path(),
        &["stats", "--no-cache", "--top", "1", "--file", file.to_str().unwrap()],
    );
    assert_eq!(stats["top_sites"].as_array().unwrap().len(), 1);
}

#[test]
fn stats_pretty_output_has_sections() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), FIXTURE);

    marks_cmd(dir.path())
        .args(["stats", "--no-cache", "--format", "pretty", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Top sites:"))
        .stdout(predicate::str::contains("urls:"));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn missing_file_reports_e1001() {
    let dir = TempDir::new().unwrap();

    marks_cmd(dir.path())
        .args(["urls", "--no-cache", "--format", "text", "--file"])
        .arg(dir.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E1001]"));
}

#[test]
fn malformed_timestamp_reports_json_error() {
    let dir = TempDir::new().unwrap();
    let broken = FIXTURE.replace("\"13287229200000000\"", "\"yesterday\"");
    let file = write_bookmarks(dir.path(), &broken);

    let output = marks_cmd(dir.path())
        .args(["urls", "--no-cache", "--json", "--file"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty(), "no partial output on failure");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let json_start = stderr.find('{').expect("JSON error on stderr");
    let err: Value = serde_json::Deserializer::from_str(&stderr[json_start..])
        .into_iter::<Value>()
        .next()
        .unwrap()
        .unwrap();
    assert_eq!(err["error"]["error_code"], "E2002");
    assert!(err["error"]["message"].as_str().unwrap().contains("31"));
}

#[test]
fn missing_roots_reports_e2001() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), r#"{"version": 1}"#);

    marks_cmd(dir.path())
        .args(["folders", "--no-cache", "--format", "text", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn invalid_json_reports_e2003() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), "{\"roots\": {");

    marks_cmd(dir.path())
        .args(["stats", "--no-cache", "--format", "text", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2003"));
}

// dirs resolves XDG_CONFIG_HOME only on Linux.
#[cfg(target_os = "linux")]
#[test]
fn broken_config_reports_e1002() {
    let dir = TempDir::new().unwrap();
    let config_dir = dir.path().join("config/marks");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "[dedup]\nthreshold = \"high\"\n").unwrap();

    marks_cmd(dir.path())
        .args(["urls", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1002"));
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[cfg(target_os = "linux")]
#[test]
fn cache_entry_is_written_and_reused() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), FIXTURE);
    let file = file.to_str().unwrap();

    let first = run_json(dir.path(), &["urls", "--file", file]);
    let entries: Vec<_> = std::fs::read_dir(dir.path().join("cache/marks"))
        .expect("cache dir created")
        .collect();
    assert_eq!(entries.len(), 1);

    let second = run_json(dir.path(), &["urls", "--file", file]);
    assert_eq!(first, second);
}

#[cfg(target_os = "linux")]
#[test]
fn no_cache_flag_skips_cache_dir() {
    let dir = TempDir::new().unwrap();
    let file = write_bookmarks(dir.path(), FIXTURE);

    run_json(dir.path(), &["urls", "--no-cache", "--file", file.to_str().unwrap()]);
    assert!(!dir.path().join("cache/marks").exists());
}

// ---------------------------------------------------------------------------
// marks completions
// ---------------------------------------------------------------------------

#[test]
fn completions_bash_mentions_subcommands() {
    let dir = TempDir::new().unwrap();

    marks_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_marks"))
        .stdout(predicate::str::contains("dedup"));
}
