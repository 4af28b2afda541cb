use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ACTIVITY_PAGE: &str = r#"<html><body>
<div class="activity">
  <p>Oct 21, 2025 Coffee Shop $4.50</p>
  <p>Oct 22, 2025 Grocery Store $45.10</p>
  <p>Need help? Call us.</p>
</div>
</body></html>"#;

fn txscrape() -> Command {
    Command::cargo_bin("txscrape").unwrap()
}

/// A command isolated from the user's config file.
fn txscrape_in(dir: &TempDir) -> Command {
    let path = dir.path().join("config.json");
    if !path.exists() {
        write_config(dir, r#"{"load":{"settle_delay_ms":0}}"#);
    }
    let mut cmd = txscrape();
    cmd.arg("--config").arg(&path);
    cmd
}

fn write_config(dir: &TempDir, json: &str) {
    fs::write(dir.path().join("config.json"), json).unwrap();
}

fn write_page(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("activity.html");
    fs::write(&path, ACTIVITY_PAGE).unwrap();
    path
}

#[test]
fn test_extract_writes_csv_to_stdout() {
    let dir = TempDir::new().unwrap();
    let page = write_page(&dir);

    txscrape_in(&dir)
        .arg("extract")
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Date,"))
        .stdout(predicate::str::contains("Coffee Shop"))
        .stdout(predicate::str::contains("45.10"));
}

#[test]
fn test_extract_into_output_dir_uses_export_name() {
    let dir = TempDir::new().unwrap();
    let page = write_page(&dir);
    let out = dir.path().join("out");

    txscrape_in(&dir)
        .arg("extract")
        .arg(&page)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success();

    let names: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("transactions_web_"));
    assert!(names[0].ends_with(".csv"));
}

#[test]
fn test_extract_json_format() {
    let dir = TempDir::new().unwrap();
    let page = write_page(&dir);

    txscrape_in(&dir)
        .args(["extract", "--format", "json"])
        .arg(&page)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"strategy\": \"free_text\""))
        .stdout(predicate::str::contains("\"count\": 2"));
}

#[test]
fn test_count_prints_number() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rows.html");
    fs::write(
        &path,
        r#"<table class="transaction-list">
             <tr data-transaction-id="a"><td>10/21/2025</td><td>Coffee</td><td>$4.50</td></tr>
             <tr data-transaction-id="b"><td>10/22/2025</td><td>Groceries</td><td>$45.10</td></tr>
           </table>"#,
    )
    .unwrap();

    txscrape_in(&dir)
        .arg("count")
        .arg(&path)
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();

    txscrape_in(&dir)
        .args(["extract", "does-not-exist.html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_invalid_pdf_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("statement.pdf");
    fs::write(&path, b"not a pdf at all").unwrap();

    txscrape_in(&dir).arg("pdf").arg(&path).assert().failure();
}

#[test]
fn test_batch_without_matches_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("*.pdf");

    txscrape_in(&dir)
        .arg("batch")
        .arg(pattern.to_string_lossy().as_ref())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_config_path() {
    let dir = TempDir::new().unwrap();

    txscrape()
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));
}

#[test]
fn test_config_file_prefix_names_the_export() {
    let dir = TempDir::new().unwrap();
    let page = write_page(&dir);
    let out = dir.path().join("out");
    write_config(&dir, r#"{"export":{"file_prefix":"statement"}}"#);

    txscrape_in(&dir)
        .arg("extract")
        .arg(&page)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success();

    let names: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("statement_web_"));
}

#[test]
fn test_malformed_config_fails() {
    let dir = TempDir::new().unwrap();
    let page = write_page(&dir);
    write_config(&dir, "{ not json");

    txscrape_in(&dir)
        .arg("extract")
        .arg(&page)
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}
