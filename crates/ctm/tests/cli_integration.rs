//! Integration tests that run the ctm binary

use std::path::Path;
use std::process::Command;

fn ctm_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ctm"));
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn fixtures_dir() -> &'static Path {
    Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../ctm-core/tests/fixtures"
    ))
}

#[test]
fn test_scan_directory_text() {
    let output = ctm_bin()
        .arg(fixtures_dir())
        .output()
        .expect("Failed to run ctm");

    assert!(output.status.success(), "Command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(stdout.contains("Traced tests (5)"), "stdout: {}", stdout);
    assert!(
        stdout.contains("ltcl_test.test -> Jira:MYJIRAPROJECT-72"),
        "stdout: {}",
        stdout
    );
    assert!(
        stdout.contains("ShoppingCartTest.addsItems -> Jira:SHOP-7, Jira:SHOP-8"),
        "stdout: {}",
        stdout
    );
    assert!(stderr.contains("Scanning"), "stderr: {}", stderr);
}

#[test]
fn test_scan_single_file_json() {
    let output = ctm_bin()
        .arg(fixtures_dir().join("ltcl_test.abap"))
        .arg("--format")
        .arg("json")
        .output()
        .expect("Failed to run ctm");

    assert!(output.status.success(), "Command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"MYJIRAPROJECT-72\""), "stdout: {}", stdout);
    assert!(stdout.contains("\"ltcl_test\""), "stdout: {}", stdout);
    assert!(stdout.contains("\"ltcl_test.abap\""), "stdout: {}", stdout);
}

#[test]
fn test_language_filter() {
    let output = ctm_bin()
        .arg(fixtures_dir())
        .arg("-l")
        .arg("java")
        .output()
        .expect("Failed to run ctm");

    assert!(output.status.success(), "Command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ShoppingCartTest"), "stdout: {}", stdout);
    assert!(!stdout.contains("ltcl_test"), "stdout: {}", stdout);
}

#[test]
fn test_github_links() {
    let output = ctm_bin()
        .arg(fixtures_dir())
        .args(["--organization", "testOrg", "--repository", "testRepo"])
        .args(["--branch", "main"])
        .output()
        .expect("Failed to run ctm");

    assert!(output.status.success(), "Command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("https://github.com/testOrg/testRepo/blob/main/ltcl_test.abap"),
        "stdout: {}",
        stdout
    );
    assert!(
        stdout.contains(
            "https://github.com/testOrg/testRepo/blob/main/src/test/ShoppingCartTest.java"
        ),
        "stdout: {}",
        stdout
    );
}

#[test]
fn test_organization_requires_repository() {
    let output = ctm_bin()
        .arg(fixtures_dir())
        .args(["--organization", "testOrg"])
        .output()
        .expect("Failed to run ctm");

    assert!(!output.status.success(), "Command should fail");
}

#[test]
fn test_config_file_and_output_file() {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let checkout = temp.path().join("checkout/src");
    std::fs::create_dir_all(&checkout).expect("Failed to create checkout");
    std::fs::copy(
        fixtures_dir().join("ltcl_test.abap"),
        checkout.join("ltcl_test.abap"),
    )
    .expect("Failed to copy fixture");

    let config_path = temp.path().join("ctm.json");
    std::fs::write(
        &config_path,
        r#"{
            "github_base_url": "https://github.example.com",
            "sources": [
                {
                    "local": "checkout",
                    "language": "abap",
                    "git": { "organization": "org", "repository": "repo" }
                }
            ]
        }"#,
    )
    .expect("Failed to write config");

    let report_path = temp.path().join("report.json");
    let output = ctm_bin()
        .arg("--config")
        .arg(&config_path)
        .args(["--format", "json", "--output"])
        .arg(&report_path)
        .output()
        .expect("Failed to run ctm");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "Command should succeed: {}", stderr);
    assert!(stderr.contains("Wrote 1 traced tests"), "stderr: {}", stderr);

    let report = std::fs::read_to_string(&report_path).expect("Report should be written");
    assert!(
        report.contains("https://github.example.com/org/repo/blob/master/src/ltcl_test.abap"),
        "report: {}",
        report
    );
    assert!(report.contains("MYJIRAPROJECT-72"), "report: {}", report);
}

#[test]
fn test_missing_config() {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let output = ctm_bin()
        .arg("--config")
        .arg(temp.path().join("missing.json"))
        .output()
        .expect("Failed to run ctm");

    assert!(!output.status.success(), "Command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Config file not found"), "stderr: {}", stderr);
}

#[test]
fn test_missing_path() {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let output = ctm_bin()
        .arg(temp.path().join("does-not-exist"))
        .output()
        .expect("Failed to run ctm");

    assert!(!output.status.success(), "Command should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Source path not found"), "stderr: {}", stderr);
}

#[test]
fn test_empty_directory() {
    let temp = tempfile::tempdir().expect("Failed to create temp dir");
    let output = ctm_bin()
        .arg(temp.path())
        .output()
        .expect("Failed to run ctm");

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Traced tests (0)"), "stdout: {}", stdout);
}
