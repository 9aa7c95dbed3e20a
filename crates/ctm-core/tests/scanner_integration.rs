//! Integration tests for scanning fixture projects

use ctm_core::{
    AnnotationScanner, BacklogItem, BacklogSource, GitHubLocation, Language, LocalLocation,
    PathSources, Sources, Test, TestBacklog,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture_path(name: &str) -> PathBuf {
    Path::new(FIXTURES_DIR).join(name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

#[test]
fn test_abap_unit_test_is_traced() {
    let scanner = AnnotationScanner::for_language(Language::Abap);
    let records = scanner.scan_str(&read_fixture("ltcl_test.abap"), "testFile.abap");

    assert_eq!(
        records,
        vec![TestBacklog {
            test: Test {
                file_url: "testFile.abap".to_string(),
                class_name: "ltcl_test".to_string(),
                method: "test".to_string(),
            },
            backlog_items: vec![BacklogItem {
                id: "MYJIRAPROJECT-72".to_string(),
                source: BacklogSource::Jira,
            }],
        }]
    );
}

#[test]
fn test_abap_from_reader() {
    let file = File::open(fixture_path("ltcl_test.abap")).expect("Failed to open fixture");
    let scanner = AnnotationScanner::for_language(Language::Abap);
    let records = scanner
        .scan_reader(BufReader::new(file), "ltcl_test.abap")
        .expect("Failed to scan fixture");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].backlog_items[0].id, "MYJIRAPROJECT-72");
}

#[test]
fn test_java_fixture() {
    let scanner = AnnotationScanner::for_language(Language::Java);
    let records = scanner.scan_str(
        &read_fixture("src/test/ShoppingCartTest.java"),
        "ShoppingCartTest.java",
    );

    let summary: Vec<(&str, Vec<String>)> = records
        .iter()
        .map(|r| {
            (
                r.test.method.as_str(),
                r.backlog_items.iter().map(|b| b.to_string()).collect(),
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            ("addsItems", vec!["GitHub:example/shop#12".to_string()]),
            (
                "addsItems",
                vec!["Jira:SHOP-7".to_string(), "Jira:SHOP-8".to_string()]
            ),
            ("testEmptyCart", vec!["GitHub:example/shop#12".to_string()]),
            ("removesItems", vec!["GitHub:example/shop#12".to_string()]),
        ]
    );

    for record in &records {
        assert_eq!(record.test.class_name, "ShoppingCartTest");
    }
}

#[test]
fn test_github_links() {
    let resolver = GitHubLocation::new("testOrg", "testRepo", FIXTURES_DIR).branch("main");
    let result = PathSources::new([fixture_path("ltcl_test.abap")])
        .scan(&resolver)
        .expect("Failed to scan fixture");

    assert_eq!(result.len(), 1);
    assert_eq!(
        result.records[0].test.file_url,
        "https://github.com/testOrg/testRepo/blob/main/ltcl_test.abap"
    );
}

#[cfg(feature = "walk")]
#[test]
fn test_walk_fixtures() {
    use ctm_core::WalkSources;

    let result = WalkSources::new(FIXTURES_DIR)
        .scan(&LocalLocation::relative_to(FIXTURES_DIR))
        .expect("Failed to walk fixtures");

    assert!(result.warnings.is_empty());
    assert_eq!(result.len(), 5);

    // sorted by path: ltcl_test.abap before src/...
    assert_eq!(result.records[0].test.file_url, "ltcl_test.abap");
    assert!(
        result.records[1..]
            .iter()
            .all(|r| r.test.class_name == "ShoppingCartTest")
    );
}

#[test]
fn test_repeated_scans_are_identical() {
    let paths = [
        fixture_path("ltcl_test.abap"),
        fixture_path("src/test/ShoppingCartTest.java"),
    ];

    let first = PathSources::new(paths.clone())
        .scan(&LocalLocation::new())
        .expect("first scan");
    let second = PathSources::new(paths)
        .scan(&LocalLocation::new())
        .expect("second scan");

    assert_eq!(first.records, second.records);
}
