//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to serve a miniature three-level catalog and
//! run the full crawl-then-persist cycle end-to-end.

use icd_harvest::config::{Config, CrawlerConfig, DatabaseConfig, UserAgentConfig};
use icd_harvest::crawler::{harvest, run};
use icd_harvest::{FetchError, HarvestError, MedicalCode};
use rusqlite::Connection;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock catalog
fn create_test_config(domain: &str, db_path: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            domain: domain.to_string(),
            root_path: "/ICD10CM/Codes".to_string(),
            retry_delay_secs: 0, // No sleeping between attempts in tests
            ..CrawlerConfig::default()
        },
        user_agent: UserAgentConfig::default(),
        database: DatabaseConfig {
            name: db_path.display().to_string(),
            poll_interval_secs: 1,
            ..DatabaseConfig::default()
        },
    }
}

/// Renders a listing page; child pages carry the disambiguating class
fn listing_page(list_class: Option<&str>, items: &[(&str, &str)]) -> String {
    let class_attr = list_class
        .map(|class| format!(r#" class="{}""#, class))
        .unwrap_or_default();
    let items: String = items
        .iter()
        .map(|(href, text)| {
            let (code, rest) = text.split_once(' ').unwrap_or((*text, ""));
            format!(r#"<li><a href="{}">{}</a> {}</li>"#, href, code, rest)
        })
        .collect();

    format!(
        r#"<html><head><title>Codes</title></head><body>
        <ul class="menu"><li><a href="/about">About</a></li></ul>
        <div class="body-content">
            <h1>Codes</h1>
            <ul{}>{}</ul>
        </div>
        </body></html>"#,
        class_attr, items
    )
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Two categories, one subcategory each, one code per subcategory
async fn mount_catalog(server: &MockServer, fail_hepatitis: bool) {
    mount_page(
        server,
        "/ICD10CM/Codes",
        listing_page(
            None,
            &[
                ("/ICD10CM/Codes/A00-A09", "A00-A09 Intestinal infections"),
                ("/ICD10CM/Codes/B15-B19", "B15-B19 Viral hepatitis"),
            ],
        ),
    )
    .await;

    mount_page(
        server,
        "/ICD10CM/Codes/A00-A09",
        listing_page(
            Some("i51"),
            &[("/ICD10CM/Codes/A00-A09/A04-", "A04 Other bacterial intestinal infections")],
        ),
    )
    .await;
    mount_page(
        server,
        "/ICD10CM/Codes/A00-A09/A04-",
        listing_page(
            Some("i51"),
            &[("/ICD10CM/Codes/A00-A09/A04-/A04", "A04 Other bacterial intestinal infections")],
        ),
    )
    .await;

    if fail_hepatitis {
        Mock::given(method("GET"))
            .and(path("/ICD10CM/Codes/B15-B19"))
            .respond_with(ResponseTemplate::new(503))
            .expect(10)
            .mount(server)
            .await;
    } else {
        mount_page(
            server,
            "/ICD10CM/Codes/B15-B19",
            listing_page(
                Some("i51"),
                &[("/ICD10CM/Codes/B15-B19/B19-", "B19 Unspecified viral hepatitis")],
            ),
        )
        .await;
    }
    mount_page(
        server,
        "/ICD10CM/Codes/B15-B19/B19-",
        listing_page(
            Some("i51"),
            &[("/ICD10CM/Codes/B15-B19/B19-/B19", "B19 Unspecified viral hepatitis")],
        ),
    )
    .await;
}

fn stored_rows(db_path: &Path) -> Vec<(i64, String, String, String, String)> {
    let conn = Connection::open(db_path).expect("Failed to open result database");
    let mut stmt = conn
        .prepare("SELECT pk, group_code, group_desc, code, code_desc FROM medical_codes ORDER BY pk")
        .expect("Failed to prepare query");
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })
        .expect("Failed to query rows")
        .collect::<Result<Vec<_>, _>>()
        .expect("Failed to read rows");
    rows
}

#[tokio::test]
async fn test_harvest_two_categories() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, false).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("codes.db"));

    let records = harvest(&config).await.expect("Harvest failed");

    assert_eq!(
        records,
        vec![
            MedicalCode {
                group_code: "A00-A09".to_string(),
                group_desc: "Intestinal infections".to_string(),
                code: "A04".to_string(),
                code_desc: "Other bacterial intestinal infections".to_string(),
            },
            MedicalCode {
                group_code: "B15-B19".to_string(),
                group_desc: "Viral hepatitis".to_string(),
                code: "B19".to_string(),
                code_desc: "Unspecified viral hepatitis".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_full_run_stores_every_code() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, false).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("codes.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    let stored = run(&config).await.expect("Run failed");
    assert_eq!(stored, 2);

    let rows = stored_rows(&db_path);
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0],
        (
            1,
            "A00-A09".to_string(),
            "Intestinal infections".to_string(),
            "A04".to_string(),
            "Other bacterial intestinal infections".to_string()
        )
    );
    assert_eq!(rows[1].1, "B15-B19");
    assert_eq!(rows[1].3, "B19");
}

#[tokio::test]
async fn test_second_run_with_same_codes_is_rejected() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, false).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("codes.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    run(&config).await.expect("First run failed");
    let err = run(&config).await.unwrap_err();

    // Codes are unique at the table; the duplicate batch is dropped whole
    assert!(matches!(err, HarvestError::Storage(_)));
    assert_eq!(stored_rows(&db_path).len(), 2);
}

#[tokio::test]
async fn test_exhausted_branch_aborts_before_storage() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, true).await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("codes.db");
    let config = create_test_config(&mock_server.uri(), &db_path);

    let err = run(&config).await.unwrap_err();

    match err {
        HarvestError::Fetch(FetchError::Exhausted { url, attempts, .. }) => {
            assert!(url.ends_with("/ICD10CM/Codes/B15-B19"));
            assert_eq!(attempts, 10);
        }
        other => panic!("unexpected error: {}", other),
    }

    // The sink was never reached, so no database file was created
    assert!(!db_path.exists());
}

#[tokio::test]
async fn test_root_page_with_wrong_shape_fails() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/ICD10CM/Codes",
        "<html><body><p>Maintenance</p></body></html>".to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir.path().join("codes.db"));

    let err = harvest(&config).await.unwrap_err();
    assert!(matches!(err, HarvestError::Extraction(_)));
}
