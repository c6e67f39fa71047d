//! Integration tests for the extraction pipeline
//!
//! These tests use wiremock to stand in for the wiki API and run the
//! extraction loop end-to-end against real stores in temporary directories.

use lorebox::config::{
    Config, DatasetConfig, ExtractionConfig, HttpConfig, ImageConfig, OutputConfig, StoreKind,
    UserAgentConfig, WikiConfig,
};
use lorebox::extract::{run_extraction, ExtractionReport, Extractor};
use lorebox::http::build_http_client;
use lorebox::storage::{DirectoryStore, PageRecord, RecordStore, SqliteStore};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COOKS_MARKUP: &str = "{{Quest}}\n'''Cook's Assistant''' is a quest...";

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        name: "TestHarvester".to_string(),
        version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

/// Creates a test configuration pointing at the mock wiki
fn create_test_config(server: &MockServer, dir: &TempDir, store: StoreKind) -> Config {
    Config {
        wiki: WikiConfig {
            api_url: format!("{}/api.php", server.uri()),
            base_url: server.uri(),
        },
        user_agent: user_agent(),
        http: HttpConfig {
            timeout_secs: 5,
            connect_timeout_secs: 5,
        },
        extraction: ExtractionConfig {
            titles_path: dir.path().join("titles.txt"),
            output_dir: dir.path().join("quests"),
            store,
            database_path: Some(dir.path().join("pages.db")),
            retry_path: None,
        },
        datasets: DatasetConfig {
            items: dir.path().join("items.json"),
            monsters: dir.path().join("monsters.json"),
            prayers: dir.path().join("prayers.json"),
        },
        output: OutputConfig {
            docs_dir: dir.path().join("docs"),
        },
        images: ImageConfig::default(),
    }
}

fn directory_store(dir: &TempDir) -> DirectoryStore {
    DirectoryStore::new(&dir.path().join("quests"), &dir.path().join("retry.json")).unwrap()
}

fn extractor(server: &MockServer, store: Box<dyn RecordStore>) -> Extractor {
    let client = build_http_client(&user_agent(), &HttpConfig::default()).unwrap();
    Extractor::with_store(client, &format!("{}/api.php", server.uri()), store)
}

fn record_files(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries.map(|entry| entry.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn wikitext_response(markup: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "parse": {
            "title": "ignored",
            "pageid": 1,
            "wikitext": {"*": markup}
        }
    }))
}

async fn mount_title(server: &MockServer, title: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("action", "parse"))
        .and(query_param("prop", "wikitext"))
        .and(query_param("format", "json"))
        .and(query_param("page", title))
        .respond_with(response)
        .mount(server)
        .await;
}

fn titles(list: &[&str]) -> Vec<String> {
    list.iter().map(|title| title.to_string()).collect()
}

#[tokio::test]
async fn test_extracts_one_record_per_title() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_title(&server, "Cook's Assistant", wikitext_response(COOKS_MARKUP)).await;

    let mut extractor = extractor(&server, Box::new(directory_store(&dir)));
    let report = extractor.run(&titles(&["Cook's Assistant"])).await.unwrap();

    assert_eq!(report.written, 1);
    assert_eq!(report.failed, 0);

    let files = record_files(&dir.path().join("quests"));
    assert_eq!(files.len(), 1);

    let file_name = files[0].file_stem().unwrap().to_str().unwrap();
    assert_eq!(file_name.len(), 64);
    assert!(file_name.chars().all(|c| c.is_ascii_alphanumeric()));

    assert_eq!(read_json(&files[0]), json!({"Cook's Assistant": COOKS_MARKUP}));
}

#[tokio::test]
async fn test_missing_markup_writes_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_title(
        &server,
        "Not A Quest",
        ResponseTemplate::new(200).set_body_json(json!({
            "error": {"code": "missingtitle", "info": "The page you specified doesn't exist."}
        })),
    )
    .await;

    let mut extractor = extractor(&server, Box::new(directory_store(&dir)));
    let report = extractor.run(&titles(&["Not A Quest"])).await.unwrap();

    assert_eq!(
        report,
        ExtractionReport {
            total: 1,
            not_found: 1,
            ..Default::default()
        }
    );
    assert!(record_files(&dir.path().join("quests")).is_empty());
    assert!(extractor.store().retry_entries().unwrap().is_empty());
}

#[tokio::test]
async fn test_stored_titles_are_not_refetched() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .respond_with(wikitext_response("changed"))
        .expect(0)
        .mount(&server)
        .await;

    let mut store = directory_store(&dir);
    store
        .write_record(&PageRecord::new("Cook's Assistant", COOKS_MARKUP))
        .unwrap();

    let mut extractor = extractor(&server, Box::new(store));
    let report = extractor.run(&titles(&["Cook's Assistant"])).await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.written, 0);

    let files = record_files(&dir.path().join("quests"));
    assert_eq!(files.len(), 1);
    assert_eq!(read_json(&files[0]), json!({"Cook's Assistant": COOKS_MARKUP}));
}

#[tokio::test]
async fn test_duplicate_queue_entries_fetched_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("page", "Sheep Shearer"))
        .respond_with(wikitext_response("{{Quest}}"))
        .expect(1)
        .mount(&server)
        .await;

    let mut extractor = extractor(&server, Box::new(directory_store(&dir)));
    let report = extractor
        .run(&titles(&["Sheep Shearer", "Sheep Shearer"]))
        .await
        .unwrap();

    assert_eq!(report.written, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(record_files(&dir.path().join("quests")).len(), 1);
}

#[tokio::test]
async fn test_failure_lands_in_retry_list_and_run_continues() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // First attempt fails, the retry succeeds
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("page", "Dragon Slayer I"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_title(&server, "Dragon Slayer I", wikitext_response("{{Quest|dragon}}")).await;
    mount_title(&server, "Cook's Assistant", wikitext_response(COOKS_MARKUP)).await;

    let mut extractor = extractor(&server, Box::new(directory_store(&dir)));
    let report = extractor
        .run(&titles(&["Dragon Slayer I", "Cook's Assistant"]))
        .await
        .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.written, 1);

    let retrying = extractor.store().retry_entries().unwrap();
    assert_eq!(retrying.len(), 1);
    assert_eq!(retrying[0].title, "Dragon Slayer I");
    assert_eq!(retrying[0].attempts, 1);
    assert!(retrying[0].reason.contains("500"));

    // The retry list is not part of the ledger
    assert!(!extractor
        .store()
        .extracted_titles()
        .unwrap()
        .contains("Dragon Slayer I"));

    let report = extractor.run_retries().await.unwrap();
    assert_eq!(report.written, 1);
    assert!(extractor.store().retry_entries().unwrap().is_empty());
    assert_eq!(record_files(&dir.path().join("quests")).len(), 2);
}

#[tokio::test]
async fn test_reserved_characters_are_escaped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("page", "Fish & Chips"))
        .respond_with(wikitext_response("fish"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("page", "Rune + Essence"))
        .respond_with(wikitext_response("rune"))
        .expect(1)
        .mount(&server)
        .await;

    let mut extractor = extractor(&server, Box::new(directory_store(&dir)));
    let report = extractor
        .run(&titles(&["Fish & Chips", "Rune + Essence"]))
        .await
        .unwrap();

    assert_eq!(report.written, 2);
    let stored = extractor.store().extracted_titles().unwrap();
    assert!(stored.contains("Fish & Chips"));
    assert!(stored.contains("Rune + Essence"));
}

#[tokio::test]
async fn test_sqlite_store_resumes() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("pages.db");

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .respond_with(wikitext_response("{{Quest}}"))
        .expect(2)
        .mount(&server)
        .await;

    let queue = titles(&["Cook's Assistant", "Sheep Shearer"]);

    let mut first = extractor(&server, Box::new(SqliteStore::new(&db_path).unwrap()));
    let report = first.run(&queue).await.unwrap();
    assert_eq!(report.written, 2);
    drop(first);

    let mut second = extractor(&server, Box::new(SqliteStore::new(&db_path).unwrap()));
    let report = second.run(&queue).await.unwrap();
    assert_eq!(report.skipped, 2);
    assert_eq!(second.store().record_count().unwrap(), 2);
}

#[tokio::test]
async fn test_run_extraction_from_config() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, StoreKind::Directory);

    fs::write(
        &config.extraction.titles_path,
        "Cook's Assistant\n\n   \nNot A Quest  \n",
    )
    .unwrap();

    mount_title(&server, "Cook's Assistant", wikitext_response(COOKS_MARKUP)).await;
    mount_title(
        &server,
        "Not A Quest",
        ResponseTemplate::new(200).set_body_json(json!({"error": {"code": "missingtitle"}})),
    )
    .await;

    let report = run_extraction(&config, false).await.unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.written, 1);
    assert_eq!(report.not_found, 1);

    // A second run over the same queue only refetches the missing title
    let report = run_extraction(&config, false).await.unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(report.not_found, 1);
    assert_eq!(record_files(&config.extraction.output_dir).len(), 1);
    assert!(!config.extraction.retry_path().exists());
}

#[tokio::test]
async fn test_missing_title_queue_aborts() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir, StoreKind::Directory);

    let result = run_extraction(&config, false).await;
    assert!(result.is_err());
}
