//! Integration tests for the aggregation pipeline
//!
//! These tests serve monster pages from a wiremock server and check the
//! image resolver's cache behavior and the files written by a full run.

use lorebox::aggregate::{run_aggregation, run_drop_table, ImageCache, ImageResolver, MonsterIdentityKey};
use lorebox::config::{
    Config, DatasetConfig, ExtractionConfig, HttpConfig, ImageConfig, OutputConfig, StoreKind,
    UserAgentConfig, WikiConfig,
};
use lorebox::http::build_http_client;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_agent() -> UserAgentConfig {
    UserAgentConfig {
        name: "TestHarvester".to_string(),
        version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

fn resolver(server: &MockServer, retry_limit: u32) -> ImageResolver {
    let client = build_http_client(&user_agent(), &HttpConfig::default()).unwrap();
    ImageResolver::new(client, &server.uri(), retry_limit).unwrap()
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html")
}

fn infobox_page(src: &str) -> ResponseTemplate {
    html_page(&format!(
        r#"<html><head><title>Monster</title></head><body>
        <table class="infobox"><tr>
        <td class="infobox-image infobox-full-width-content"><img src="{}" alt=""></td>
        </tr></table></body></html>"#,
        src
    ))
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_same_identity_fetched_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/Goblin"))
        .respond_with(infobox_page("/images/Goblin.png"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver(&server, 0);
    let mut cache = ImageCache::new();
    let goblin = MonsterIdentityKey::new(2, "Goblin");
    let wiki_url = format!("{}/w/Goblin", server.uri());

    let first = resolver.resolve_image(&mut cache, &goblin, &wiki_url).await;
    let second = resolver.resolve_image(&mut cache, &goblin, &wiki_url).await;

    assert_eq!(first, format!("{}/images/Goblin.png", server.uri()));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_empty_result_is_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/Imp"))
        .respond_with(html_page("<html><body><p>No pictures here</p></body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver(&server, 0);
    let mut cache = ImageCache::new();
    let imp = MonsterIdentityKey::new(2, "Imp");
    let wiki_url = format!("{}/w/Imp", server.uri());

    assert_eq!(resolver.resolve_image(&mut cache, &imp, &wiki_url).await, "");
    assert_eq!(resolver.resolve_image(&mut cache, &imp, &wiki_url).await, "");
    assert_eq!(cache.negative_count(), 1);
}

#[tokio::test]
async fn test_og_image_fallback_is_cached() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/Cow"))
        .respond_with(html_page(
            r#"<html><head><meta property="og:image" content="https://x/img.png"></head>
            <body><table class="infobox"></table></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver(&server, 0);
    let mut cache = ImageCache::new();
    let cow = MonsterIdentityKey::new(2, "Cow");

    let url = resolver
        .resolve_image(&mut cache, &cow, &format!("{}/w/Cow", server.uri()))
        .await;

    assert_eq!(url, "https://x/img.png");
    assert_eq!(cache.get(&cow).unwrap().url, "https://x/img.png");
}

#[tokio::test]
async fn test_transport_failure_is_negative_cached_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/Guard"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver(&server, 0);
    let mut cache = ImageCache::new();
    let guard = MonsterIdentityKey::new(21, "Guard");
    let wiki_url = format!("{}/w/Guard", server.uri());

    assert_eq!(resolver.resolve_image(&mut cache, &guard, &wiki_url).await, "");
    assert_eq!(resolver.resolve_image(&mut cache, &guard, &wiki_url).await, "");
    assert_eq!(cache.get(&guard).unwrap().transient_failures, 1);
}

#[tokio::test]
async fn test_retry_limit_bounds_refetches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/Guard"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let resolver = resolver(&server, 1);
    let mut cache = ImageCache::new();
    let guard = MonsterIdentityKey::new(21, "Guard");
    let wiki_url = format!("{}/w/Guard", server.uri());

    for _ in 0..3 {
        assert_eq!(resolver.resolve_image(&mut cache, &guard, &wiki_url).await, "");
    }
}

#[tokio::test]
async fn test_page_without_image_after_failure_is_final() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/Imp"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/Imp"))
        .respond_with(html_page("<html><body><p>No pictures here</p></body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver(&server, 1);
    let mut cache = ImageCache::new();
    let imp = MonsterIdentityKey::new(2, "Imp");
    let wiki_url = format!("{}/w/Imp", server.uri());

    for _ in 0..6 {
        assert_eq!(resolver.resolve_image(&mut cache, &imp, &wiki_url).await, "");
    }

    let entry = cache.get(&imp).unwrap();
    assert!(entry.settled);
    assert_eq!(entry.transient_failures, 1);
}

#[tokio::test]
async fn test_missing_page_is_probed_and_final() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/w/Ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_string(
            r#"<html><head><meta property="og:image" content="https://x/missing.png"></head></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/Nobody"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html><body>Not found</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver(&server, 3);
    let mut cache = ImageCache::new();
    let ghost = MonsterIdentityKey::new(19, "Ghost");
    let nobody = MonsterIdentityKey::new(1, "Nobody");

    let ghost_url = format!("{}/w/Ghost", server.uri());
    let nobody_url = format!("{}/w/Nobody", server.uri());

    for _ in 0..3 {
        assert_eq!(
            resolver.resolve_image(&mut cache, &ghost, &ghost_url).await,
            "https://x/missing.png"
        );
        assert_eq!(resolver.resolve_image(&mut cache, &nobody, &nobody_url).await, "");
    }

    assert_eq!(cache.get(&nobody).unwrap().transient_failures, 0);
}

fn write_datasets(dir: &TempDir, server: &MockServer) {
    let items = json!({
        "526": {"id": 526, "name": "Bones", "members": false, "lowalch": 1, "highalch": 1,
                "examine": "Bones are for burying!"},
        "1511": {"id": 1511, "name": "Logs", "members": false, "lowalch": 1, "highalch": 2,
                 "examine": "A number of wooden logs."},
        "1549": {"id": 1549, "name": "Stake", "quest_item": true},
        "1163": {"id": 1163, "name": "Rune full helm", "members": false,
                 "equipable_by_player": true, "equipment": {"slot": "head"},
                 "lowalch": 14080, "highalch": 21120, "examine": "A full face helmet."},
        "1164": {"id": 1164, "name": "Rune full helm", "noted": true, "duplicate": true}
    });
    let monsters = json!({
        "2": {"id": 2, "name": "Goblin", "combat_level": 2, "members": false,
              "wiki_url": format!("{}/w/Goblin", server.uri()),
              "drops": [
                  {"id": 526, "quantity": 1, "rarity": 1.0},
                  {"id": 526, "quantity": 1, "rarity": 1.0},
                  {"id": 1549, "quantity": 1, "rarity": 0.5},
                  {"id": 1164, "quantity": 1, "rarity": 0.01}
              ]},
        "3": {"id": 3, "name": "Goblin", "combat_level": 2, "members": false,
              "wiki_url": format!("{}/w/Goblin", server.uri()),
              "drops": [{"id": 526, "quantity": 1, "rarity": 1.0}]},
        "2098": {"id": 2098, "name": "Hill Giant", "combat_level": 28, "members": false,
                 "wiki_url": format!("{}/w/Hill_Giant", server.uri()),
                 "drops": [
                     {"id": 526, "quantity": 1, "rarity": 1.0},
                     {"id": 1163, "quantity": 1, "rarity": 0.001}
                 ]}
    });
    let prayers = json!({
        "1": {"id": 1, "name": "Thick Skin", "members": false}
    });

    fs::write(dir.path().join("items.json"), items.to_string()).unwrap();
    fs::write(dir.path().join("monsters.json"), monsters.to_string()).unwrap();
    fs::write(dir.path().join("prayers.json"), prayers.to_string()).unwrap();
}

fn create_test_config(server: &MockServer, dir: &TempDir) -> Config {
    Config {
        wiki: WikiConfig {
            api_url: format!("{}/api.php", server.uri()),
            base_url: server.uri(),
        },
        user_agent: user_agent(),
        http: HttpConfig::default(),
        extraction: ExtractionConfig {
            titles_path: dir.path().join("titles.txt"),
            output_dir: dir.path().join("quests"),
            store: StoreKind::Directory,
            database_path: None,
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

async fn mount_monster_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/w/Goblin"))
        .respond_with(infobox_page("/images/Goblin.png"))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/Hill_Giant"))
        .respond_with(html_page("<html><body>No image</body></html>"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_aggregation() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_datasets(&dir, &server);
    mount_monster_pages(&server).await;

    let config = create_test_config(&server, &dir);
    let report = run_aggregation(&config, false).await.unwrap();

    assert_eq!(report.items, 5);
    assert_eq!(report.monsters, 3);
    assert_eq!(report.prayers, 1);
    assert_eq!(report.drop_table_items, Some(2));

    let docs = dir.path().join("docs");
    for file in [
        "items-complete.json",
        "monsters-complete.json",
        "prayers-complete.json",
        "items-search.json",
        "items-json-slot/items-head.json",
        "item-drop-table.json",
    ] {
        assert!(docs.join(file).exists(), "{} was not written", file);
    }

    let search = read_json(&docs.join("items-search.json"));
    assert_eq!(search["1164"]["type"], json!("noted"));
    assert_eq!(search["1511"]["type"], json!("normal"));

    let raw = fs::read_to_string(docs.join("item-drop-table.json")).unwrap();
    assert!(raw.starts_with("{\n    \"items\": ["));

    let table = read_json(&docs.join("item-drop-table.json"));
    let items = table["items"].as_array().unwrap();
    let ids: Vec<u64> = items.iter().map(|item| item["id"].as_u64().unwrap()).collect();
    // Logs has no drops; the stake is a quest item; the noted helm is a duplicate
    assert_eq!(ids, vec![526, 1163]);

    let bones = &items[0];
    assert_eq!(bones["examine"], json!("Bones are for burying!"));
    let monsters = bones["monsters"].as_array().unwrap();
    assert_eq!(monsters.len(), 2);
    assert_eq!(monsters[0]["id"], json!(2));
    assert_eq!(monsters[0]["drops"], json!([{"quantity": 1, "rarity": 1.0}]));
    assert_eq!(
        monsters[0]["image"],
        json!(format!("{}/images/Goblin.png", server.uri()))
    );
    assert_eq!(monsters[1]["name"], json!("Hill Giant"));
    assert_eq!(monsters[1]["image"], json!(""));

    let helm = &items[1];
    assert_eq!(helm["monsters"][0]["image"], json!(""));
}

#[tokio::test]
async fn test_skip_drop_table() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_datasets(&dir, &server);

    Mock::given(method("GET"))
        .respond_with(html_page("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, &dir);
    let report = run_aggregation(&config, true).await.unwrap();

    assert_eq!(report.drop_table_items, None);
    assert!(dir.path().join("docs/items-complete.json").exists());
    assert!(!dir.path().join("docs/item-drop-table.json").exists());
}

#[tokio::test]
async fn test_drop_table_only() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_datasets(&dir, &server);
    mount_monster_pages(&server).await;

    let config = create_test_config(&server, &dir);
    let report = run_drop_table(&config).await.unwrap();

    assert_eq!(report.files.len(), 1);
    assert!(dir.path().join("docs/item-drop-table.json").exists());
    assert!(!dir.path().join("docs/items-complete.json").exists());
}

#[tokio::test]
async fn test_unreadable_dataset_aborts() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let config = create_test_config(&server, &dir);
    assert!(run_aggregation(&config, false).await.is_err());
    assert!(!dir.path().join("docs").exists());
}
