//! End-to-end batches through the HTTP pipeline

use crate::common::{create_test_config, ML_ARTICLE, TECH_ARTICLE};
use std::io::Write;
use sumi_sieve::config::{load_config, Config};
use sumi_sieve::output::{export_csv, export_json, export_xml, BatchReport};
use sumi_sieve::{ErrorKind, Pipeline, UrlState};
use tempfile::{NamedTempFile, TempDir};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_tech_article_end_to_end() {
    let server = MockServer::start().await;
    mount_page(&server, "/article", 200, TECH_ARTICLE).await;

    let pipeline = Pipeline::from_config(&create_test_config()).unwrap();
    let url = format!("{}/article", server.uri());
    let records = pipeline.run(&[url.clone()], &CancellationToken::new()).await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.url, url);
    assert_eq!(record.state, UrlState::Completed);
    assert_eq!(record.category.label, "technology");
    assert!(record.quality_score >= 70.0, "score {}", record.quality_score);
    assert_eq!(record.status_code, Some(200));
    assert_eq!(
        record.content.title.as_deref(),
        Some("New Software Release Improves Programming Workflows")
    );
    assert!(!record.content.body_text.contains("All rights reserved"));
}

#[tokio::test]
async fn test_title_keyword_counts_double() {
    let server = MockServer::start().await;
    mount_page(&server, "/tech-article", 200, ML_ARTICLE).await;

    let pipeline = Pipeline::from_config(&create_test_config()).unwrap();
    let url = format!("{}/tech-article", server.uri());
    let records = pipeline.run(&[url], &CancellationToken::new()).await;

    let record = &records[0];
    assert_eq!(record.category.label, "technology");
    // "software" x3 in the body, "machine learning" x1 doubled by the title
    assert_eq!(record.category.scores.get("technology"), Some(&5));
    assert!(record.content.word_count >= 150);
    assert!(record.quality_score >= 70.0, "score {}", record.quality_score);
    assert_eq!(record.status_code, Some(200));
}

#[tokio::test]
async fn test_mixed_batch_keeps_order_with_workers() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", 200, TECH_ARTICLE).await;
    mount_page(&server, "/gone", 404, "not here").await;
    mount_page(&server, "/c", 200, "<html><body><p>tiny</p></body></html>").await;

    let urls = vec![
        format!("{}/a", server.uri()),
        "mailto:someone@example.com".to_string(),
        format!("{}/gone", server.uri()),
        format!("{}/c", server.uri()),
        format!("{}/a", server.uri()),
    ];

    let pipeline = Pipeline::from_config(&create_test_config())
        .unwrap()
        .with_workers(3);
    let records = pipeline.run(&urls, &CancellationToken::new()).await;

    assert_eq!(records.len(), urls.len());
    for (record, url) in records.iter().zip(&urls) {
        assert_eq!(&record.url, url);
    }

    assert_eq!(records[0].category.label, "technology");
    assert_eq!(records[1].error.as_ref().unwrap().kind, ErrorKind::Validation);
    assert_eq!(records[2].error.as_ref().unwrap().kind, ErrorKind::Http);
    assert_eq!(records[2].status_code, Some(404));
    assert!(records[3].is_success());
    assert!(records[3].content.is_empty());
    assert_eq!(records[3].category.label, "general");
    assert!(records[4].is_success());

    let report = BatchReport::from_records(&records);
    assert_eq!(report.total, 5);
    assert_eq!(report.completed, 3);
    assert_eq!(report.by_category.get("technology"), Some(&2));
}

#[tokio::test]
async fn test_validator_rejections_never_reach_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    // Default rules: loopback and local names are blocked
    let pipeline = Pipeline::from_config(&Config::default()).unwrap();
    let urls = vec![
        String::new(),
        "   ".to_string(),
        "ftp://example.com/file".to_string(),
        "example.com".to_string(),
        "http://localhost:8000/".to_string(),
        "http://printer.local/".to_string(),
        "https://exa mple.com/".to_string(),
        "https://nodot/".to_string(),
        format!("https://example.com/{}", "a".repeat(3000)),
        "https://example.com/wp-admin/".to_string(),
        "https://example.com/setup.exe".to_string(),
        server.uri(),
    ];

    let records = pipeline.run(&urls, &CancellationToken::new()).await;

    assert_eq!(records.len(), urls.len());
    for record in &records {
        assert_eq!(record.state, UrlState::Errored);
        assert_eq!(record.error.as_ref().unwrap().kind, ErrorKind::Validation);
        assert_eq!(record.status_code, None);
        assert_eq!(record.quality_score, 0.0);
    }
}

#[tokio::test]
async fn test_stop_signal_cancels_remaining_urls() {
    let server = MockServer::start().await;
    mount_page(&server, "/a", 200, TECH_ARTICLE).await;

    let urls: Vec<String> = (0..4).map(|i| format!("{}/a?i={}", server.uri(), i)).collect();
    let stop = CancellationToken::new();
    stop.cancel();

    let pipeline = Pipeline::from_config(&create_test_config()).unwrap();
    let records = pipeline.run(&urls, &stop).await;

    assert_eq!(records.len(), 4);
    assert!(records
        .iter()
        .all(|r| r.error.as_ref().map(|e| e.kind) == Some(ErrorKind::Cancelled)));
}

#[tokio::test]
async fn test_batch_from_config_file_to_exports() {
    let server = MockServer::start().await;
    mount_page(&server, "/cook", 200, r#"<html><head><title>Weekend Recipe Collection</title></head>
        <body><main><p>This recipe collection walks through a slow roasted vegetable recipe,
        a crusty bread recipe and a lemon tart. Preheat the oven, prepare the tray and let the
        oven do the work while the bread rises. Every recipe lists oven temperatures.</p></main>
        </body></html>"#).await;

    let config_toml = r#"
[output]
xml-path = "results.xml"

[validator]
block-loopback = false
blocked-hosts = []

[rate-limit]
base-delay-ms = 100
min-delay-ms = 100

[[categories]]
label = "cooking"
keywords = ["recipe", { term = "oven", weight = 3 }]

[[categories]]
label = "bakery"
keywords = ["bread"]
"#;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(config_toml.as_bytes()).unwrap();
    let config = load_config(file.path()).unwrap();

    let pipeline = Pipeline::from_config(&config).unwrap();
    let records = pipeline
        .run(&[format!("{}/cook", server.uri())], &CancellationToken::new())
        .await;
    assert_eq!(records[0].category.label, "cooking");

    let dir = TempDir::new().unwrap();
    let json_path = dir.path().join("results.json");
    let csv_path = dir.path().join("results.csv");
    export_json(&records, &json_path).unwrap();
    export_csv(&records, &csv_path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["total_records"], 1);
    assert_eq!(json["records"][0]["category"], "cooking");
    assert_eq!(json["records"][0]["status_code"], 200);

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("url,title,content,category,quality_score,status_code,timestamp,error\r\n"));
    assert_eq!(csv.lines().count(), 2);

    assert_eq!(config.output.xml_path.as_deref(), Some("results.xml"));
    let xml_path = dir.path().join(config.output.xml_path.as_deref().unwrap());
    export_xml(&records, &xml_path).unwrap();
    let xml = std::fs::read_to_string(&xml_path).unwrap();
    assert!(xml.contains("<category>cooking</category>"));
    assert!(xml.contains("<title>Weekend Recipe Collection</title>"));
}
