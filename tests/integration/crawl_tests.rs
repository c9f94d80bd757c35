//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the marketplace (search pages,
//! product pages, the autosuggest endpoint, image hosting) and run the full
//! crawl cycle end-to-end into temporary output directories.

use market_harvester::config::{
    Config, EndpointConfig, NetworkConfig, OutputConfig, RenderingConfig, SearchConfig,
};
use market_harvester::crawler::crawl;
use market_harvester::ProductRecord;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a config pointing every endpoint at the mock server
fn test_config(server_uri: &str, out: &Path) -> Config {
    Config {
        search: SearchConfig {
            keywords: vec!["rtx 5090 founder edition".to_string()],
            use_suggestions: false,
            allowed_categories: vec!["0".to_string()],
            max_pages_per_keyword: 3,
            results_per_page: 50,
            sponsored_lead_skip: 2,
        },
        endpoints: EndpointConfig {
            search_base_url: format!("{}/sch/i.html", server_uri),
            suggestion_base_url: format!("{}/autosug", server_uri),
            suggestion_callback: "0".to_string(),
        },
        network: NetworkConfig {
            user_agent: "Mozilla/5.0 (integration test)".to_string(),
            request_timeout_secs: 10,
            max_concurrent_fetches: 4,
            proxy_url: None,
        },
        rendering: RenderingConfig::default(),
        output: OutputConfig {
            records_path: out.join("records.jsonl").to_string_lossy().into_owned(),
            images_dir: out.join("images").to_string_lossy().into_owned(),
            download_images: false,
            debug_dir: out.join("debug").to_string_lossy().into_owned(),
        },
    }
}

/// A search results page with the given total, self-reported page number
/// and product ids (two sponsored lead entries are prepended; the crawler
/// is configured to skip them)
fn listing_page(total: u64, reported_page: u32, product_ids: &[u64]) -> String {
    let mut items = String::new();
    for lead in [9_900_001u64, 9_900_002] {
        items.push_str(&format!(
            r#"<li class="s-item"><a class="s-item__link" href="/itm/{lead}">Sponsored</a></li>"#
        ));
    }
    for id in product_ids {
        items.push_str(&format!(
            r#"<li class="s-item"><a class="s-item__link" href="/itm/{id}">Item {id}</a></li>"#
        ));
    }

    format!(
        r#"<html><body>
        <div class="srp-controls__count">
          <h1 class="srp-controls__count-heading"><span class="BOLD">{total}</span> results</h1>
        </div>
        <ul class="srp-results">{items}</ul>
        <nav class="pagination">
          <ol class="pagination__items">
            <li><a class="pagination__item" aria-current="page">{reported_page}</a></li>
          </ol>
          <a class="pagination__next" href="/sch/i.html?_pgn={next}">Next</a>
        </nav>
        </body></html>"#,
        next = reported_page + 1
    )
}

/// A minimal product page carrying the two critical fields plus extras
fn product_page(title: &str, price: &str, extra: &str) -> String {
    format!(
        r#"<html><body>
        <div data-testid="x-item-title">
          <h1 class="x-item-title__mainTitle">
            <span class="ux-textspans--BOLD">{title}</span>
          </h1>
        </div>
        <div class="x-price-primary" data-testid="x-price-primary">
          <span class="ux-textspans">{price}</span>
        </div>
        {extra}
        </body></html>"#
    )
}

async fn mount_search_page(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/sch/i.html"))
        .and(query_param("_pgn", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_product_page(server: &MockServer, id: u64, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/itm/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn read_records(out: &Path) -> Vec<ProductRecord> {
    let content = std::fs::read_to_string(out.join("records.jsonl")).unwrap_or_default();
    content
        .lines()
        .map(|line| serde_json::from_str(line).expect("record line should parse"))
        .collect()
}

/// Counts requests the server saw for a given search page number
async fn search_requests_for_page(server: &MockServer, page: u32) -> usize {
    let requests = server.received_requests().await.unwrap_or_default();
    requests
        .iter()
        .filter(|r| r.url.path() == "/sch/i.html")
        .filter(|r| {
            r.url
                .query_pairs()
                .any(|(k, v)| k == "_pgn" && v == page.to_string())
        })
        .count()
}

#[tokio::test]
async fn test_full_crawl_emits_records() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_search_page(&server, 1, listing_page(500, 1, &[101, 102, 103])).await;
    mount_search_page(&server, 2, listing_page(500, 2, &[])).await;
    mount_search_page(&server, 3, listing_page(500, 3, &[])).await;
    for id in [101u64, 102, 103] {
        mount_product_page(
            &server,
            id,
            product_page(&format!("Graphics Card {}", id), "US $1,999.99", ""),
        )
        .await;
    }

    let totals = crawl(test_config(&server.uri(), out.path()))
        .await
        .expect("crawl should succeed");

    assert_eq!(totals.search_pages_fetched, 3);
    assert_eq!(totals.products_dispatched, 3);
    assert_eq!(totals.records_emitted, 3);
    assert_eq!(totals.records_degraded, 0);

    let mut records = read_records(out.path());
    records.sort_by(|a, b| a.product_id.cmp(&b.product_id));
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].product_id, "101");
    assert_eq!(records[0].title.as_deref(), Some("Graphics Card 101"));
    assert_eq!(records[0].price.as_deref(), Some("US $1,999.99"));
    assert_eq!(records[0].derived_from_keyword, "rtx 5090 founder edition");
    assert_eq!(records[0].category_context, "0");

    // The sponsored lead entries must never be fetched
    let requests = server.received_requests().await.unwrap_or_default();
    assert!(!requests
        .iter()
        .any(|r| r.url.path().starts_with("/itm/9900")));
}

#[tokio::test]
async fn test_zero_results_dispatches_nothing() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    // The page still lists items; a zero total must win over their presence
    mount_search_page(&server, 1, listing_page(0, 1, &[101, 102])).await;

    let totals = crawl(test_config(&server.uri(), out.path()))
        .await
        .expect("crawl should succeed");

    assert_eq!(totals.search_pages_fetched, 1);
    assert_eq!(totals.products_dispatched, 0);
    assert_eq!(totals.records_emitted, 0);
    assert!(read_records(out.path()).is_empty());

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(!requests.iter().any(|r| r.url.path().starts_with("/itm/")));
    assert_eq!(search_requests_for_page(&server, 2).await, 0);
}

#[tokio::test]
async fn test_pagination_respects_max_pages() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    for page in 1..=4u32 {
        mount_search_page(&server, page, listing_page(500, page, &[])).await;
    }

    let mut config = test_config(&server.uri(), out.path());
    config.search.max_pages_per_keyword = 2;

    let totals = crawl(config).await.expect("crawl should succeed");

    assert_eq!(totals.search_pages_fetched, 2);
    assert_eq!(search_requests_for_page(&server, 3).await, 0);
    assert_eq!(search_requests_for_page(&server, 4).await, 0);
}

#[tokio::test]
async fn test_page_mismatch_stops_chain() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_search_page(&server, 1, listing_page(500, 1, &[])).await;
    // Page 2 claims the server rendered page 1 again
    mount_search_page(&server, 2, listing_page(500, 1, &[])).await;
    mount_search_page(&server, 3, listing_page(500, 3, &[])).await;

    let totals = crawl(test_config(&server.uri(), out.path()))
        .await
        .expect("crawl should succeed");

    assert_eq!(totals.search_pages_fetched, 2);
    assert_eq!(search_requests_for_page(&server, 3).await, 0);
}

#[tokio::test]
async fn test_missing_page_indicator_stops_chain() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    // No pagination markup at all: the indicator is unparseable
    let body = r#"<html><body>
        <div class="srp-controls__count">
          <h1 class="srp-controls__count-heading"><span class="BOLD">500</span> results</h1>
        </div>
        <ul></ul>
        </body></html>"#;
    mount_search_page(&server, 1, body.to_string()).await;

    let totals = crawl(test_config(&server.uri(), out.path()))
        .await
        .expect("crawl should succeed");

    assert_eq!(totals.search_pages_fetched, 1);
    assert_eq!(search_requests_for_page(&server, 2).await, 0);
}

#[tokio::test]
async fn test_challenge_page_yields_sentinel_record() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_search_page(&server, 1, listing_page(10, 1, &[555])).await;
    mount_search_page(&server, 2, listing_page(10, 2, &[])).await;
    mount_search_page(&server, 3, listing_page(10, 3, &[])).await;

    // The product page redirects into the challenge interstitial
    let challenge_url = format!("{}/splashui/challenge?ap=1", server.uri());
    Mock::given(method("GET"))
        .and(path("/itm/555"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", challenge_url.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/splashui/challenge"))
        .respond_with(ResponseTemplate::new(200).set_body_string("checking your browser"))
        .mount(&server)
        .await;

    let totals = crawl(test_config(&server.uri(), out.path()))
        .await
        .expect("crawl should succeed");

    assert_eq!(totals.records_emitted, 1);
    assert_eq!(totals.records_degraded, 1);

    let records = read_records(out.path());
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.title.as_deref(), Some("CHALLENGE_PAGE_HIT"));
    assert_eq!(record.product_id, "555");
    assert!(record.link.contains("/itm/555"));
    assert!(record.price.is_none());
    assert!(record.description.is_none());
    assert!(record.seller_name.is_none());
    assert!(record.image_urls.is_empty());
}

#[tokio::test]
async fn test_missing_title_suppresses_record_and_writes_debug() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_search_page(&server, 1, listing_page(10, 1, &[666])).await;
    mount_search_page(&server, 2, listing_page(10, 2, &[])).await;
    mount_search_page(&server, 3, listing_page(10, 3, &[])).await;

    // A page with a price but no recognizable title markup
    let body = r#"<html><body>
        <div class="x-price-primary" data-testid="x-price-primary">
          <span class="ux-textspans">US $10.00</span>
        </div>
        </body></html>"#;
    mount_product_page(&server, 666, body.to_string()).await;

    let totals = crawl(test_config(&server.uri(), out.path()))
        .await
        .expect("crawl should succeed");

    assert_eq!(totals.extractions_failed, 1);
    assert_eq!(totals.records_emitted, 0);
    assert!(read_records(out.path()).is_empty());

    // The raw body must be preserved under the known product id
    let debug_dir = out.path().join("debug");
    let artifacts: Vec<_> = std::fs::read_dir(&debug_dir)
        .expect("debug dir should exist")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("666_") && name.ends_with(".html"))
        .collect();
    assert_eq!(artifacts.len(), 1);
}

#[tokio::test]
async fn test_invalid_suggestion_json_falls_back_to_seed() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/autosug"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;
    mount_search_page(&server, 1, listing_page(0, 1, &[])).await;

    let mut config = test_config(&server.uri(), out.path());
    config.search.use_suggestions = true;

    let totals = crawl(config).await.expect("crawl should succeed");

    // The seed keyword was still searched despite the broken endpoint
    assert_eq!(totals.search_pages_fetched, 1);
    let requests = server.received_requests().await.unwrap_or_default();
    let searched_seed = requests
        .iter()
        .filter(|r| r.url.path() == "/sch/i.html")
        .any(|r| {
            r.url
                .query_pairs()
                .any(|(k, v)| k == "_nkw" && v == "rtx 5090 founder edition")
        });
    assert!(searched_seed);
}

#[tokio::test]
async fn test_suggestions_expand_into_chains() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    let suggestion_body = r#"{"richRes":{"sug":[
        {"kwd":"rtx 5090","category":[27386]},
        {"kwd":"rtx 5090 水冷"}
    ]}}"#;
    Mock::given(method("GET"))
        .and(path("/autosug"))
        .respond_with(ResponseTemplate::new(200).set_body_string(suggestion_body))
        .mount(&server)
        .await;
    // Every chain ends immediately on a zero-result page
    mount_search_page(&server, 1, listing_page(0, 1, &[])).await;

    let mut config = test_config(&server.uri(), out.path());
    config.search.use_suggestions = true;

    let totals = crawl(config).await.expect("crawl should succeed");
    assert_eq!(totals.search_pages_fetched, 2);

    let requests = server.received_requests().await.unwrap_or_default();
    let searched: Vec<(String, String)> = requests
        .iter()
        .filter(|r| r.url.path() == "/sch/i.html")
        .map(|r| {
            let kwd = r
                .url
                .query_pairs()
                .find(|(k, _)| k == "_nkw")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default();
            let cat = r
                .url
                .query_pairs()
                .find(|(k, _)| k == "_sacat")
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default();
            (kwd, cat)
        })
        .collect();

    assert!(searched.contains(&("rtx 5090".to_string(), "27386".to_string())));
    // The category-less suggestion got the default category
    assert!(searched.contains(&("rtx 5090 水冷".to_string(), "0".to_string())));
}

#[tokio::test]
async fn test_description_iframe_is_fetched_and_merged() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_search_page(&server, 1, listing_page(10, 1, &[101])).await;
    mount_search_page(&server, 2, listing_page(10, 2, &[])).await;
    mount_search_page(&server, 3, listing_page(10, 3, &[])).await;

    let extra = format!(
        r#"<iframe id="desc_ifr" src="{}/itmdesc/101"></iframe>"#,
        server.uri()
    );
    mount_product_page(
        &server,
        101,
        product_page("Graphics Card", "US $999.00", &extra),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/itmdesc/101"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><p>Barely used,</p><p>no coil whine.</p></body></html>",
        ))
        .mount(&server)
        .await;

    crawl(test_config(&server.uri(), out.path()))
        .await
        .expect("crawl should succeed");

    let records = read_records(out.path());
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].description.as_deref(),
        Some("Barely used, no coil whine.")
    );
}

#[tokio::test]
async fn test_images_are_mirrored_per_product() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    mount_search_page(&server, 1, listing_page(10, 1, &[101])).await;
    mount_search_page(&server, 2, listing_page(10, 2, &[])).await;
    mount_search_page(&server, 3, listing_page(10, 3, &[])).await;

    // URLs without a thumbnail size token pass through the upgrade untouched
    let extra = format!(
        r#"<div class="ux-image-carousel-item">
             <img data-zoom-src="{uri}/pics/front.jpg">
           </div>
           <div class="ux-image-carousel-item">
             <img data-zoom-src="{uri}/pics/back.jpg">
           </div>"#,
        uri = server.uri()
    );
    mount_product_page(
        &server,
        101,
        product_page("Graphics Card", "US $999.00", &extra),
    )
    .await;
    for name in ["front.jpg", "back.jpg"] {
        Mock::given(method("GET"))
            .and(path(format!("/pics/{}", name)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake jpeg".to_vec()))
            .mount(&server)
            .await;
    }

    let mut config = test_config(&server.uri(), out.path());
    config.output.download_images = true;

    crawl(config).await.expect("crawl should succeed");

    let product_dir = out.path().join("images").join("101");
    let stored: Vec<_> = std::fs::read_dir(&product_dir)
        .expect("image dir should exist")
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_empty_keywords_aborts_before_fetching() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();

    let mut config = test_config(&server.uri(), out.path());
    config.search.keywords.clear();

    let result = crawl(config).await;
    assert!(result.is_err());

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}
