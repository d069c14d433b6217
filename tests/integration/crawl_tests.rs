//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to stand up a mock storefront and run the full
//! pipeline end-to-end, from catalog discovery to the CSV file.

use catalog_harvest::config::Config;
use catalog_harvest::crawler::Coordinator;
use catalog_harvest::state::Stage;
use catalog_harvest::HarvestError;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration pointed at the mock storefront
fn create_test_config(base_url: &str, csv_path: &str) -> Config {
    let mut config = Config::default();
    config.site.base_url = format!("{}/", base_url);
    config.politeness.pacing_min_ms = 1;
    config.politeness.pacing_max_ms = 3;
    config.politeness.cooldown_ms = 1;
    config.politeness.listing_delay_min_ms = 0;
    config.politeness.listing_delay_max_ms = 0;
    config.politeness.detail_delay_min_ms = 0;
    config.politeness.detail_delay_max_ms = 2;
    config.retry.initial_backoff_ms = 1;
    config.retry.max_backoff_ms = 5;
    config.crawler.max_concurrent_requests = 4;
    config.output.csv_path = csv_path.to_string();
    config
}

fn catalog_page(categories: &[(&str, &str)]) -> String {
    let blocks: String = categories
        .iter()
        .map(|(name, href)| {
            format!(
                r#"<div class="item_block col-md-6 col-sm-6"><table><tr>
                <td class="section_info"><a href="{}">{}</a></td>
                </tr></table></div>"#,
                href, name
            )
        })
        .collect();
    format!("<html><body><div class=\"catalog\">{}</div></body></html>", blocks)
}

fn listing_page(total_pages: u32, cards: &[(&str, &[&str])]) -> String {
    let pagination: String = (1..=total_pages)
        .map(|n| format!(r#"<a class="dark_link" href="?PAGEN_1={}">{}</a>"#, n, n))
        .collect();
    let cards: String = cards
        .iter()
        .map(|(href, offers)| {
            let offers: String = offers
                .iter()
                .map(|id| format!(r#"<div class="ixi_favorite" data-offer-id="{}"></div>"#, id))
                .collect();
            format!(
                r#"<section class="bth-card-element"><a class="bth-card-img-link" href="{}">img</a>{}</section>"#,
                href, offers
            )
        })
        .collect();
    format!(
        r#"<html><body>
        <div class="bth-products-list-container">{}</div>
        <div class="module-pagination">{}</div>
        </body></html>"#,
        cards, pagination
    )
}

fn detail_page(name: Option<&str>, sku: Option<&str>, price: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(name) = name {
        body.push_str(&format!("<h1>{}</h1>", name));
    }
    if let Some(sku) = sku {
        body.push_str(&format!(r#"<div data-articule="{}">Art. {}</div>"#, sku, sku));
    }
    if let Some(price) = price {
        body.push_str(&format!(r#"<meta itemprop="price" content="{}">"#, price));
    }
    format!("<html><body>{}</body></html>", body)
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_listing_page(server: &MockServer, page_path: &str, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .and(query_param("PAGEN_1", page.to_string()))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, page_path: &str, offer: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .and(query_param("oid", offer))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, page_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == page_path)
        .count()
}

fn read_rows(csv_path: &std::path::Path) -> (String, Vec<String>) {
    let content = std::fs::read_to_string(csv_path).expect("Failed to read CSV");
    let mut lines = content.lines().map(str::to_string);
    let header = lines.next().expect("CSV has no header");
    let mut rows: Vec<String> = lines.collect();
    rows.sort();
    (header, rows)
}

#[tokio::test]
async fn test_full_harvest_isolates_failures() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/catalogue/",
        catalog_page(&[("Baths", "/catalogue/baths/"), ("Sinks", "/catalogue/sinks/")]),
    )
    .await;

    // Baths: two listing pages, page-specific mocks first so they take precedence
    mount_listing_page(
        &mock_server,
        "/catalogue/baths/",
        1,
        listing_page(2, &[("/p/1/", &["11", "12"])]),
    )
    .await;
    mount_listing_page(
        &mock_server,
        "/catalogue/baths/",
        2,
        listing_page(2, &[("/p/2/", &["21"])]),
    )
    .await;
    mount_page(
        &mock_server,
        "/catalogue/baths/",
        listing_page(2, &[("/p/1/", &["11", "12"])]),
    )
    .await;

    // Sinks: the first listing page fails, which only loses this category
    Mock::given(method("GET"))
        .and(path("/catalogue/sinks/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    mount_detail(
        &mock_server,
        "/p/1/",
        "11",
        detail_page(Some("Widget"), Some("W1"), Some("9.99")),
    )
    .await;
    mount_detail(&mock_server, "/p/1/", "12", detail_page(Some("Gadget"), None, None)).await;
    // No name heading: a parse error that must not affect its siblings
    mount_detail(&mock_server, "/p/2/", "21", detail_page(None, Some("X"), Some("1"))).await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("output.csv");
    let config = create_test_config(&mock_server.uri(), csv_path.to_str().unwrap());

    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let summary = coordinator.run_and_persist().await.expect("Harvest failed");

    assert_eq!(summary.categories, 2);
    assert_eq!(summary.link_batches, 2);
    assert_eq!(summary.links, 3);
    assert_eq!(summary.records, 2);
    assert_eq!(summary.failures.get(&Stage::Pagination), Some(&1));
    assert_eq!(summary.failures.get(&Stage::Details), Some(&1));
    assert_eq!(
        summary.output_path.as_deref(),
        Some(csv_path.to_str().unwrap())
    );

    let (header, rows) = read_rows(&csv_path);
    assert_eq!(header, "Name,SKU,Price");
    assert_eq!(rows, vec!["Gadget,,", "Widget,W1,9.99"]);
}

#[tokio::test]
async fn test_discovery_failure_aborts_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/catalogue/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("output.csv");
    let config = create_test_config(&mock_server.uri(), csv_path.to_str().unwrap());

    let result = Coordinator::new(config).unwrap().run_and_persist().await;

    assert!(matches!(result, Err(HarvestError::Fetch(_))));
    assert!(!csv_path.exists(), "No output should be written");
    assert_eq!(requests_to(&mock_server, "/catalogue/").await, 1);
}

#[tokio::test]
async fn test_malformed_catalog_aborts_run() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/catalogue/",
        "<html><body>Technical works</body></html>".to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("output.csv");
    let config = create_test_config(&mock_server.uri(), csv_path.to_str().unwrap());

    let result = Coordinator::new(config).unwrap().run_and_persist().await;

    assert!(matches!(result, Err(HarvestError::Parse(_))));
    assert!(!csv_path.exists());
}

#[tokio::test]
async fn test_scope_limits_bound_the_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/catalogue/",
        catalog_page(&[("Baths", "/catalogue/baths/"), ("Sinks", "/catalogue/sinks/")]),
    )
    .await;
    mount_page(
        &mock_server,
        "/catalogue/baths/",
        listing_page(3, &[("/p/1/", &["1", "2"]), ("/p/3/", &["3", "4"])]),
    )
    .await;
    mount_page(
        &mock_server,
        "/catalogue/sinks/",
        listing_page(1, &[("/p/9/", &["9"])]),
    )
    .await;
    for (product_path, offer) in [("/p/1/", "1"), ("/p/1/", "2"), ("/p/3/", "3"), ("/p/3/", "4")] {
        let name = format!("Offer {}", offer);
        mount_detail(
            &mock_server,
            product_path,
            offer,
            detail_page(Some(&name), Some(offer), Some("100")),
        )
        .await;
    }

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("output.csv");
    let mut config = create_test_config(&mock_server.uri(), csv_path.to_str().unwrap());
    config.scope.max_categories = Some(1);
    config.scope.max_pages_per_category = Some(1);
    config.scope.max_products = Some(3);

    let summary = Coordinator::new(config)
        .unwrap()
        .run_and_persist()
        .await
        .expect("Harvest failed");

    assert_eq!(summary.categories, 2);
    assert_eq!(summary.link_batches, 1);
    assert_eq!(summary.links, 4);
    assert_eq!(summary.records, 3);
    assert_eq!(summary.total_failures(), 0);

    // The second category is never walked
    assert_eq!(requests_to(&mock_server, "/catalogue/sinks/").await, 0);
    // First listing page for the count, then page 1 of 3 only
    assert_eq!(requests_to(&mock_server, "/catalogue/baths/").await, 2);

    let (_, rows) = read_rows(&csv_path);
    assert_eq!(rows.len(), 3);
}

#[tokio::test]
async fn test_dedupe_links_across_pages() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/catalogue/",
        catalog_page(&[("Baths", "/catalogue/baths/")]),
    )
    .await;
    mount_listing_page(
        &mock_server,
        "/catalogue/baths/",
        2,
        listing_page(2, &[("/p/1/", &["1"]), ("/p/2/", &["2"])]),
    )
    .await;
    mount_page(
        &mock_server,
        "/catalogue/baths/",
        listing_page(2, &[("/p/1/", &["1"])]),
    )
    .await;
    mount_detail(&mock_server, "/p/1/", "1", detail_page(Some("One"), None, None)).await;
    mount_detail(&mock_server, "/p/2/", "2", detail_page(Some("Two"), None, None)).await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("output.csv");
    let mut config = create_test_config(&mock_server.uri(), csv_path.to_str().unwrap());
    config.scope.dedupe_links = true;

    let summary = Coordinator::new(config)
        .unwrap()
        .run_and_persist()
        .await
        .expect("Harvest failed");

    assert_eq!(summary.links, 3);
    assert_eq!(summary.records, 2);
    assert_eq!(requests_to(&mock_server, "/p/1/").await, 1);

    let (_, rows) = read_rows(&csv_path);
    assert_eq!(rows, vec!["One,,", "Two,,"]);
}

#[tokio::test]
async fn test_retry_policy_recovers_transient_failure() {
    let mock_server = MockServer::start().await;

    // The first catalog request fails, the second succeeds
    Mock::given(method("GET"))
        .and(path("/catalogue/"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/catalogue/",
        catalog_page(&[("Baths", "/catalogue/baths/")]),
    )
    .await;
    mount_page(
        &mock_server,
        "/catalogue/baths/",
        listing_page(1, &[("/p/1/", &["1"])]),
    )
    .await;
    mount_detail(
        &mock_server,
        "/p/1/",
        "1",
        detail_page(Some("Recovered"), Some("R1"), Some("5.00")),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("output.csv");
    let mut config = create_test_config(&mock_server.uri(), csv_path.to_str().unwrap());
    config.retry.max_attempts = 2;

    let summary = Coordinator::new(config)
        .unwrap()
        .run_and_persist()
        .await
        .expect("Harvest failed");

    assert_eq!(summary.records, 1);
    assert_eq!(requests_to(&mock_server, "/catalogue/").await, 2);

    let (_, rows) = read_rows(&csv_path);
    assert_eq!(rows, vec!["Recovered,R1,5.00"]);
}

#[tokio::test]
async fn test_empty_category_yields_header_only() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/catalogue/",
        catalog_page(&[("Empty", "/catalogue/empty/")]),
    )
    .await;
    mount_page(
        &mock_server,
        "/catalogue/empty/",
        "<html><body><p>No products in this section</p></body></html>".to_string(),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("output.csv");
    let config = create_test_config(&mock_server.uri(), csv_path.to_str().unwrap());

    let summary = Coordinator::new(config)
        .unwrap()
        .run_and_persist()
        .await
        .expect("Harvest failed");

    assert_eq!(summary.link_batches, 0);
    assert_eq!(summary.records, 0);
    assert_eq!(summary.total_failures(), 0);

    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content, "Name,SKU,Price\n");
}
