use super::*;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use prodhunt_core::{Environment, ProductRecord, SelectorConfig};
use prodhunt_scraper::FetchConfig;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> AppConfig {
    AppConfig {
        database_url: None,
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
        log_level: "info".to_string(),
        sources_path: PathBuf::from("./config/sources.yaml"),
        db_max_connections: 5,
        db_min_connections: 1,
        db_acquire_timeout_secs: 5,
        scraper_request_timeout_secs: 5,
        scraper_user_agents: vec!["prodhunt-test/0.1".to_string()],
        scraper_politeness_gap_ms: 0,
        scraper_max_pages: 3,
        scraper_max_concurrent_sources: 2,
        rank_sentiment_weight: 1.0,
        rank_price_weight: 1.0,
    }
}

fn test_state(pool: sqlx::PgPool, sources: Vec<SourceConfig>) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
        sources: Arc::new(sources),
        fetcher: Arc::new(HttpFetcher::new(&FetchConfig::default()).expect("fetcher")),
    }
}

fn mock_source(name: &str, base_url: &str) -> SourceConfig {
    SourceConfig {
        name: name.to_string(),
        base_url: base_url.to_string(),
        search_url: format!("{base_url}/search?q={{keyword}}"),
        enabled: true,
        selectors: SelectorConfig {
            item: "li.item".to_string(),
            name: ".title".to_string(),
            price: ".price".to_string(),
            review_text: ".review".to_string(),
            product_link: "a.link".to_string(),
            image: "img".to_string(),
            next_page: None,
        },
    }
}

fn record(name: &str, price: &str, sentiment: f32) -> ProductRecord {
    let slug = name.to_lowercase().replace(' ', "-");
    ProductRecord {
        name: Some(name.to_string()),
        price: Some(price.to_string()),
        review_text: Some("does the job".to_string()),
        product_url: Some(format!("https://shop.test/p/{slug}")),
        image_url: Some(format!("https://shop.test/i/{slug}.jpg")),
        source: "Shop".to_string(),
        sentiment_score: sentiment,
        keyword: "blender".to_string(),
    }
}

async fn seed(pool: &sqlx::PgPool, records: &[ProductRecord]) {
    let source_id = prodhunt_db::get_or_create_source(pool, "Shop", "https://shop.test")
        .await
        .expect("seed source");
    for r in records {
        prodhunt_db::insert_product(pool, r, source_id)
            .await
            .expect("seed product");
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn scrape_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/scrape")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

// -------------------------------------------------------------------------
// Envelope helpers (no DB)
// -------------------------------------------------------------------------

#[test]
fn normalize_limit_applies_defaults_and_bounds() {
    assert_eq!(normalize_limit(None), 50);
    assert_eq!(normalize_limit(Some(0)), 1);
    assert_eq!(normalize_limit(Some(1_000)), 200);
    assert_eq!(normalize_limit(Some(25)), 25);
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("bad_request", StatusCode::BAD_REQUEST),
        ("not_found", StatusCode::NOT_FOUND),
        ("service_unavailable", StatusCode::SERVICE_UNAVAILABLE),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "msg").into_response();
        assert_eq!(response.status(), status, "code {code}");
    }
}

// -------------------------------------------------------------------------
// Read routes (with DB)
// -------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn health_reports_ok_and_echoes_request_id(pool: sqlx::PgPool) {
    let app = build_app(test_state(pool, vec![]));
    let request = Request::builder()
        .uri("/api/v1/health")
        .header(REQUEST_ID_HEADER, "health-req-1")
        .body(Body::empty())
        .expect("request");

    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["meta"]["request_id"], "health-req-1");
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_without_query_is_a_validation_error(pool: sqlx::PgPool) {
    for uri in ["/api/v1/search", "/api/v1/search?query=%20%20"] {
        let app = build_app(test_state(pool.clone(), vec![]));
        let (status, json) = send(app, get_request(uri)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "uri {uri}");
        assert_eq!(json["error"]["code"], "validation_error");
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_with_no_matches_is_not_found(pool: sqlx::PgPool) {
    seed(&pool, &[record("Glass Blender", "49.", 0.3)]).await;
    let app = build_app(test_state(pool, vec![]));

    let (status, json) = send(app, get_request("/api/v1/search?query=toaster")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
    assert_eq!(json["error"]["message"], "No products found");
    assert!(json["meta"]["request_id"].is_string());
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_returns_matches_and_best_product(pool: sqlx::PgPool) {
    seed(
        &pool,
        &[
            record("Pro Blender", "10.", 0.5),
            record("Mini Blender", "5.", 0.2),
            record("Stand Mixer", "3.", 0.9),
        ],
    )
    .await;
    let app = build_app(test_state(pool, vec![]));

    let (status, json) = send(app, get_request("/api/v1/search?query=BLENDER")).await;

    assert_eq!(status, StatusCode::OK);
    let products = json["data"]["products"].as_array().expect("products array");
    assert_eq!(products.len(), 2);
    assert_eq!(json["data"]["best_product"]["name"], "Mini Blender");
}

#[sqlx::test(migrations = "../../migrations")]
async fn search_best_product_is_null_without_parseable_prices(pool: sqlx::PgPool) {
    seed(&pool, &[record("Mystery Blender", "Call for price", 0.5)]).await;
    let app = build_app(test_state(pool, vec![]));

    let (status, json) = send(app, get_request("/api/v1/search?query=blender")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["products"].as_array().map(Vec::len), Some(1));
    assert!(json["data"]["best_product"].is_null());
}

#[sqlx::test(migrations = "../../migrations")]
async fn products_route_honors_limit(pool: sqlx::PgPool) {
    seed(
        &pool,
        &[
            record("Blender A", "1.", 0.0),
            record("Blender B", "2.", 0.0),
            record("Blender C", "3.", 0.0),
        ],
    )
    .await;
    let app = build_app(test_state(pool, vec![]));

    let (status, json) = send(app, get_request("/api/v1/products?limit=2")).await;

    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["name"], "Blender C");
}

#[sqlx::test(migrations = "../../migrations")]
async fn sources_route_lists_persisted_sources(pool: sqlx::PgPool) {
    seed(&pool, &[]).await;
    let app = build_app(test_state(pool, vec![]));

    let (status, json) = send(app, get_request("/api/v1/sources")).await;

    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Shop");
}

// -------------------------------------------------------------------------
// Scrape route (with DB + wiremock)
// -------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn scrape_rejects_blank_keyword(pool: sqlx::PgPool) {
    for body in [r#"{"keyword": "   "}"#, "{}"] {
        let app = build_app(test_state(pool.clone(), vec![]));
        let (status, json) = send(app, scrape_request(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(json["error"]["code"], "validation_error");
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn scrape_rejects_malformed_json(pool: sqlx::PgPool) {
    let app = build_app(test_state(pool, vec![]));

    let (status, json) = send(app, scrape_request("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "bad_request");
}

#[sqlx::test(migrations = "../../migrations")]
async fn scrape_crawls_sources_and_persists_records(pool: sqlx::PgPool) {
    let server = MockServer::start().await;
    let html = r#"<ul>
        <li class="item">
          <a class="link" href="/p/1"><span class="title">Quiet Blender</span></a>
          <span class="price">$59.99</span>
          <p class="review">Excellent, quiet and powerful</p>
          <img src="/img/1.jpg">
        </li>
        <li class="item">
          <a class="link" href="/p/2"><span class="title">Incomplete Blender</span></a>
        </li>
      </ul>"#;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let down = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&down)
        .await;

    let sources = vec![
        mock_source("MockShop", &server.uri()),
        mock_source("DownShop", &down.uri()),
    ];
    let app = build_app(test_state(pool.clone(), sources));

    let (status, json) = send(app, scrape_request(r#"{"keyword": "blender"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["keyword"], "blender");
    assert_eq!(json["data"]["records_persisted"], 1);

    let outcomes = json["data"]["sources"].as_array().expect("sources array");
    assert_eq!(outcomes[0]["name"], "MockShop");
    assert_eq!(outcomes[0]["records"], 1);
    assert_eq!(outcomes[0]["stop_reason"], "no_next_page");
    assert_eq!(outcomes[1]["name"], "DownShop");
    assert_eq!(outcomes[1]["stop_reason"], "fetch_failed");
    assert_eq!(outcomes[1]["records"], 0);

    let rows = prodhunt_db::list_products(&pool, 10).await.expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Quiet Blender");
    assert_eq!(rows[0].source_name, "MockShop");
    assert!(rows[0].sentiment_score > 0.0);

    let stored_sources = prodhunt_db::list_sources(&pool).await.expect("sources");
    assert_eq!(stored_sources.len(), 1, "failed source must not be registered");
}
