//! Test helpers for ChemVisualizer server integration tests
//!
//! Provides an in-memory SQLite pool with migrations applied, a router
//! builder, and request helpers for the multipart upload endpoint.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;
use tower_http::normalize_path::NormalizePath;

use chemviz_server::{
    api::{create_app, AppState},
    config::Config,
    db,
};

/// The served application: the router behind trailing-slash normalization
pub type App = NormalizePath<Router>;

/// Multipart boundary used by [`multipart_body`]
pub const BOUNDARY: &str = "chemviz-test-boundary";

/// Small well-known dataset: two reactors and one pump
pub const SAMPLE_CSV: &str = "Equipment Name,Type,Flowrate,Pressure,Temperature\n\
                              R-101,Reactor,40,120,80\n\
                              R-102,Reactor,60,140,90\n\
                              P-201,Pump,20,50,30\n";

/// Base configuration for tests: in-memory database, defaults elsewhere
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config
}

/// Create a fresh in-memory database with all migrations applied
pub async fn setup_test_db() -> SqlitePool {
    let config = test_config();
    let pool = db::create_pool(&config.database)
        .await
        .expect("Failed to create test database pool");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Build the application over the given pool with default config
pub fn setup_test_app(pool: SqlitePool) -> App {
    setup_test_app_with_config(pool, test_config())
}

/// Build the application with a customized config
pub fn setup_test_app_with_config(pool: SqlitePool, config: Config) -> App {
    create_app(AppState { db: pool, config })
}

/// Encode one file field as a multipart/form-data body
pub fn multipart_body(field_name: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
             Content-Type: text/csv\r\n\r\n",
            field_name, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// POST a CSV to `/api/upload` and decode the JSON response
pub async fn post_csv(app: &App, filename: &str, content: &[u8]) -> (StatusCode, Value) {
    post_csv_to(app, "/api/upload", filename, content).await
}

/// POST a CSV to an explicit URI and decode the JSON response
pub async fn post_csv_to(
    app: &App,
    uri: &str,
    filename: &str,
    content: &[u8],
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body("file", filename, content)))
        .expect("Failed to build upload request");

    send_json(app, request).await
}

/// GET a JSON endpoint
pub async fn get_json(app: &App, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build GET request");

    send_json(app, request).await
}

/// GET an endpoint and return the raw response (for binary bodies)
pub async fn get_raw(app: &App, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build GET request");

    app.clone()
        .oneshot(request)
        .await
        .expect("Request failed")
}

/// Dispatch a request and decode the body as JSON (Null when empty)
pub async fn send_json(app: &App, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not valid JSON")
    };

    (status, json)
}

/// Read a response body fully into bytes
pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body")
        .to_vec()
}
