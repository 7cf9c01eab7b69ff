#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use fleetops_api::config::ServerConfig;
use fleetops_api::router::build_app_router;
use fleetops_api::state::AppState;
use fleetops_events::EventBus;
use fleetops_pipeline::ImportConfig;

pub const PASSENGER_HEADER: &str =
    "email,password,full_name,phone,department,employee_id,home_address";
pub const VEHICLE_HEADER: &str = "plate_number,brand,model,year,capacity,fuel_type,status";

const BOUNDARY: &str = "fleetops-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        import: ImportConfig::default(),
    }
}

pub fn build_test_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
        event_bus: Arc::new(EventBus::default()),
    }
}

/// Build the full application router over `state`, with the same middleware
/// stack production uses.
pub fn build_test_app_with_state(state: AppState) -> Router {
    let config = test_config();
    build_app_router(state, &config)
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_state(build_test_state(pool))
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a multipart body with a single CSV file field.
pub async fn post_csv(app: Router, uri: &str, field: &str, csv: &str) -> Response {
    post_file(app, uri, field, csv.as_bytes()).await
}

pub async fn post_file(app: Router, uri: &str, field: &str, data: &[u8]) -> Response {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"import.csv\"\r\n\
         Content-Type: text/csv\r\n\
         \r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// One passenger CSV line with a valid password.
pub fn passenger_line(email: &str, employee_id: &str) -> String {
    format!("{email},secret123,Pasajero {employee_id},555-0100,Operaciones,{employee_id},Calle 1")
}
