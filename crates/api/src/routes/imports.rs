//! Routes for bulk CSV imports. Mounted at `/imports`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::imports;
use crate::state::AppState;

/// ```text
/// POST   /passengers     -> import_passengers
/// POST   /vehicles       -> import_vehicles
/// GET    /runs           -> list_runs (?limit, offset)
/// GET    /runs/{id}      -> get_run
/// ```
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/passengers", post(imports::import_passengers))
        .route("/vehicles", post(imports::import_vehicles))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .route("/runs", get(imports::list_runs))
        .route("/runs/{id}", get(imports::get_run))
}
