pub mod health;
pub mod imports;
pub mod passengers;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /imports/passengers          POST  bulk passenger import (multipart `file`)
/// /imports/vehicles            POST  bulk vehicle import (multipart `file`)
/// /imports/runs                GET   list import runs (?limit, offset)
/// /imports/runs/{id}           GET   single import run with its report
///
/// /passengers                  POST  create one passenger
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .nest("/imports", imports::router(config.import.max_upload_bytes))
        .merge(passengers::router())
}
