use axum::routing::post;
use axum::Router;

use crate::handlers::passengers;
use crate::state::AppState;

/// ```text
/// POST   /passengers     -> create_passenger
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/passengers", post(passengers::create_passenger))
}
