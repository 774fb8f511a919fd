use crate::AppState;
use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

/// Liveness plus a database ping.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_up = state.db.ping().await.is_ok();
    let status = if db_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if db_up { "up" } else { "down" },
            "timestamp": Utc::now(),
        })),
    )
}
