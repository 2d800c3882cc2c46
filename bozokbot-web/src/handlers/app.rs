use crate::services::metrics::get_metrics;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use serde_json::json;

pub async fn root() -> Redirect {
    Redirect::to("/Chat")
}

/// Liveness of this service alone; does not touch the backend.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "bozokbot-web",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready only while the backend reports healthy.
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    if state.backend.check_health().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Prometheus scrape endpoint.
pub async fn metrics() -> String {
    get_metrics()
}
