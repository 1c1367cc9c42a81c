use crate::presentation::http::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadinessResponse {
    status: &'static str,
    database: &'static str,
}

/// Answers as long as the process serves requests; touches nothing else.
pub async fn health_check() -> impl IntoResponse {
    Json(LivenessResponse { status: "ok" })
}

pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.quotes.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ok",
                database: "up",
            }),
        ),
        Err(e) => {
            tracing::error!("Readiness check failed: database unreachable: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "unavailable",
                    database: "down",
                }),
            )
        }
    }
}
