use super::{
    handlers::{fallback, health, likes, quotes},
    middleware::{cors::cors_middleware, request_id::request_id_middleware},
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue},
    middleware,
    routing::{delete, get, put},
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let marker = HeaderValue::from_str(&state.config.backend_marker)
        .unwrap_or_else(|_| HeaderValue::from_static("rust"));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route(
            "/api/quotes",
            get(quotes::list_quotes).post(quotes::create_quote),
        )
        .route("/api/quotes/random", get(quotes::random_quote))
        .route("/api/quotes/top/weekly", get(quotes::top_weekly))
        .route("/api/quotes/top/alltime", get(quotes::top_all_time))
        .route("/api/quotes/likes/reset", delete(likes::reset_likes))
        .route(
            "/api/quotes/{id}",
            get(quotes::get_quote)
                .put(quotes::update_quote)
                .delete(quotes::delete_quote),
        )
        .route("/api/quotes/{id}/like", put(likes::like_quote))
        .route("/api/quotes/{id}/is-liked", get(likes::like_status))
        .fallback(fallback::not_found)
        .method_not_allowed_fallback(fallback::method_not_allowed)
        .layer(TraceLayer::new_for_http())
        // Outside the trace layer so its events land in the request-id span.
        .layer(middleware::from_fn(request_id_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), cors_middleware))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-backend"),
            marker,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
