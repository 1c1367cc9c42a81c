//! Cross-origin headers for browser clients.
//!
//! With `CORS_ORIGIN=*` the caller's `Origin` is echoed back so that
//! credentialed requests keep working. Preflights under `/api` are answered
//! here with 204 and never reach routing.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::presentation::http::state::AppState;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS, PATCH";
const ALLOW_HEADERS: &str = "Origin, Content-Type, Accept, Authorization, X-Requested-With";
const EXPOSE_HEADERS: &str = "Content-Length, Content-Type, X-Backend";

pub async fn cors_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let allow_origin = resolve_allow_origin(&state.config.cors_origin, req.headers());
    let is_preflight = req.method() == Method::OPTIONS && req.uri().path().starts_with("/api");

    let mut response = if is_preflight {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    apply_cors_headers(response.headers_mut(), allow_origin);
    response
}

fn resolve_allow_origin(configured: &str, request_headers: &HeaderMap) -> HeaderValue {
    let wildcard = HeaderValue::from_static("*");
    if configured.trim() == "*" {
        return request_headers
            .get(header::ORIGIN)
            .cloned()
            .unwrap_or(wildcard);
    }
    HeaderValue::from_str(configured.trim()).unwrap_or(wildcard)
}

fn apply_cors_headers(headers: &mut HeaderMap, allow_origin: HeaderValue) {
    // Browsers reject credentials combined with a literal "*".
    if allow_origin != "*" {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSE_HEADERS),
    );
    headers.append(header::VARY, HeaderValue::from_static("Origin"));
}
