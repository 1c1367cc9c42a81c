use axum::{
    Json,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::json;

/// API paths get the JSON error envelope, everything else plain text.
fn error_response(uri: &Uri, status: StatusCode, message: &'static str) -> Response {
    if uri.path().starts_with("/api") {
        (status, Json(json!({ "error": message }))).into_response()
    } else {
        (status, message).into_response()
    }
}

pub async fn not_found(uri: Uri) -> Response {
    error_response(&uri, StatusCode::NOT_FOUND, "Not found")
}

/// Known path, unsupported method.
pub async fn method_not_allowed(uri: Uri) -> Response {
    error_response(&uri, StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
