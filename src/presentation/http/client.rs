//! Caller identity derived from request headers.

use axum::http::{HeaderMap, header};

/// Used when no proxy header names the caller.
pub const FALLBACK_CLIENT_IP: &str = "127.0.0.1";

/// First `X-Forwarded-For` entry, then `X-Real-IP`, then loopback.
///
/// The value keys the one-like-per-client rule. It is taken as sent.
pub fn extract_client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or(FALLBACK_CLIENT_IP)
        .to_string()
}

/// Empty when the header is absent or not valid UTF-8.
pub fn extract_user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
