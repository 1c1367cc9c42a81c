use super::helpers::{
    build_config, create_quote, expect_status, get, json_request, read_json, read_text, send,
    spawn_app, spawn_app_with_config,
};
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};

#[tokio::test]
async fn health_reports_ok_with_backend_marker() {
    let app = spawn_app();

    let res = expect_status(send(&app.app, get("/health", "10.0.0.1")).await, StatusCode::OK).await;
    assert_eq!(res.headers()["x-backend"], "rust");
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = read_json(res).await;
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn readiness_follows_the_store() {
    let app = spawn_app();

    let res = expect_status(
        send(&app.app, get("/health/ready", "10.0.0.1")).await,
        StatusCode::OK,
    )
    .await;
    let body: Value = read_json(res).await;
    assert_eq!(body["database"], "up");

    app.repo.set_offline(true);
    let res = expect_status(
        send(&app.app, get("/health/ready", "10.0.0.1")).await,
        StatusCode::SERVICE_UNAVAILABLE,
    )
    .await;
    let body: Value = read_json(res).await;
    assert_eq!(body, json!({ "status": "unavailable", "database": "down" }));
}

#[tokio::test]
async fn created_quote_can_be_fetched() {
    let app = spawn_app();

    let req = json_request(
        "POST",
        "/api/quotes",
        &json!({ "text": "  Stay hungry, stay foolish.  ", "author": "Steve Jobs" }),
    );
    let res = expect_status(send(&app.app, req).await, StatusCode::CREATED).await;
    let created: Value = read_json(res).await;
    assert_eq!(created["text"], "Stay hungry, stay foolish.");
    assert_eq!(created["likes_count"], 0);
    assert_eq!(created["is_liked"], false);
    assert_eq!(created["created_at"], created["updated_at"]);

    let id = created["id"].as_str().expect("missing id");
    assert_eq!(id.len(), 36);

    let res = expect_status(
        send(&app.app, get(&format!("/api/quotes/{}", id), "10.0.0.1")).await,
        StatusCode::OK,
    )
    .await;
    let fetched: Value = read_json(res).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_rejects_missing_or_blank_fields() {
    let app = spawn_app();

    let req = json_request("POST", "/api/quotes", &json!({ "text": "No author" }));
    let res = expect_status(send(&app.app, req).await, StatusCode::BAD_REQUEST).await;
    let body: Value = read_json(res).await;
    assert_eq!(body["error"], "author is required");

    let req = json_request("POST", "/api/quotes", &json!({ "text": "   ", "author": "Anon" }));
    let res = expect_status(send(&app.app, req).await, StatusCode::BAD_REQUEST).await;
    let body: Value = read_json(res).await;
    assert_eq!(body["error"], "text must not be empty");
}

#[tokio::test]
async fn malformed_json_is_a_bad_request_with_error_body() {
    let app = spawn_app();

    let req = Request::builder()
        .method("POST")
        .uri("/api/quotes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"text\": "))
        .expect("failed to build request");
    let res = expect_status(send(&app.app, req).await, StatusCode::BAD_REQUEST).await;
    let body: Value = read_json(res).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn list_pages_newest_first() {
    let app = spawn_app();
    let now = Utc::now();
    for i in 0..15 {
        app.repo
            .seed(&format!("Quote {}", i), "Author", 0, now - TimeDelta::minutes(i))
            .await;
    }

    let res = expect_status(
        send(&app.app, get("/api/quotes?page=2&page_size=10", "10.0.0.1")).await,
        StatusCode::OK,
    )
    .await;
    let body: Value = read_json(res).await;
    assert_eq!(body["total"], 15);
    assert_eq!(body["page"], 2);
    assert_eq!(body["page_size"], 10);
    assert_eq!(body["total_pages"], 2);
    let quotes = body["quotes"].as_array().expect("quotes array");
    assert_eq!(quotes.len(), 5);
    assert_eq!(quotes[0]["text"], "Quote 10");
    assert_eq!(quotes[4]["text"], "Quote 14");
}

#[tokio::test]
async fn list_clamps_and_defaults_pagination() {
    let app = spawn_app();
    create_quote(&app.app, "Only one", "Someone").await;

    let cases = [
        ("/api/quotes?page=0&page_size=0", 1, 1),
        ("/api/quotes?page=-4&page_size=1000", 1, 100),
        ("/api/quotes?page=abc&page_size=xyz", 1, 10),
        ("/api/quotes", 1, 10),
    ];

    for (uri, page, page_size) in cases {
        let res = expect_status(send(&app.app, get(uri, "10.0.0.1")).await, StatusCode::OK).await;
        let body: Value = read_json(res).await;
        assert_eq!(body["page"], page, "page for {}", uri);
        assert_eq!(body["page_size"], page_size, "page_size for {}", uri);
    }
}

#[tokio::test]
async fn undecodable_query_string_uses_default_paging() {
    let app = spawn_app();
    create_quote(&app.app, "Still listed", "Someone").await;

    let res = expect_status(
        send(&app.app, get("/api/quotes?page=1&page=2", "10.0.0.1")).await,
        StatusCode::OK,
    )
    .await;
    let body: Value = read_json(res).await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 10);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn empty_list_has_zero_pages() {
    let app = spawn_app();

    let res = expect_status(
        send(&app.app, get("/api/quotes", "10.0.0.1")).await,
        StatusCode::OK,
    )
    .await;
    let body: Value = read_json(res).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["total_pages"], 0);
    assert_eq!(body["quotes"], json!([]));
}

#[tokio::test]
async fn search_matches_text_or_author_ignoring_case() {
    let app = spawn_app();
    create_quote(&app.app, "Stay hungry, stay foolish.", "Steve Jobs").await;
    create_quote(&app.app, "Simplicity is the ultimate sophistication.", "Leonardo").await;
    create_quote(&app.app, "Talk is cheap.", "Linus").await;

    let res = expect_status(
        send(&app.app, get("/api/quotes?search=JOBS", "10.0.0.1")).await,
        StatusCode::OK,
    )
    .await;
    let body: Value = read_json(res).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["quotes"][0]["author"], "Steve Jobs");

    let res = expect_status(
        send(&app.app, get("/api/quotes?search=ultimate", "10.0.0.1")).await,
        StatusCode::OK,
    )
    .await;
    let body: Value = read_json(res).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["quotes"][0]["author"], "Leonardo");

    let res = expect_status(
        send(&app.app, get("/api/quotes?search=%20%20", "10.0.0.1")).await,
        StatusCode::OK,
    )
    .await;
    let body: Value = read_json(res).await;
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let app = spawn_app();
    let id = create_quote(&app.app, "Original text", "Original author").await;

    let req = json_request(
        "PUT",
        &format!("/api/quotes/{}", id),
        &json!({ "text": "Edited text" }),
    );
    let res = expect_status(send(&app.app, req).await, StatusCode::OK).await;
    let body: Value = read_json(res).await;
    assert_eq!(body["text"], "Edited text");
    assert_eq!(body["author"], "Original author");
    assert_eq!(body["likes_count"], 0);

    let req = json_request("PUT", &format!("/api/quotes/{}", id), &json!({ "author": "" }));
    expect_status(send(&app.app, req).await, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn update_of_missing_quote_is_not_found() {
    let app = spawn_app();

    let req = json_request(
        "PUT",
        "/api/quotes/does-not-exist",
        &json!({ "text": "anything" }),
    );
    let res = expect_status(send(&app.app, req).await, StatusCode::NOT_FOUND).await;
    let body: Value = read_json(res).await;
    assert_eq!(body["error"], "quote not found");
}

#[tokio::test]
async fn delete_twice_is_not_found_the_second_time() {
    let app = spawn_app();
    let id = create_quote(&app.app, "Short lived", "Nobody").await;

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/quotes/{}", id))
            .body(Body::empty())
            .expect("failed to build request")
    };

    let res = expect_status(send(&app.app, delete()).await, StatusCode::NO_CONTENT).await;
    assert!(read_text(res).await.is_empty());
    expect_status(send(&app.app, delete()).await, StatusCode::NOT_FOUND).await;
    expect_status(
        send(&app.app, get(&format!("/api/quotes/{}", id), "10.0.0.1")).await,
        StatusCode::NOT_FOUND,
    )
    .await;
}

#[tokio::test]
async fn random_needs_at_least_one_quote() {
    let app = spawn_app();

    let res = expect_status(
        send(&app.app, get("/api/quotes/random", "10.0.0.1")).await,
        StatusCode::NOT_FOUND,
    )
    .await;
    let body: Value = read_json(res).await;
    assert!(body["error"].is_string());

    let id = create_quote(&app.app, "The only one", "Solo").await;
    let res = expect_status(
        send(&app.app, get("/api/quotes/random", "10.0.0.1")).await,
        StatusCode::OK,
    )
    .await;
    let body: Value = read_json(res).await;
    assert_eq!(body["id"], id.as_str());
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let app = spawn_app();

    let res = expect_status(
        send(&app.app, get("/api/nothing-here", "10.0.0.1")).await,
        StatusCode::NOT_FOUND,
    )
    .await;
    let body: Value = read_json(res).await;
    assert_eq!(body, json!({ "error": "Not found" }));

    let res = expect_status(
        send(&app.app, get("/favicon.ico", "10.0.0.1")).await,
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(read_text(res).await, "Not found");
}

#[tokio::test]
async fn unsupported_method_on_api_path_is_json() {
    let app = spawn_app();

    let req = Request::builder()
        .method("POST")
        .uri("/api/quotes/random")
        .body(Body::empty())
        .expect("failed to build request");
    let res = expect_status(send(&app.app, req).await, StatusCode::METHOD_NOT_ALLOWED).await;
    assert_eq!(res.headers()["x-backend"], "rust");
    let body: Value = read_json(res).await;
    assert_eq!(body, json!({ "error": "Method not allowed" }));

    let req = Request::builder()
        .method("DELETE")
        .uri("/health")
        .body(Body::empty())
        .expect("failed to build request");
    let res = expect_status(send(&app.app, req).await, StatusCode::METHOD_NOT_ALLOWED).await;
    assert_eq!(read_text(res).await, "Method not allowed");
}

#[tokio::test]
async fn preflight_reflects_origin_with_credentials() {
    let app = spawn_app();

    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/quotes")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())
        .expect("failed to build request");
    let res = expect_status(send(&app.app, req).await, StatusCode::NO_CONTENT).await;

    let headers = res.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, PUT, DELETE, OPTIONS, PATCH"
    );
    assert_eq!(headers["x-backend"], "rust");
}

#[tokio::test]
async fn configured_origin_is_sent_on_regular_responses() {
    let app = spawn_app_with_config(build_config("https://quotes.example"));

    let req = Request::builder()
        .method("GET")
        .uri("/api/quotes")
        .header(header::ORIGIN, "http://elsewhere.test")
        .body(Body::empty())
        .expect("failed to build request");
    let res = expect_status(send(&app.app, req).await, StatusCode::OK).await;
    assert_eq!(
        res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://quotes.example"
    );
    assert_eq!(
        res.headers()[header::ACCESS_CONTROL_EXPOSE_HEADERS],
        "Content-Length, Content-Type, X-Backend"
    );
}
