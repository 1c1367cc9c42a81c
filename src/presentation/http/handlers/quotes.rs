use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    application::quotes::dto::{
        CreateQuoteRequest, QuotePageResponse, QuoteResponse, UpdateQuoteRequest,
    },
    domain::shared::pagination::{PageQuery, PageRequest},
    presentation::http::{client::extract_client_ip, errors::AppError, state::AppState},
};

/// Raw strings so that junk values fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuotesParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub search: Option<String>,
}

pub async fn list_quotes(
    State(state): State<AppState>,
    params: Result<Query<ListQuotesParams>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Json<QuotePageResponse>, AppError> {
    // An undecodable query string (e.g. a repeated key) reads as "no filters".
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            tracing::warn!("Ignoring query string: {}", rejection.body_text());
            ListQuotesParams::default()
        }
    };
    let page = PageRequest::from_raw(params.page.as_deref(), params.page_size.as_deref());
    let query = PageQuery::new(page, params.search.as_deref());
    let viewer_ip = extract_client_ip(&headers);

    let page = state.quotes.list(query, &viewer_ip).await?;
    Ok(Json(page))
}

pub async fn random_quote(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<QuoteResponse>, AppError> {
    let quote = state.quotes.random(&extract_client_ip(&headers)).await?;
    Ok(Json(quote))
}

pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<QuoteResponse>, AppError> {
    let quote = state.quotes.get(&id, &extract_client_ip(&headers)).await?;
    Ok(Json(quote))
}

pub async fn create_quote(
    State(state): State<AppState>,
    payload: Result<Json<CreateQuoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let quote = state.quotes.create(request).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

pub async fn update_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<UpdateQuoteRequest>, JsonRejection>,
) -> Result<Json<QuoteResponse>, AppError> {
    let Json(request) = payload?;
    let quote = state
        .quotes
        .update(&id, request, &extract_client_ip(&headers))
        .await?;
    Ok(Json(quote))
}

pub async fn delete_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.quotes.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn top_weekly(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<QuoteResponse>, AppError> {
    let quote = state.quotes.top_weekly(&extract_client_ip(&headers)).await?;
    Ok(Json(quote))
}

pub async fn top_all_time(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<QuoteResponse>, AppError> {
    let quote = state
        .quotes
        .top_all_time(&extract_client_ip(&headers))
        .await?;
    Ok(Json(quote))
}
