use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};

use crate::{
    application::quotes::dto::{LikeStatusResponse, MessageResponse, QuoteResponse},
    presentation::http::{
        client::{extract_client_ip, extract_user_agent},
        errors::AppError,
        state::AppState,
    },
};

pub async fn like_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<QuoteResponse>, AppError> {
    let user_ip = extract_client_ip(&headers);
    let user_agent = extract_user_agent(&headers);

    let quote = state.quotes.like(&id, &user_ip, &user_agent).await?;
    Ok(Json(quote))
}

pub async fn like_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<LikeStatusResponse>, AppError> {
    let is_liked = state
        .quotes
        .is_liked(&id, &extract_client_ip(&headers))
        .await?;
    Ok(Json(LikeStatusResponse { is_liked }))
}

pub async fn reset_likes(State(state): State<AppState>) -> Result<Json<MessageResponse>, AppError> {
    state.quotes.reset_likes().await?;
    Ok(Json(MessageResponse {
        message: "All likes have been reset".to_string(),
    }))
}
