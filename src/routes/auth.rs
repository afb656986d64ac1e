use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    extract::bearer_token,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub account_id: Uuid,
    pub token: String,
}

/// Handler for account registration
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let account_id = state
        .identity
        .register(&request.email, &request.password, &request.display_name)
        .await?;
    let token = state.sessions.create(account_id).await?;

    Ok((StatusCode::CREATED, Json(SessionResponse { account_id, token })))
}

/// Handler for login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<SessionResponse>> {
    let account_id = state.identity.login(&request.email, &request.password).await?;
    let token = state.sessions.create(account_id).await?;

    Ok(Json(SessionResponse { account_id, token }))
}

/// Handler for logout; destroys the presented session token
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<StatusCode> {
    let token =
        bearer_token(&headers).ok_or_else(|| AppError::Auth("missing bearer token".to_string()))?;
    state.sessions.destroy(token).await?;

    Ok(StatusCode::NO_CONTENT)
}
