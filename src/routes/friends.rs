use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    extract::CurrentAccount,
    models::{FriendRequest, Profile},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SendRequestBody {
    pub to_account_id: Uuid,
}

/// Handler returning the caller's current friend set
pub async fn list_friends(
    State(state): State<AppState>,
    CurrentAccount(account_id): CurrentAccount,
) -> AppResult<Json<Vec<Profile>>> {
    let friends = state.social.list_friends(account_id).await?;
    Ok(Json(friends))
}

/// Handler returning pending incoming friend requests
pub async fn list_requests(
    State(state): State<AppState>,
    CurrentAccount(account_id): CurrentAccount,
) -> AppResult<Json<Vec<FriendRequest>>> {
    let requests = state.social.list_requests(account_id).await?;
    Ok(Json(requests))
}

/// Handler sending a friend request; idempotent per (recipient, sender)
pub async fn send_request(
    State(state): State<AppState>,
    CurrentAccount(account_id): CurrentAccount,
    Json(body): Json<SendRequestBody>,
) -> AppResult<StatusCode> {
    state.social.send_request(account_id, body.to_account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler accepting a pending request atomically
pub async fn accept_request(
    State(state): State<AppState>,
    CurrentAccount(account_id): CurrentAccount,
    Path(sender_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.social.accept_request(account_id, sender_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler declining a pending request; never creates an edge
pub async fn decline_request(
    State(state): State<AppState>,
    CurrentAccount(account_id): CurrentAccount,
    Path(sender_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.social.decline_request(account_id, sender_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
