use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{error::AppResult, extract::CurrentAccount, models::Profile, state::AppState};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

/// Handler for display-name prefix search; never returns the caller
pub async fn search(
    State(state): State<AppState>,
    CurrentAccount(account_id): CurrentAccount,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Profile>>> {
    let profiles = state.identity.search_profiles(account_id, &params.q).await?;
    Ok(Json(profiles))
}
