use axum::{extract::State, Json};

use crate::{error::AppResult, extract::CurrentAccount, models::FeedItem, state::AppState};

/// Handler for the friends-activity feed
///
/// Fully recomputed on every request: resolve the friend set, fan out the
/// per-friend fetches, merge.
pub async fn get_feed(
    State(state): State<AppState>,
    CurrentAccount(account_id): CurrentAccount,
) -> AppResult<Json<Vec<FeedItem>>> {
    let friends = state.social.list_friends(account_id).await?;
    let items = state.feed.build(friends).await?;
    Ok(Json(items))
}
