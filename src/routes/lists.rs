use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    extract::CurrentAccount,
    models::{catalog::CatalogItem, ListKind, MediaEntry},
    state::AppState,
};

/// Handler returning one list, most recently added first
pub async fn get_list(
    State(state): State<AppState>,
    CurrentAccount(account_id): CurrentAccount,
    Path(kind): Path<ListKind>,
) -> AppResult<Json<Vec<MediaEntry>>> {
    let entries = state.lists.entries(account_id, kind).await?;
    Ok(Json(entries))
}

/// Handler adding (or overwriting) a catalog item in a list
pub async fn add_entry(
    State(state): State<AppState>,
    CurrentAccount(account_id): CurrentAccount,
    Path(kind): Path<ListKind>,
    Json(item): Json<CatalogItem>,
) -> AppResult<(StatusCode, Json<MediaEntry>)> {
    let entry = state
        .lists
        .add_entry(state.catalog.as_ref(), account_id, kind, item)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Handler removing an entry; removing a missing entry still returns 204
pub async fn remove_entry(
    State(state): State<AppState>,
    CurrentAccount(account_id): CurrentAccount,
    Path((kind, item_id)): Path<(ListKind, i64)>,
) -> AppResult<StatusCode> {
    state.lists.remove_entry(account_id, kind, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
