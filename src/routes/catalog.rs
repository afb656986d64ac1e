use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    extract::CurrentAccount,
    models::{
        catalog::{CatalogItem, RegionAvailability},
        MediaKind,
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

/// Handler proxying catalog multi-search
pub async fn search(
    State(state): State<AppState>,
    CurrentAccount(_): CurrentAccount,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<CatalogItem>>> {
    let items = state.catalog.search(&params.q).await?;
    Ok(Json(items))
}

/// Handler for regional watch-provider lookup
pub async fn watch_providers(
    State(state): State<AppState>,
    CurrentAccount(_): CurrentAccount,
    Path((kind, item_id)): Path<(MediaKind, i64)>,
) -> AppResult<Json<RegionAvailability>> {
    let availability = state.catalog.watch_providers(kind, item_id).await?;
    Ok(Json(availability))
}
