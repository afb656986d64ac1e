use std::sync::Arc;

use sqlx::PgPool;

use crate::db::SessionStore;
use crate::services::catalog::CatalogProvider;
use crate::services::{FeedService, IdentityService, ListService, SocialService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub identity: IdentityService,
    pub social: SocialService,
    pub lists: ListService,
    pub feed: FeedService,
    pub sessions: SessionStore,
    pub catalog: Arc<dyn CatalogProvider>,
}

impl AppState {
    pub fn new(db: PgPool, sessions: SessionStore, catalog: Arc<dyn CatalogProvider>) -> Self {
        Self {
            identity: IdentityService::new(db.clone()),
            social: SocialService::new(db.clone()),
            lists: ListService::new(db.clone()),
            feed: FeedService::new(db),
            sessions,
            catalog,
        }
    }
}
