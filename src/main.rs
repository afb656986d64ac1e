use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use reelmates_api::{
    config::Config,
    db::{self, Cache, SessionStore},
    routes::create_router,
    services::catalog::TmdbCatalog,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let pool = db::create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let cache = Cache::new(redis_client.clone());
    let sessions = SessionStore::new(redis_client);

    let catalog = TmdbCatalog::new(
        cache,
        config.catalog_api_key.clone(),
        config.catalog_api_url.clone(),
    );

    let state = AppState::new(pool, sessions, Arc::new(catalog));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
