use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use artisan_api::{
    api::{create_router, AppState},
    config::Config,
    db::{self, Cache},
    stores::{PgOrderStore, PgProductStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();

    let pool = db::create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client).await;

    let orders = Arc::new(PgOrderStore::new(pool.clone()));
    let products = Arc::new(PgProductStore::new(
        pool,
        cache,
        config.latest_products_ttl,
    ));

    let state = AppState::new(
        orders,
        products,
        config.recommender_settings(),
        config.default_limit,
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush any cache writes still in flight before exiting
    cache_writer.shutdown().await;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
