use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Opens the process-wide pool. `main` owns it and hands clones to handlers
/// through `AppState`.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Closes every pooled connection; call once during shutdown.
pub async fn close_pool(pool: &PgPool) {
    pool.close().await;
    tracing::info!("Database pool closed");
}
