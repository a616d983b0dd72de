//! Student API server: reads config from the environment, prepares the store, serves HTTP.

use std::sync::Arc;
use student_api::{app, auth, ensure_database_exists, AppConfig, AppState, MemoryStore, PgStore, StoreBackend};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("student_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(?config, "starting");

    let state = match config.backend {
        StoreBackend::Postgres => {
            ensure_database_exists(&config.database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&config.database_url)
                .await?;
            let store = PgStore::new(pool, &config.schema);
            store.ensure_tables().await?;
            AppState::from_store(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on exit");
            AppState::from_store(Arc::new(MemoryStore::new()))
        }
    };

    if let Some(admin) = &config.admin {
        auth::bootstrap_user(state.auth.as_ref(), &admin.username, &admin.password).await?;
    }

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state, config.max_body_bytes)).await?;
    Ok(())
}
