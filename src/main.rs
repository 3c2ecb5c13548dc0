use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelmatch_api::{
    api::{create_router, AppState},
    config::Config,
    services::{Catalog, InMemorySessionStore, MovieMetadata, SessionManager},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelmatch_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // No session can start without a complete catalog
    let catalog = Catalog::load(&config.catalog_path, &config.catalog_options()?)
        .map_err(|e| anyhow::anyhow!("Failed to load catalog {}: {}", config.catalog_path, e))?;

    let metadata = match &config.metadata_path {
        Some(path) => MovieMetadata::load(path)?,
        None => MovieMetadata::empty(),
    };

    let sessions = SessionManager::new(
        Arc::new(catalog),
        Arc::new(InMemorySessionStore::new()),
        config.session_settings(),
    )
    .with_rng_seed(config.rng_seed)
    .with_max_sessions(config.max_sessions);

    let app = create_router(AppState::new(sessions, metadata));

    let address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app).await?;

    Ok(())
}
