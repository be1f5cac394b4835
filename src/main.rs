use std::sync::Arc;

use recipe_matcher::{
    api::{create_router, AppState},
    config::Config,
    services::{providers::mealdb::MealDbProvider, FileStorage, HistoryStore},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // Initialize application state
    let catalog = Arc::new(MealDbProvider::with_timeout(
        config.catalog_api_url.clone(),
        config.catalog_timeout(),
    )?);
    let storage = Arc::new(FileStorage::new(&config.history_dir));
    let history = HistoryStore::new(storage, config.history_key.clone());
    let state = AppState::new(catalog, history);

    // Create the router with all routes
    let app = create_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    // Start the server
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        address = %address,
        catalog = %config.catalog_api_url,
        history_dir = %config.history_dir.display(),
        "Server running"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
