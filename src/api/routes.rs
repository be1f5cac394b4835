use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Catalog reference data
        .route("/catalog/areas", get(handlers::list_areas))
        .route("/catalog/categories", get(handlers::list_categories))
        .route("/catalog/ingredients", get(handlers::suggest_ingredients))
        .route("/catalog/search", get(handlers::search_recipes))
        // Wizard
        .route("/wizard", get(handlers::get_wizard))
        .route("/wizard/area", put(handlers::set_area))
        .route("/wizard/criterion", put(handlers::set_criterion))
        .route("/wizard/strategy", put(handlers::set_strategy))
        .route("/wizard/next", post(handlers::next_step))
        .route("/wizard/back", post(handlers::previous_step))
        .route("/wizard/restart", post(handlers::restart))
        // Recommendation
        .route(
            "/recommendation",
            get(handlers::get_recommendation).post(handlers::recommend_again),
        )
        .route("/recommendation/feedback", post(handlers::give_feedback))
        // History
        .route("/history", get(handlers::get_history))
        .route("/history/events", get(handlers::history_events))
        .with_state(state)
}
