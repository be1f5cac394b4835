use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;

use crate::{
    error::{AppError, AppResult},
    models::{
        HistoryItem, Outcome, Preferences, Recipe, Strategy, Transition, WizardState,
        WizardStep,
    },
    services::suggestions,
};

use super::AppState;

const MAX_INGREDIENT_SUGGESTIONS: usize = 10;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SetAreaRequest {
    pub area: String,
}

#[derive(Debug, Deserialize)]
pub struct SetCriterionRequest {
    pub value: String,
    pub strategy: Strategy,
}

#[derive(Debug, Deserialize)]
pub struct SetStrategyRequest {
    pub strategy: Strategy,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub liked: bool,
}

#[derive(Debug, Serialize)]
pub struct WizardResponse {
    pub step: u8,
    pub preferences: Preferences,
}

impl From<&WizardState> for WizardResponse {
    fn from(wizard: &WizardState) -> Self {
        Self {
            step: wizard.step.number(),
            preferences: wizard.preferences.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NextStepResponse {
    #[serde(flatten)]
    pub wizard: WizardResponse,
    /// Present when leaving step 2 started a recommendation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub history_item: HistoryItem,
    /// The next idea, recommended with the same preferences
    pub outcome: Outcome,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All areas (cuisines) in the catalog
pub async fn list_areas(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.catalog.list_areas().await?))
}

/// All categories in the catalog
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.catalog.list_categories().await?))
}

/// Ingredient suggestions for a partial name
pub async fn suggest_ingredients(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<String>>> {
    if params.q.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }

    let all = state.catalog.list_ingredients().await?;
    Ok(Json(suggestions::suggest_ingredients(
        &all,
        &params.q,
        MAX_INGREDIENT_SUGGESTIONS,
    )))
}

/// Search recipes by name
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Recipe>>> {
    if params.q.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    Ok(Json(state.catalog.search_by_name(&params.q).await?))
}

/// Current wizard step and preferences
pub async fn get_wizard(State(state): State<AppState>) -> Json<WizardResponse> {
    let wizard = state.wizard.read().await;
    Json(WizardResponse::from(&*wizard))
}

pub async fn set_area(
    State(state): State<AppState>,
    Json(request): Json<SetAreaRequest>,
) -> Json<WizardResponse> {
    let mut wizard = state.wizard.write().await;
    wizard.preferences.set_area(request.area);
    Json(WizardResponse::from(&*wizard))
}

pub async fn set_criterion(
    State(state): State<AppState>,
    Json(request): Json<SetCriterionRequest>,
) -> Json<WizardResponse> {
    let mut wizard = state.wizard.write().await;
    wizard
        .preferences
        .set_second_criterion(request.value, request.strategy);
    Json(WizardResponse::from(&*wizard))
}

pub async fn set_strategy(
    State(state): State<AppState>,
    Json(request): Json<SetStrategyRequest>,
) -> Json<WizardResponse> {
    let mut wizard = state.wizard.write().await;
    wizard.preferences.set_strategy(request.strategy);
    Json(WizardResponse::from(&*wizard))
}

/// Advance the wizard; leaving step 2 runs the recommendation
pub async fn next_step(State(state): State<AppState>) -> AppResult<Json<NextStepResponse>> {
    let (transition, wizard, preferences) = {
        let mut wizard = state.wizard.write().await;
        let transition = wizard.advance()?;
        (
            transition,
            WizardResponse::from(&*wizard),
            wizard.preferences.clone(),
        )
    };

    let outcome = match transition {
        Transition::Moved(_) => None,
        Transition::Recommend => Some(run_recommendation(&state, &preferences).await),
    };

    Ok(Json(NextStepResponse { wizard, outcome }))
}

/// Go back one step. Leaving the result drops it.
pub async fn previous_step(State(state): State<AppState>) -> Json<WizardResponse> {
    let response = {
        let mut wizard = state.wizard.write().await;
        wizard.retreat();
        WizardResponse::from(&*wizard)
    };
    state.recommender.clear().await;
    Json(response)
}

/// Reset preferences and return to step 1
pub async fn restart(State(state): State<AppState>) -> Json<WizardResponse> {
    let response = {
        let mut wizard = state.wizard.write().await;
        wizard.reset();
        WizardResponse::from(&*wizard)
    };
    state.recommender.clear().await;
    Json(response)
}

/// Latest recommendation outcome
pub async fn get_recommendation(State(state): State<AppState>) -> Json<Outcome> {
    Json(state.recommender.current().await)
}

/// "Give me another idea"
pub async fn recommend_again(State(state): State<AppState>) -> AppResult<Json<Outcome>> {
    let preferences = current_recommendation_preferences(&state).await?;
    Ok(Json(run_recommendation(&state, &preferences).await))
}

/// Record like/dislike for the recipe on display, then recommend the next one.
/// The history snapshot uses the preferences that produced the recipe, even if
/// the wizard has been edited since.
pub async fn give_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> AppResult<Json<FeedbackResponse>> {
    current_recommendation_preferences(&state).await?;
    let Some((recipe, preferences)) = state.recommender.shown().await else {
        return Err(AppError::InvalidInput(
            "There is no recommendation to give feedback on".to_string(),
        ));
    };

    let history_item = state
        .history
        .append(&recipe, request.liked, &preferences)
        .await?;
    let outcome = run_recommendation(&state, &preferences).await;

    Ok(Json(FeedbackResponse {
        history_item,
        outcome,
    }))
}

/// Past feedback, newest first
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<HistoryItem>> {
    Json(state.history.load_all().await)
}

/// Server-sent events stream with one event per history change
pub async fn history_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.history.subscribe()).filter_map(|result| async move {
        match result {
            Ok(event) => Some(Ok(Event::default().event(event.name()).data(""))),
            Err(e) => {
                tracing::warn!(error = %e, "History event subscriber lagged");
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn current_recommendation_preferences(state: &AppState) -> AppResult<Preferences> {
    let wizard = state.wizard.read().await;
    if wizard.step != WizardStep::Recommendation {
        return Err(AppError::InvalidInput(
            "Finish choosing preferences first".to_string(),
        ));
    }
    Ok(wizard.preferences.clone())
}

/// Runs a recommendation; a superseded call reports whatever superseded it
async fn run_recommendation(state: &AppState, preferences: &Preferences) -> Outcome {
    match state.recommender.recommend(preferences).await {
        Some(outcome) => outcome,
        None => state.recommender.current().await,
    }
}
