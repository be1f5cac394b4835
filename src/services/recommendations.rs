use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{Outcome, Preferences, Recipe},
    services::{
        matcher,
        providers::{self, RecipeCatalog},
    },
};

/// Latest outcome together with the generation and preferences that produced it
struct Committed {
    generation: u64,
    outcome: Outcome,
    preferences: Option<Preferences>,
}

/// Generates recipe recommendations
///
/// Queries the catalog for recipes matching the area and for recipes matching
/// the second criterion, keeps the ones present in both, picks one at random
/// and hydrates it with a detail lookup.
///
/// Every call to [`Recommender::recommend`] takes a new generation number.
/// An outcome is only committed while its generation is still the newest, so
/// a slow response can never overwrite the answer to a later request.
pub struct Recommender {
    catalog: Arc<dyn RecipeCatalog>,
    generation: AtomicU64,
    latest: RwLock<Committed>,
}

impl Recommender {
    pub fn new(catalog: Arc<dyn RecipeCatalog>) -> Self {
        Self {
            catalog,
            generation: AtomicU64::new(0),
            latest: RwLock::new(Committed {
                generation: 0,
                outcome: Outcome::Idle,
                preferences: None,
            }),
        }
    }

    /// The most recently committed outcome
    pub async fn current(&self) -> Outcome {
        self.latest.read().await.outcome.clone()
    }

    /// The recipe on display and the preferences it was recommended for
    pub async fn shown(&self) -> Option<(Recipe, Preferences)> {
        let latest = self.latest.read().await;
        let recipe = latest.outcome.recipe()?.clone();
        let preferences = latest.preferences.clone()?;
        Some((recipe, preferences))
    }

    /// Runs a full recommendation.
    ///
    /// Returns `None` when a newer request was issued while this one was in
    /// flight; its result has been discarded and [`Recommender::current`]
    /// belongs to the newer request.
    pub async fn recommend(&self, preferences: &Preferences) -> Option<Outcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.commit(generation, Outcome::Loading, Some(preferences))
            .await;

        let outcome = match self.run(preferences).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    area = %preferences.area,
                    criterion = %preferences.category_or_ingredient,
                    "Recommendation failed"
                );
                Outcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        if self
            .commit(generation, outcome.clone(), Some(preferences))
            .await
        {
            Some(outcome)
        } else {
            tracing::debug!(generation, "Discarding superseded recommendation");
            None
        }
    }

    /// Forgets the current outcome and invalidates any request in flight
    pub async fn clear(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.commit(generation, Outcome::Idle, None).await;
    }

    async fn commit(
        &self,
        generation: u64,
        outcome: Outcome,
        preferences: Option<&Preferences>,
    ) -> bool {
        let mut latest = self.latest.write().await;
        if generation != self.generation.load(Ordering::SeqCst) || generation < latest.generation
        {
            return false;
        }
        latest.generation = generation;
        latest.outcome = outcome;
        latest.preferences = preferences.cloned();
        true
    }

    async fn run(&self, preferences: &Preferences) -> AppResult<Outcome> {
        if !preferences.is_complete() {
            return Err(AppError::InvalidInput(
                "Both an area and a category or ingredient are required".to_string(),
            ));
        }

        // The two list queries are independent; the detail lookup waits for the pick
        let (area_candidates, criterion_candidates) = tokio::try_join!(
            self.catalog.list_by_area(&preferences.area),
            providers::list_by_strategy(
                self.catalog.as_ref(),
                preferences.strategy,
                &preferences.category_or_ingredient,
            ),
        )?;

        let matches = matcher::intersect_by_id(&area_candidates, &criterion_candidates);

        tracing::info!(
            area = %preferences.area,
            criterion = %preferences.category_or_ingredient,
            strategy = ?preferences.strategy,
            area_candidates = area_candidates.len(),
            criterion_candidates = criterion_candidates.len(),
            matches = matches.len(),
            "Candidates intersected"
        );

        let picked = {
            let mut rng = rand::thread_rng();
            matcher::pick_random(&matches, &mut rng).cloned()
        };
        let Some(chosen) = picked else {
            return Ok(Outcome::NoMatch);
        };

        match self.catalog.get_detail(&chosen.id).await? {
            Some(recipe) => {
                tracing::info!(recipe_id = %recipe.id, title = %recipe.title, "Recommendation found");
                Ok(Outcome::found(recipe))
            }
            None => Err(AppError::NotFound(format!(
                "Recipe {} disappeared from the catalog",
                chosen.id
            ))),
        }
    }
}
