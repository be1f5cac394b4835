//! Recipe catalog abstraction
//!
//! The recommendation flow only needs three filter queries and one detail
//! lookup; the reference-data listings back the preference steps. Each
//! catalog implementation answers all of them against the same backend so
//! identifiers from a list query can be fed straight into `get_detail`.
use tracing::instrument;

use crate::{
    error::AppResult,
    models::{Recipe, RecipeId, RecipeSummary, Strategy},
};

pub mod mealdb;

/// Trait for recipe catalogs
///
/// List queries return partial records. A transport or parse failure is an
/// `Err`; zero results is an empty `Ok`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecipeCatalog: Send + Sync {
    /// Recipes tagged with the given area
    async fn list_by_area(&self, area: &str) -> AppResult<Vec<RecipeSummary>>;

    /// Recipes tagged with the given category
    async fn list_by_category(&self, category: &str) -> AppResult<Vec<RecipeSummary>>;

    /// Recipes using the given main ingredient
    async fn list_by_ingredient(&self, ingredient: &str) -> AppResult<Vec<RecipeSummary>>;

    /// Fetch the fully hydrated record
    ///
    /// `Ok(None)` means the identifier is unknown to the catalog, which is
    /// distinct from a transport error.
    async fn get_detail(&self, id: &RecipeId) -> AppResult<Option<Recipe>>;

    /// Names of all areas (cuisines)
    async fn list_areas(&self) -> AppResult<Vec<String>>;

    /// Names of all categories
    async fn list_categories(&self) -> AppResult<Vec<String>>;

    /// Names of all ingredients
    async fn list_ingredients(&self) -> AppResult<Vec<String>>;

    /// Full-text search on recipe names
    async fn search_by_name(&self, term: &str) -> AppResult<Vec<Recipe>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Runs the list query selected by `strategy`
#[instrument(skip(catalog), fields(provider = catalog.name()))]
pub async fn list_by_strategy(
    catalog: &dyn RecipeCatalog,
    strategy: Strategy,
    value: &str,
) -> AppResult<Vec<RecipeSummary>> {
    match strategy {
        Strategy::Category => catalog.list_by_category(value).await,
        Strategy::Ingredient => catalog.list_by_ingredient(value).await,
    }
}
