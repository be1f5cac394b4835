//! TheMealDB catalog provider
//!
//! API Flow:
//! 1. Filters: /filter.php?a= | ?c= | ?i= → partial records (id, name, thumbnail)
//! 2. Detail: /lookup.php?i={id} → full record with numbered ingredient keys
//! 3. Reference data: /list.php?a=list | ?c=list | ?i=list
//!
//! Every endpoint answers `{"meals": [...]}` or `{"meals": null}`.
use crate::{
    error::{AppError, AppResult},
    models::{
        ApiArea, ApiCategory, ApiIngredient, ApiMeal, ApiMealSummary, MealsEnvelope, Recipe,
        RecipeId, RecipeSummary,
    },
    services::providers::RecipeCatalog,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Clone)]
pub struct MealDbProvider {
    http_client: HttpClient,
    api_url: String,
}

impl MealDbProvider {
    /// Creates a provider using transport-level default timeouts
    pub fn new(api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
        }
    }

    /// Creates a provider whose requests give up after `timeout`
    pub fn with_timeout(api_url: String, timeout: Option<Duration>) -> AppResult<Self> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http_client: builder.build()?,
            api_url,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path)
    }

    /// GETs an endpoint and unwraps the `meals` envelope
    async fn fetch_meals<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> AppResult<Vec<T>> {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, ?params, "Querying recipe catalog");

        let response = self.http_client.get(&url).query(params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TheMealDB API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        parse_meals(&response_text)
    }

    async fn filter(&self, field: &str, value: &str) -> AppResult<Vec<RecipeSummary>> {
        let value = require_query(value)?;
        let meals: Vec<ApiMealSummary> = self.fetch_meals("filter.php", &[(field, value)]).await?;
        let recipes: Vec<RecipeSummary> = meals.into_iter().map(RecipeSummary::from).collect();

        tracing::info!(
            filter = field,
            value = %value,
            results = recipes.len(),
            provider = "mealdb",
            "Catalog filter completed"
        );

        Ok(recipes)
    }

    async fn reference_list<T: DeserializeOwned>(
        &self,
        field: &str,
        name: impl Fn(T) -> String,
    ) -> AppResult<Vec<String>> {
        let entries: Vec<T> = self.fetch_meals("list.php", &[(field, "list")]).await?;
        Ok(entries.into_iter().map(name).collect())
    }
}

/// Decodes a catalog body. A body that is not the expected envelope is an
/// upstream failure, never "zero results".
fn parse_meals<T: DeserializeOwned>(body: &str) -> AppResult<Vec<T>> {
    serde_json::from_str::<MealsEnvelope<T>>(body)
        .map(MealsEnvelope::into_items)
        .map_err(|e| {
            tracing::error!(
                error = %e,
                response = %body,
                "Failed to deserialize TheMealDB response"
            );
            AppError::ExternalApi(format!("Failed to parse TheMealDB response: {}", e))
        })
}

fn require_query(value: &str) -> AppResult<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(
            "Catalog query cannot be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

#[async_trait::async_trait]
impl RecipeCatalog for MealDbProvider {
    async fn list_by_area(&self, area: &str) -> AppResult<Vec<RecipeSummary>> {
        self.filter("a", area).await
    }

    async fn list_by_category(&self, category: &str) -> AppResult<Vec<RecipeSummary>> {
        self.filter("c", category).await
    }

    async fn list_by_ingredient(&self, ingredient: &str) -> AppResult<Vec<RecipeSummary>> {
        self.filter("i", ingredient).await
    }

    async fn get_detail(&self, id: &RecipeId) -> AppResult<Option<Recipe>> {
        let id = require_query(id.as_str())?;
        let meals: Vec<ApiMeal> = self.fetch_meals("lookup.php", &[("i", id)]).await?;
        let recipe = meals.into_iter().next().map(Recipe::from);

        tracing::info!(
            recipe_id = %id,
            found = recipe.is_some(),
            provider = "mealdb",
            "Recipe lookup completed"
        );

        Ok(recipe)
    }

    async fn list_areas(&self) -> AppResult<Vec<String>> {
        self.reference_list("a", |area: ApiArea| area.str_area).await
    }

    async fn list_categories(&self) -> AppResult<Vec<String>> {
        self.reference_list("c", |category: ApiCategory| category.str_category)
            .await
    }

    async fn list_ingredients(&self) -> AppResult<Vec<String>> {
        self.reference_list("i", |ingredient: ApiIngredient| ingredient.str_ingredient)
            .await
    }

    async fn search_by_name(&self, term: &str) -> AppResult<Vec<Recipe>> {
        let term = require_query(term)?;
        let meals: Vec<ApiMeal> = self.fetch_meals("search.php", &[("s", term)]).await?;
        let recipes: Vec<Recipe> = meals.into_iter().map(Recipe::from).collect();

        tracing::info!(
            query = %term,
            results = recipes.len(),
            provider = "mealdb",
            "Recipe search completed"
        );

        Ok(recipes)
    }

    fn name(&self) -> &'static str {
        "mealdb"
    }
}
