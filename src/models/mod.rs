use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display};

pub mod history;
pub mod outcome;
pub mod preferences;

pub use history::{HistoryItem, PreferenceSnapshot};
pub use outcome::Outcome;
pub use preferences::{Preferences, Strategy, Transition, WizardState, WizardStep};

/// Highest numbered ingredient/measure pair the catalog emits on a detail record
const MAX_INGREDIENT_SLOTS: usize = 20;

/// Opaque catalog identifier of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub String);

impl RecipeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Partial projection returned by the list queries.
///
/// Carries only what the catalog's filter endpoints return. Detail fields
/// live on [`Recipe`], which can only be obtained by a detail lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub title: String,
    pub thumbnail: String,
}

/// Fully hydrated recipe returned by a detail lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub thumbnail: String,
    pub area: String,
    pub category: String,
    pub instructions: String,
    pub video: Option<String>,
    pub source: Option<String>,
    pub tags: Vec<String>,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub measure: String,
}

// ============================================================================
// TheMealDB API Types
// ============================================================================

/// Envelope every catalog endpoint wraps its results in.
///
/// The catalog answers `{"meals": null}` when nothing matches.
#[derive(Debug, Deserialize)]
pub struct MealsEnvelope<T> {
    pub meals: Option<Vec<T>>,
}

impl<T> MealsEnvelope<T> {
    pub fn into_items(self) -> Vec<T> {
        self.meals.unwrap_or_default()
    }
}

/// Raw list-query entry from `filter.php`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMealSummary {
    pub id_meal: String,
    pub str_meal: String,
    #[serde(default)]
    pub str_meal_thumb: Option<String>,
}

impl From<ApiMealSummary> for RecipeSummary {
    fn from(meal: ApiMealSummary) -> Self {
        RecipeSummary {
            id: RecipeId(meal.id_meal),
            title: meal.str_meal,
            thumbnail: meal.str_meal_thumb.unwrap_or_default(),
        }
    }
}

/// Raw detail record from `lookup.php` and `search.php`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMeal {
    pub id_meal: String,
    pub str_meal: String,
    #[serde(default)]
    pub str_meal_thumb: Option<String>,
    #[serde(default)]
    pub str_category: Option<String>,
    #[serde(default)]
    pub str_area: Option<String>,
    #[serde(default)]
    pub str_instructions: Option<String>,
    #[serde(default)]
    pub str_youtube: Option<String>,
    #[serde(default)]
    pub str_source: Option<String>,
    #[serde(default)]
    pub str_tags: Option<String>,
    /// Numbered `strIngredientN` / `strMeasureN` keys and anything else the catalog adds
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ApiMeal {
    fn slot(&self, prefix: &str, index: usize) -> Option<&str> {
        self.extra
            .get(&format!("{}{}", prefix, index))
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn ingredients(&self) -> Vec<Ingredient> {
        (1..=MAX_INGREDIENT_SLOTS)
            .filter_map(|index| {
                let name = self.slot("strIngredient", index)?;
                Some(Ingredient {
                    name: name.to_string(),
                    measure: self.slot("strMeasure", index).unwrap_or_default().to_string(),
                })
            })
            .collect()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<ApiMeal> for Recipe {
    fn from(meal: ApiMeal) -> Self {
        let ingredients = meal.ingredients();
        let tags = meal
            .str_tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Recipe {
            id: RecipeId(meal.id_meal),
            title: meal.str_meal,
            thumbnail: meal.str_meal_thumb.unwrap_or_default(),
            area: meal.str_area.unwrap_or_default(),
            category: meal.str_category.unwrap_or_default(),
            instructions: meal.str_instructions.unwrap_or_default(),
            video: non_blank(meal.str_youtube),
            source: non_blank(meal.str_source),
            tags,
            ingredients,
        }
    }
}

/// Entry of `list.php?a=list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArea {
    pub str_area: String,
}

/// Entry of `list.php?c=list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCategory {
    pub str_category: String,
}

/// Entry of `list.php?i=list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiIngredient {
    pub str_ingredient: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOKUP_JSON: &str = r#"{
        "meals": [{
            "idMeal": "52771",
            "strMeal": "Spicy Arrabiata Penne",
            "strDrinkAlternate": null,
            "strCategory": "Vegetarian",
            "strArea": "Italian",
            "strInstructions": "Bring a large pot of water to a boil.",
            "strMealThumb": "https://www.themealdb.com/images/media/meals/ustsqw1468250014.jpg",
            "strTags": "Pasta, Curry",
            "strYoutube": "https://www.youtube.com/watch?v=1IszT_guI08",
            "strIngredient1": "penne rigate",
            "strIngredient2": "olive oil",
            "strIngredient3": "",
            "strIngredient4": null,
            "strIngredient5": "basil",
            "strMeasure1": "1 pound",
            "strMeasure2": "1/4 cup",
            "strMeasure3": "",
            "strMeasure4": null,
            "strMeasure5": " ",
            "strSource": "",
            "dateModified": null
        }]
    }"#;

    #[test]
    fn test_recipe_id_display() {
        let id = RecipeId::new("52771");
        assert_eq!(format!("{}", id), "52771");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""52771""#);
    }

    #[test]
    fn test_lookup_response_to_recipe() {
        let envelope: MealsEnvelope<ApiMeal> = serde_json::from_str(LOOKUP_JSON).unwrap();
        let meals = envelope.into_items();
        assert_eq!(meals.len(), 1);

        let recipe: Recipe = meals.into_iter().next().unwrap().into();
        assert_eq!(recipe.id, RecipeId::new("52771"));
        assert_eq!(recipe.title, "Spicy Arrabiata Penne");
        assert_eq!(recipe.area, "Italian");
        assert_eq!(recipe.category, "Vegetarian");
        assert_eq!(recipe.tags, vec!["Pasta".to_string(), "Curry".to_string()]);
        assert_eq!(
            recipe.video.as_deref(),
            Some("https://www.youtube.com/watch?v=1IszT_guI08")
        );
        assert_eq!(recipe.source, None);
    }

    #[test]
    fn test_ingredients_keep_order_and_skip_blank_slots() {
        let envelope: MealsEnvelope<ApiMeal> = serde_json::from_str(LOOKUP_JSON).unwrap();
        let recipe: Recipe = envelope.into_items().remove(0).into();

        assert_eq!(
            recipe.ingredients,
            vec![
                Ingredient {
                    name: "penne rigate".to_string(),
                    measure: "1 pound".to_string()
                },
                Ingredient {
                    name: "olive oil".to_string(),
                    measure: "1/4 cup".to_string()
                },
                Ingredient {
                    name: "basil".to_string(),
                    measure: String::new()
                },
            ]
        );
    }

    #[test]
    fn test_null_meals_is_empty() {
        let envelope: MealsEnvelope<ApiMealSummary> =
            serde_json::from_str(r#"{"meals": null}"#).unwrap();
        assert!(envelope.into_items().is_empty());

        let envelope: MealsEnvelope<ApiMealSummary> = serde_json::from_str("{}").unwrap();
        assert!(envelope.into_items().is_empty());
    }

    #[test]
    fn test_filter_entry_to_summary() {
        let json = r#"{
            "strMeal": "Baked salmon with fennel & tomatoes",
            "strMealThumb": "https://www.themealdb.com/images/media/meals/1548772327.jpg",
            "idMeal": "52959"
        }"#;

        let summary: RecipeSummary = serde_json::from_str::<ApiMealSummary>(json).unwrap().into();
        assert_eq!(summary.id, RecipeId::new("52959"));
        assert_eq!(summary.title, "Baked salmon with fennel & tomatoes");
        assert!(summary.thumbnail.ends_with("1548772327.jpg"));
    }
}
