use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Preferences, Recipe, RecipeId};

/// The preferences that produced a recommendation. Strategy is not retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSnapshot {
    pub area: String,
    pub category_or_ingredient: String,
}

impl From<&Preferences> for PreferenceSnapshot {
    fn from(prefs: &Preferences) -> Self {
        Self {
            area: prefs.area.clone(),
            category_or_ingredient: prefs.category_or_ingredient.clone(),
        }
    }
}

/// One piece of recommendation feedback, as persisted in the history log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: Uuid,
    pub recipe_id: RecipeId,
    pub title: String,
    pub image: String,
    /// Persisted as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub liked: bool,
    pub preferences: PreferenceSnapshot,
}

impl HistoryItem {
    /// Snapshots a hydrated recipe and the preferences that led to it
    pub fn new(recipe: &Recipe, liked: bool, preferences: &Preferences) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipe_id: recipe.id.clone(),
            title: recipe.title.clone(),
            image: recipe.thumbnail.clone(),
            // Millisecond precision so the item compares equal after a storage round trip
            timestamp: Utc::now().trunc_subsecs(3),
            liked,
            preferences: PreferenceSnapshot::from(preferences),
        }
    }
}
