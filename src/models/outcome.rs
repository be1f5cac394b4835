use serde::Serialize;

use super::Recipe;

/// State of the most recent recommendation attempt
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing requested yet, or the wizard was restarted
    #[default]
    Idle,
    Loading,
    Found { recipe: Box<Recipe> },
    /// The two criteria share no recipe
    NoMatch,
    /// Transport failure or a candidate that could not be hydrated
    Failed { reason: String },
}

impl Outcome {
    pub fn found(recipe: Recipe) -> Self {
        Outcome::Found {
            recipe: Box::new(recipe),
        }
    }

    pub fn recipe(&self) -> Option<&Recipe> {
        match self {
            Outcome::Found { recipe } => Some(&**recipe),
            _ => None,
        }
    }
}
