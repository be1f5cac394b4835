use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Which list query the second criterion is matched against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Category,
    Ingredient,
}

/// The user's two-step selection. Empty strings mean "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub area: String,
    pub category_or_ingredient: String,
    pub strategy: Strategy,
}

impl Preferences {
    /// Creates empty preferences
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_area(&mut self, area: impl Into<String>) {
        self.area = area.into();
    }

    pub fn set_second_criterion(&mut self, value: impl Into<String>, strategy: Strategy) {
        self.category_or_ingredient = value.into();
        self.strategy = strategy;
    }

    /// Switches strategy. A criterion chosen under the other strategy is dropped.
    pub fn set_strategy(&mut self, strategy: Strategy) {
        if self.strategy != strategy {
            self.strategy = strategy;
            self.category_or_ingredient.clear();
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn has_area(&self) -> bool {
        !self.area.trim().is_empty()
    }

    pub fn has_second_criterion(&self) -> bool {
        !self.category_or_ingredient.trim().is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.has_area() && self.has_second_criterion()
    }
}

/// Position in the three-step wizard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    ChooseArea,
    ChooseCriterion,
    Recommendation,
}

impl WizardStep {
    pub fn number(self) -> u8 {
        match self {
            WizardStep::ChooseArea => 1,
            WizardStep::ChooseCriterion => 2,
            WizardStep::Recommendation => 3,
        }
    }
}

/// Result of advancing the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved(WizardStep),
    /// Left step 2: the caller must run a recommendation
    Recommend,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WizardState {
    pub step: WizardStep,
    pub preferences: Preferences,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self) -> AppResult<Transition> {
        match self.step {
            WizardStep::ChooseArea => {
                if !self.preferences.has_area() {
                    return Err(AppError::InvalidInput("Choose an area first".to_string()));
                }
                self.step = WizardStep::ChooseCriterion;
                Ok(Transition::Moved(self.step))
            }
            WizardStep::ChooseCriterion => {
                if !self.preferences.has_second_criterion() {
                    return Err(AppError::InvalidInput(
                        "Choose a category or ingredient first".to_string(),
                    ));
                }
                self.step = WizardStep::Recommendation;
                Ok(Transition::Recommend)
            }
            WizardStep::Recommendation => Err(AppError::InvalidInput(
                "Already showing a recommendation".to_string(),
            )),
        }
    }

    pub fn retreat(&mut self) -> WizardStep {
        self.step = match self.step {
            WizardStep::ChooseArea | WizardStep::ChooseCriterion => WizardStep::ChooseArea,
            WizardStep::Recommendation => WizardStep::ChooseCriterion,
        };
        self.step
    }

    pub fn reset(&mut self) {
        self.step = WizardStep::ChooseArea;
        self.preferences.reset();
    }
}
