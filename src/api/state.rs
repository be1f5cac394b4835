use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::WizardState;
use crate::services::{HistoryStore, RecipeCatalog, Recommender};

/// Shared application state
///
/// Built once in `main` (or a test) and handed to the router; nothing here
/// is a global.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn RecipeCatalog>,
    pub recommender: Arc<Recommender>,
    pub history: Arc<HistoryStore>,
    pub wizard: Arc<RwLock<WizardState>>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn RecipeCatalog>, history: HistoryStore) -> Self {
        Self {
            recommender: Arc::new(Recommender::new(catalog.clone())),
            catalog,
            history: Arc::new(history),
            wizard: Arc::new(RwLock::new(WizardState::new())),
        }
    }
}
