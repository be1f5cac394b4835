pub mod history;
pub mod matcher;
pub mod providers;
pub mod recommendations;
pub mod suggestions;

pub use history::{FileStorage, HistoryEvent, HistoryStore, KeyValueStorage, MemoryStorage};
pub use providers::RecipeCatalog;
pub use recommendations::Recommender;
