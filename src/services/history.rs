use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tokio::sync::{broadcast, Mutex};

use crate::{
    error::{AppError, AppResult},
    models::{HistoryItem, Preferences, Recipe},
};

/// Buffered notifications per subscriber before it starts lagging
const EVENT_CAPACITY: usize = 16;

/// Durable key/value storage. Values are read and written wholesale.
#[async_trait::async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn read(&self, key: &str) -> AppResult<Option<String>>;

    async fn write(&self, key: &str, value: &str) -> AppResult<()>;
}

/// One JSON file per key under a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> AppResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AppError::InvalidInput(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait::async_trait]
impl KeyValueStorage for FileStorage {
    async fn read(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write then rename so a crash never leaves a half-written file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// In-process storage for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value, bypassing any encoding
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        storage
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.into(), value.into());
        storage
    }
}

#[async_trait::async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn read(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::Storage("memory storage lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::Storage("memory storage lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Notification sent to subscribers of a [`HistoryStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    /// The persisted history changed; re-read it with `load_all`
    Updated,
}

impl HistoryEvent {
    pub fn name(self) -> &'static str {
        match self {
            HistoryEvent::Updated => "history-updated",
        }
    }
}

/// Append-only log of recommendation feedback, newest first
///
/// The whole sequence lives under one storage key. Subscribers receive one
/// [`HistoryEvent::Updated`] per successful append.
pub struct HistoryStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    events: broadcast::Sender<HistoryEvent>,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            storage,
            key: key.into(),
            events,
            write_lock: Mutex::new(()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.events.subscribe()
    }

    /// Reads the persisted history. Unreadable or corrupt data yields an
    /// empty history and is logged; it never reaches the caller.
    pub async fn load_all(&self) -> Vec<HistoryItem> {
        self.read_items().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, key = %self.key, "Failed to load history");
            Vec::new()
        })
    }

    async fn read_items(&self) -> AppResult<Vec<HistoryItem>> {
        let Some(raw) = self.storage.read(&self.key).await? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw)
            .map_err(|e| AppError::Storage(format!("Stored history is not readable: {}", e)))
    }

    /// Records feedback on a hydrated recipe and notifies subscribers
    pub async fn append(
        &self,
        recipe: &Recipe,
        liked: bool,
        preferences: &Preferences,
    ) -> AppResult<HistoryItem> {
        let _guard = self.write_lock.lock().await;

        // A value that cannot be read is left untouched rather than replaced
        let mut items = self.read_items().await.map_err(|e| {
            tracing::error!(error = %e, key = %self.key, "Refusing to append to unreadable history");
            e
        })?;
        let item = HistoryItem::new(recipe, liked, preferences);
        items.insert(0, item.clone());

        let json = serde_json::to_string(&items)?;
        self.storage.write(&self.key, &json).await.map_err(|e| {
            tracing::error!(error = %e, key = %self.key, "Failed to save history");
            e
        })?;

        // No subscribers is not an error
        let _ = self.events.send(HistoryEvent::Updated);

        tracing::info!(
            recipe_id = %item.recipe_id,
            liked,
            entries = items.len(),
            "History entry appended"
        );

        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecipeId, Strategy};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::broadcast::error::TryRecvError;

    const KEY: &str = "recipeHistory";

    fn recipe(id: &str) -> Recipe {
        Recipe {
            id: RecipeId::new(id),
            title: format!("Recipe {}", id),
            thumbnail: format!("http://img/{}.jpg", id),
            area: "Italian".to_string(),
            category: "Seafood".to_string(),
            instructions: "Cook it.".to_string(),
            video: None,
            source: None,
            tags: vec![],
            ingredients: vec![],
        }
    }

    fn prefs(area: &str, criterion: &str) -> Preferences {
        let mut prefs = Preferences::new();
        prefs.set_area(area);
        prefs.set_second_criterion(criterion, Strategy::Category);
        prefs
    }

    fn memory_store() -> HistoryStore {
        HistoryStore::new(Arc::new(MemoryStorage::new()), KEY)
    }

    struct FailingStorage;

    #[async_trait::async_trait]
    impl KeyValueStorage for FailingStorage {
        async fn read(&self, _key: &str) -> AppResult<Option<String>> {
            Ok(None)
        }

        async fn write(&self, _key: &str, _value: &str) -> AppResult<()> {
            Err(AppError::Storage("quota exceeded".to_string()))
        }
    }

    /// Memory storage whose next read can be made to fail once
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_next_read: AtomicBool,
    }

    #[async_trait::async_trait]
    impl KeyValueStorage for FlakyStorage {
        async fn read(&self, key: &str) -> AppResult<Option<String>> {
            if self.fail_next_read.swap(false, Ordering::SeqCst) {
                return Err(AppError::Storage("EIO".to_string()));
            }
            self.inner.read(key).await
        }

        async fn write(&self, key: &str, value: &str) -> AppResult<()> {
            self.inner.write(key, value).await
        }
    }

    #[tokio::test]
    async fn test_empty_store_loads_nothing() {
        assert!(memory_store().load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_append_then_load_puts_item_first() {
        let store = memory_store();
        store.append(&recipe("1"), true, &prefs("Italian", "Seafood")).await.unwrap();
        let before = store.load_all().await.len();

        let item = store
            .append(&recipe("2"), false, &prefs("Mexican", "Beef"))
            .await
            .unwrap();
        let items = store.load_all().await;

        assert_eq!(items.len(), before + 1);
        assert_eq!(items[0], item);
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let store = memory_store();
        let first = store
            .append(&recipe("1"), true, &prefs("Italian", "Seafood"))
            .await
            .unwrap();
        let second = store
            .append(&recipe("2"), false, &prefs("Mexican", "Beef"))
            .await
            .unwrap();

        assert_eq!(store.load_all().await, vec![second, first]);
    }

    #[tokio::test]
    async fn test_corrupt_history_loads_as_empty() {
        let storage = MemoryStorage::with_entry(KEY, "invalid-json");
        let store = HistoryStore::new(Arc::new(storage), KEY);
        assert!(store.load_all().await.is_empty());
    }

    #[tokio::test]
    async fn test_append_over_corrupt_history_keeps_stored_value() {
        let storage = Arc::new(MemoryStorage::with_entry(KEY, "invalid-json"));
        let store = HistoryStore::new(storage.clone(), KEY);
        let mut events = store.subscribe();

        let result = store.append(&recipe("1"), true, &prefs("Italian", "Seafood")).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(storage.read(KEY).await.unwrap().as_deref(), Some("invalid-json"));
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_transient_read_error_does_not_erase_history() {
        let storage = Arc::new(FlakyStorage {
            inner: MemoryStorage::new(),
            fail_next_read: AtomicBool::new(false),
        });
        let store = HistoryStore::new(storage.clone(), KEY);
        for id in ["1", "2", "3"] {
            store.append(&recipe(id), true, &prefs("Italian", "Seafood")).await.unwrap();
        }

        storage.fail_next_read.store(true, Ordering::SeqCst);
        let result = store.append(&recipe("4"), false, &prefs("Italian", "Seafood")).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(store.load_all().await.len(), 3);

        store.append(&recipe("4"), false, &prefs("Italian", "Seafood")).await.unwrap();
        let items = store.load_all().await;
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].recipe_id, RecipeId::new("4"));
    }

    #[tokio::test]
    async fn test_append_notifies_exactly_once() {
        let store = memory_store();
        let mut events = store.subscribe();

        store.append(&recipe("1"), true, &prefs("Italian", "Seafood")).await.unwrap();

        assert_eq!(events.try_recv(), Ok(HistoryEvent::Updated));
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_reads_do_not_notify() {
        let store = memory_store();
        let mut events = store.subscribe();

        store.load_all().await;

        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_failed_write_does_not_notify() {
        let store = HistoryStore::new(Arc::new(FailingStorage), KEY);
        let mut events = store.subscribe();

        let result = store.append(&recipe("1"), true, &prefs("Italian", "Seafood")).await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        assert_eq!(events.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let item = {
            let store = HistoryStore::new(Arc::new(FileStorage::new(dir.path())), KEY);
            store
                .append(&recipe("1"), true, &prefs("Italian", "Seafood"))
                .await
                .unwrap()
        };

        let reopened = HistoryStore::new(Arc::new(FileStorage::new(dir.path())), KEY);
        assert_eq!(reopened.load_all().await, vec![item]);
        assert!(dir.path().join("recipeHistory.json").exists());
    }

    #[tokio::test]
    async fn test_file_storage_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("not-yet-created"));
        tokio_test::assert_ok!(storage.read(KEY).await);
        assert_eq!(storage.read(KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_storage_corrupt_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("recipeHistory.json"), "invalid-json").unwrap();

        let store = HistoryStore::new(Arc::new(FileStorage::new(dir.path())), KEY);
        assert!(store.load_all().await.is_empty());
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let storage = FileStorage::new("/tmp");
        assert!(storage.path_for("../etc/passwd").is_err());
        assert!(storage.path_for("").is_err());
        assert!(storage.path_for("recipe_history-v2").is_ok());
    }
}
