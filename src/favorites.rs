//! The favorites store: the only piece of state that outlives a session.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::Movie;
use crate::storage::{KeyValueStorage, StorageError};

pub const FAVORITES_KEY: &str = "favorites";
/// Where data that failed to load is kept before the first write replaces it.
pub const UNREADABLE_FAVORITES_KEY: &str = "favorites-unreadable";

/// Insertion-ordered set of movies keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesCollection {
    movies: Vec<Movie>,
}

impl FavoritesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from stored records, keeping the first entry for
    /// each id.
    pub fn from_movies(movies: Vec<Movie>) -> Self {
        let mut collection = Self::new();
        for movie in movies {
            collection.add(movie);
        }
        collection
    }

    /// Returns false when a movie with the same id is already present.
    pub fn add(&mut self, movie: Movie) -> bool {
        if self.contains(movie.id) {
            return false;
        }
        self.movies.push(movie);
        true
    }

    pub fn remove(&mut self, movie_id: i64) -> bool {
        let before = self.movies.len();
        self.movies.retain(|m| m.id != movie_id);
        self.movies.len() != before
    }

    pub fn contains(&self, movie_id: i64) -> bool {
        self.movies.iter().any(|m| m.id == movie_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Movie> {
        self.movies.iter()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Movie> {
        self.movies.clone()
    }
}

pub fn load_favorites(storage: &dyn KeyValueStorage) -> Result<FavoritesCollection, StorageError> {
    let Some(raw) = storage.get(FAVORITES_KEY)? else {
        return Ok(FavoritesCollection::new());
    };
    let movies: Vec<Movie> =
        serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
            key: FAVORITES_KEY.to_string(),
            source,
        })?;
    Ok(FavoritesCollection::from_movies(movies))
}

pub fn save_favorites(
    storage: &dyn KeyValueStorage,
    favorites: &FavoritesCollection,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(&favorites.movies).map_err(|source| {
        StorageError::Malformed {
            key: FAVORITES_KEY.to_string(),
            source,
        }
    })?;
    storage.set(FAVORITES_KEY, &raw)
}

/// Copies the raw favorites document to [`UNREADABLE_FAVORITES_KEY`].
pub fn preserve_unreadable_favorites(storage: &dyn KeyValueStorage) -> Result<(), StorageError> {
    match storage.get(FAVORITES_KEY)? {
        Some(raw) => storage.set(UNREADABLE_FAVORITES_KEY, &raw),
        None => Ok(()),
    }
}

struct Inner {
    collection: FavoritesCollection,
    degraded: bool,
    // False while stored data could not be loaded nor set aside.
    writable: bool,
}

/// Shared favorites, persisted on every mutation. Views hold an
/// `Arc<FavoritesStore>` and watch [`FavoritesStore::subscribe`] for changes.
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStorage>,
    inner: Mutex<Inner>,
    notify: watch::Sender<Vec<Movie>>,
}

impl FavoritesStore {
    /// Loads the persisted collection once. Unreadable or malformed data
    /// starts an empty, degraded store instead of failing. The old data is
    /// copied aside first; if that is impossible the store never writes, so
    /// nothing on disk is overwritten.
    pub fn initialize(storage: Arc<dyn KeyValueStorage>) -> Self {
        let (collection, degraded, writable) = match load_favorites(storage.as_ref()) {
            Ok(collection) => {
                info!("Loaded {} favorite(s)", collection.len());
                (collection, false, true)
            }
            Err(e) => {
                warn!("Could not load favorites, starting empty: {}", e);
                let writable = match preserve_unreadable_favorites(storage.as_ref()) {
                    Ok(()) => {
                        warn!("Previous favorites kept under '{}'", UNREADABLE_FAVORITES_KEY);
                        true
                    }
                    Err(e) => {
                        warn!("Could not set previous favorites aside, not saving: {}", e);
                        false
                    }
                };
                (FavoritesCollection::new(), true, writable)
            }
        };
        let (notify, _) = watch::channel(collection.to_vec());
        Self {
            storage,
            inner: Mutex::new(Inner {
                collection,
                degraded,
                writable,
            }),
            notify,
        }
    }

    /// Adds `movie` unless its id is already a favorite. Returns whether the
    /// collection changed. A failed write keeps the in-memory change.
    pub fn add(&self, movie: Movie) -> Result<bool, StorageError> {
        let title = movie.title.clone();
        let id = movie.id;
        let mut inner = self.lock();
        if !inner.collection.add(movie) {
            return Ok(false);
        }
        info!("Added favorite '{}' ({})", title, id);
        self.commit(&mut inner).map(|_| true)
    }

    pub fn remove(&self, movie_id: i64) -> Result<bool, StorageError> {
        let mut inner = self.lock();
        if !inner.collection.remove(movie_id) {
            return Ok(false);
        }
        info!("Removed favorite {}", movie_id);
        self.commit(&mut inner).map(|_| true)
    }

    pub fn contains(&self, movie_id: i64) -> bool {
        self.lock().collection.contains(movie_id)
    }

    pub fn snapshot(&self) -> Vec<Movie> {
        self.lock().collection.to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().collection.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        self.lock().degraded
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Movie>> {
        self.notify.subscribe()
    }

    fn commit(&self, inner: &mut Inner) -> Result<(), StorageError> {
        if !inner.writable {
            debug!("Favorites kept in memory only");
            self.notify.send_replace(inner.collection.to_vec());
            return Ok(());
        }
        let result = save_favorites(self.storage.as_ref(), &inner.collection);
        match &result {
            Ok(()) => inner.degraded = false,
            Err(e) => {
                warn!("Could not persist favorites: {}", e);
                inner.degraded = true;
            }
        }
        self.notify.send_replace(inner.collection.to_vec());
        result
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn movie(id: i64, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            overview: String::new(),
            release_date: None,
            poster_path: None,
            vote_average: 0.0,
            genres: Vec::new(),
            tagline: None,
        }
    }

    struct FailingStorage;

    impl KeyValueStorage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "quota exceeded"),
            })
        }
    }

    /// Fails every read and records every write.
    #[derive(Default)]
    struct UnreadableStorage {
        writes: Mutex<Vec<String>>,
    }

    impl KeyValueStorage for UnreadableStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io {
                key: key.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            self.writes.lock().unwrap().push(key.to_string());
            Ok(())
        }
    }

    #[test]
    fn add_then_remove_toggles_membership() {
        let store = FavoritesStore::initialize(Arc::new(MemoryStorage::new()));
        assert!(store.add(movie(27205, "Inception")).unwrap());
        assert!(store.contains(27205));
        assert!(store.remove(27205).unwrap());
        assert!(!store.contains(27205));
        assert!(!store.remove(27205).unwrap());
    }

    #[test]
    fn adding_the_same_id_twice_keeps_one_entry() {
        let store = FavoritesStore::initialize(Arc::new(MemoryStorage::new()));
        assert!(store.add(movie(1, "Um")).unwrap());
        assert!(!store.add(movie(1, "Um de novo")).unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot()[0].title, "Um");
    }

    #[test]
    fn reload_restores_the_same_collection() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let store = FavoritesStore::initialize(storage.clone());
        store.add(movie(3, "Três")).unwrap();
        store.add(movie(1, "Um")).unwrap();
        store.add(movie(2, "Dois")).unwrap();
        store.remove(1).unwrap();

        let reloaded = FavoritesStore::initialize(storage);
        let ids: Vec<i64> = reloaded.snapshot().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert!(!reloaded.is_degraded());
    }

    #[test]
    fn malformed_data_starts_empty_and_degraded() {
        let storage = Arc::new(MemoryStorage::with_entry(FAVORITES_KEY, "{not json"));
        let store = FavoritesStore::initialize(storage.clone());
        assert!(store.is_empty());
        assert!(store.is_degraded());

        store.add(movie(5, "Cinco")).unwrap();
        assert!(!store.is_degraded());
        assert_eq!(
            storage.get(UNREADABLE_FAVORITES_KEY).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn unreadable_storage_is_never_overwritten() {
        let storage = Arc::new(UnreadableStorage::default());
        let store = FavoritesStore::initialize(storage.clone());
        assert!(store.is_degraded());

        let mut rx = store.subscribe();
        assert!(store.add(movie(6, "Seis")).unwrap());
        assert!(store.contains(6));
        assert!(store.is_degraded());
        assert!(rx.has_changed().unwrap());
        assert!(storage.writes.lock().unwrap().is_empty());
    }

    #[test]
    fn duplicates_in_stored_data_collapse_on_load() {
        let raw = r#"[{"id":7,"title":"A"},{"id":7,"title":"B"},{"id":8,"title":"C"}]"#;
        let storage = MemoryStorage::with_entry(FAVORITES_KEY, raw);
        let collection = load_favorites(&storage).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.iter().next().map(|m| m.title.as_str()), Some("A"));
    }

    #[test]
    fn failed_write_keeps_memory_and_marks_degraded() {
        let store = FavoritesStore::initialize(Arc::new(FailingStorage));
        let err = store.add(movie(9, "Nove")).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert!(store.contains(9));
        assert!(store.is_degraded());
    }

    #[test]
    fn subscribers_see_every_change() {
        let store = FavoritesStore::initialize(Arc::new(MemoryStorage::new()));
        let mut rx = store.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        store.add(movie(10, "Dez")).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.add(movie(10, "Dez")).unwrap();
        assert!(!rx.has_changed().unwrap());
    }
}
