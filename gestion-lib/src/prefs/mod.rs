//! Persisted grid preferences.
//!
//! A [`PreferenceStore`] bincode-encodes values over a timestamped
//! [`PreferenceBackend`]. Grid snapshots live under `grid:<id>`; other
//! settings (such as the stored API token) share the same store under
//! their own keys.

mod backend;
mod memory;
mod snapshot;
mod sqlite;

pub use backend::EntryInfo;
pub use backend::PreferenceBackend;
pub use memory::MemoryBackend;
pub use snapshot::PreferenceSnapshot;
pub use sqlite::SqliteBackend;

use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::PrefsError;

/// Key prefix for grid snapshots.
pub const GRID_PREFIX: &str = "grid:";

/// A grid with a stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedGrid {
    pub id: String,
    pub saved_at: DateTime<Utc>,
}

/// Typed preference store.
///
/// Cheap to clone; clones share the backend.
///
/// # Example
///
/// ```ignore
/// use gestion_lib::prefs::{MemoryBackend, PreferenceStore};
///
/// let store = PreferenceStore::new(MemoryBackend::new());
/// store.save("factures", &snapshot).await?;
/// let restored = store.load("factures").await?;
/// ```
#[derive(Clone)]
pub struct PreferenceStore {
    backend: Arc<dyn PreferenceBackend>,
}

impl PreferenceStore {
    /// Create a new store with the given backend.
    pub fn new(backend: impl PreferenceBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Store backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    // =========================================================================
    // Typed key-value access
    // =========================================================================

    /// Get a typed value for a key.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PrefsError> {
        match self.backend.read(key).await? {
            Some(bytes) => Ok(Some(
                bincode::deserialize(&bytes).map_err(PrefsError::Deserialization)?,
            )),
            None => Ok(None),
        }
    }

    /// Set a typed value for a key; returns the write time.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<DateTime<Utc>, PrefsError> {
        let bytes = bincode::serialize(value).map_err(PrefsError::Serialization)?;
        self.backend.write(key, bytes).await
    }

    /// Delete a key. Returns `true` if it existed.
    pub async fn delete(&self, key: &str) -> Result<bool, PrefsError> {
        self.backend.remove(key).await
    }

    // =========================================================================
    // Grid snapshots
    // =========================================================================

    /// Stores (or overwrites) the snapshot for a grid.
    pub async fn save(&self, grid_id: &str, snapshot: &PreferenceSnapshot) -> Result<DateTime<Utc>, PrefsError> {
        self.set(&grid_key(grid_id), snapshot).await
    }

    /// Loads the snapshot for a grid, if one was saved.
    pub async fn load(&self, grid_id: &str) -> Result<Option<PreferenceSnapshot>, PrefsError> {
        self.get(&grid_key(grid_id)).await
    }

    /// Deletes the snapshot for a grid. Returns `true` if one existed.
    pub async fn reset(&self, grid_id: &str) -> Result<bool, PrefsError> {
        self.delete(&grid_key(grid_id)).await
    }

    /// Every grid with a stored snapshot and when it was saved, by id.
    pub async fn saved_grids(&self) -> Result<Vec<SavedGrid>, PrefsError> {
        let entries = self.backend.entries(GRID_PREFIX).await?;
        Ok(entries
            .into_iter()
            .filter_map(|e| {
                let id = e.key.strip_prefix(GRID_PREFIX)?.to_string();
                Some(SavedGrid {
                    id,
                    saved_at: e.updated_at,
                })
            })
            .collect())
    }

    /// Ids of every grid with a stored snapshot.
    pub async fn list_grids(&self) -> Result<Vec<String>, PrefsError> {
        Ok(self.saved_grids().await?.into_iter().map(|g| g.id).collect())
    }
}

fn grid_key(grid_id: &str) -> String {
    format!("{}{}", GRID_PREFIX, grid_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Density;
    use crate::grid::GroupBy;
    use crate::grid::SortConfig;

    fn snapshot(page_size: usize) -> PreferenceSnapshot {
        PreferenceSnapshot {
            visible_columns: vec!["numero".into(), "client".into()],
            sort: SortConfig::desc("numero"),
            group_by: GroupBy::column("statut"),
            page_size,
            density: Density::Compact,
        }
    }

    #[tokio::test]
    async fn test_save_load_overwrite_reset() {
        let store = PreferenceStore::in_memory();
        assert_eq!(store.load("k1").await.unwrap(), None);

        store.save("k1", &snapshot(25)).await.unwrap();
        assert_eq!(store.load("k1").await.unwrap(), Some(snapshot(25)));

        store.save("k1", &snapshot(50)).await.unwrap();
        assert_eq!(store.load("k1").await.unwrap().unwrap().page_size, 50);

        assert!(store.reset("k1").await.unwrap());
        assert_eq!(store.load("k1").await.unwrap(), None);
        assert!(!store.reset("k1").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_grids_ignores_other_settings() {
        let store = PreferenceStore::in_memory();
        store.save("clients", &snapshot(10)).await.unwrap();
        store.save("factures", &snapshot(10)).await.unwrap();
        store.set("auth.token", &"secret".to_string()).await.unwrap();

        assert_eq!(store.list_grids().await.unwrap(), ["clients", "factures"]);
    }

    #[tokio::test]
    async fn test_sqlite_backend_round_trip() {
        let store = PreferenceStore::new(SqliteBackend::open_in_memory().await.unwrap());
        store.save("offres_2024", &snapshot(25)).await.unwrap();
        store.save("offres", &snapshot(10)).await.unwrap();

        assert_eq!(store.load("offres_2024").await.unwrap(), Some(snapshot(25)));
        assert_eq!(store.list_grids().await.unwrap(), ["offres", "offres_2024"]);

        store.reset("offres_2024").await.unwrap();
        assert_eq!(store.load("offres_2024").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_saved_grids_carry_write_time() {
        for store in [
            PreferenceStore::in_memory(),
            PreferenceStore::new(SqliteBackend::open_in_memory().await.unwrap()),
        ] {
            let before = Utc::now() - chrono::Duration::seconds(1);
            let written = store.save("contacts", &snapshot(25)).await.unwrap();
            store.set("auth.token", &"secret".to_string()).await.unwrap();

            let saved = store.saved_grids().await.unwrap();
            assert_eq!(saved.len(), 1);
            assert_eq!(saved[0].id, "contacts");
            assert!(saved[0].saved_at >= before);
            assert_eq!(saved[0].saved_at.timestamp_millis(), written.timestamp_millis());
        }
    }

    #[tokio::test]
    async fn test_corrupt_bytes_surface_as_deserialization_error() {
        let backend = MemoryBackend::new();
        backend.write("grid:broken", vec![1, 2]).await.unwrap();
        let store = PreferenceStore::new(backend);

        let err = store.load("broken").await.unwrap_err();
        assert!(matches!(err, PrefsError::Deserialization(_)));
    }
}
