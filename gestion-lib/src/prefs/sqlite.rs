//! SQLite preference backend.

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_sqlite::JournalMode;
use async_sqlite::rusqlite;
use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;
use log::debug;

use super::EntryInfo;
use super::PreferenceBackend;
use crate::error::PrefsError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    payload BLOB NOT NULL,
    updated_at INTEGER NOT NULL
)";

/// Preferences in a SQLite file, with payloads cached after first read.
///
/// `updated_at` is stored as milliseconds since the epoch.
///
/// # Example
///
/// ```ignore
/// use gestion_lib::prefs::{PreferenceStore, SqliteBackend};
///
/// let store = PreferenceStore::new(SqliteBackend::open("preferences.db").await?);
/// ```
pub struct SqliteBackend {
    client: Client,
    cache: DashMap<String, Vec<u8>>,
}

impl SqliteBackend {
    /// Opens (or creates) the database at `path` in WAL mode.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, PrefsError> {
        debug!("opening preferences at {}", path.as_ref().display());
        let client = ClientBuilder::new()
            .path(path)
            .journal_mode(JournalMode::Wal)
            .open()
            .await?;
        Self::with_client(client).await
    }

    /// Database that lives as long as the backend.
    pub async fn open_in_memory() -> Result<Self, PrefsError> {
        let client = ClientBuilder::new().path(":memory:").open().await?;
        Self::with_client(client).await
    }

    async fn with_client(client: Client) -> Result<Self, PrefsError> {
        client.conn(|conn| conn.execute(SCHEMA, [])).await?;
        Ok(Self {
            client,
            cache: DashMap::new(),
        })
    }
}

#[async_trait]
impl PreferenceBackend for SqliteBackend {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PrefsError> {
        if let Some(hit) = self.cache.get(key) {
            return Ok(Some(hit.clone()));
        }

        let owned = key.to_string();
        let payload: Option<Vec<u8>> = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare("SELECT payload FROM preferences WHERE key = ?1")?;
                let mut rows = stmt.query([&owned])?;
                rows.next()?.map(|row| row.get(0)).transpose()
            })
            .await?;

        if let Some(bytes) = &payload {
            self.cache.insert(key.to_string(), bytes.clone());
        }
        Ok(payload)
    }

    async fn write(&self, key: &str, payload: Vec<u8>) -> Result<DateTime<Utc>, PrefsError> {
        let updated_at = Utc::now();
        let millis = updated_at.timestamp_millis();
        let owned = key.to_string();
        let bytes = payload.clone();

        self.client
            .conn(move |conn| {
                conn.execute(
                    "INSERT INTO preferences (key, payload, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET payload = excluded.payload,
                                                    updated_at = excluded.updated_at",
                    rusqlite::params![owned, bytes, millis],
                )
            })
            .await?;

        self.cache.insert(key.to_string(), payload);
        Ok(updated_at)
    }

    async fn remove(&self, key: &str) -> Result<bool, PrefsError> {
        let owned = key.to_string();
        let removed = self
            .client
            .conn(move |conn| conn.execute("DELETE FROM preferences WHERE key = ?1", [&owned]))
            .await?;
        self.cache.remove(key);
        Ok(removed > 0)
    }

    async fn entries(&self, prefix: &str) -> Result<Vec<EntryInfo>, PrefsError> {
        let prefix = prefix.to_string();
        let rows: Vec<(String, i64, i64)> = self
            .client
            .conn(move |conn| {
                // substr avoids LIKE treating '_' and '%' in grid ids as wildcards
                let mut stmt = conn.prepare(
                    "SELECT key, length(payload), updated_at FROM preferences
                     WHERE substr(key, 1, length(?1)) = ?1
                     ORDER BY key",
                )?;
                let rows = stmt.query_map([&prefix], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
                rows.collect()
            })
            .await?;

        Ok(rows
            .into_iter()
            .map(|(key, size, millis)| EntryInfo {
                key,
                updated_at: DateTime::from_timestamp_millis(millis).unwrap_or_default(),
                size: usize::try_from(size).unwrap_or(0),
            })
            .collect())
    }
}
