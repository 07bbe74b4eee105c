//! Process-local preferences

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;

use super::EntryInfo;
use super::PreferenceBackend;
use crate::error::PrefsError;

#[derive(Debug, Clone)]
struct Entry {
    payload: Vec<u8>,
    updated_at: DateTime<Utc>,
}

/// Preferences held in a concurrent map.
///
/// Data is lost when the process exits; used when no database can be
/// opened and in tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: DashMap<String, Entry>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PreferenceBackend for MemoryBackend {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PrefsError> {
        Ok(self.entries.get(key).map(|e| e.payload.clone()))
    }

    async fn write(&self, key: &str, payload: Vec<u8>) -> Result<DateTime<Utc>, PrefsError> {
        let updated_at = Utc::now();
        self.entries
            .insert(key.to_string(), Entry { payload, updated_at });
        Ok(updated_at)
    }

    async fn remove(&self, key: &str) -> Result<bool, PrefsError> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn entries(&self, prefix: &str) -> Result<Vec<EntryInfo>, PrefsError> {
        let mut found: Vec<EntryInfo> = self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| EntryInfo {
                key: e.key().clone(),
                updated_at: e.updated_at,
                size: e.payload.len(),
            })
            .collect();
        found.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(found)
    }
}
