//! Storage seam under the preference store.

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::error::PrefsError;

/// A stored entry, described without its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub key: String,
    /// Time of the last write.
    pub updated_at: DateTime<Utc>,
    /// Encoded payload size in bytes.
    pub size: usize,
}

/// Where encoded preferences live.
///
/// Payloads are opaque; [`PreferenceStore`](super::PreferenceStore) encodes
/// them. Every write is timestamped so a grid can report when its layout
/// was last saved.
#[async_trait]
pub trait PreferenceBackend: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PrefsError>;

    /// Replaces the payload under `key` and returns the write time.
    async fn write(&self, key: &str, payload: Vec<u8>) -> Result<DateTime<Utc>, PrefsError>;

    /// Returns `true` if an entry existed.
    async fn remove(&self, key: &str) -> Result<bool, PrefsError>;

    /// Entries whose key starts with `prefix`, ordered by key.
    async fn entries(&self, prefix: &str) -> Result<Vec<EntryInfo>, PrefsError>;
}
