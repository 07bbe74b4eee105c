//! Preference store error types

/// Preference store error type.
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(bincode::Error),
    #[error("deserialization error: {0}")]
    Deserialization(bincode::Error),
    /// Failure reported by a custom [`PreferenceBackend`](crate::prefs::PreferenceBackend).
    #[error("preference backend unavailable: {0}")]
    Backend(String),
}
