//! Error types

mod api;
mod auth;
mod config;
mod export;
mod field;
mod notify;
mod prefs;

pub use api::*;
pub use auth::*;
pub use config::*;
pub use export::*;
pub use field::*;
pub use notify::*;
pub use prefs::*;

/// Top-level error for operations that cross module boundaries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Field(#[from] FieldError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Prefs(#[from] PrefsError),
}
