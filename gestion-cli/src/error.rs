//! CLI error type.

use gestion_lib::error::ApiError;
use gestion_lib::error::AuthError;
use gestion_lib::error::ConfigError;
use gestion_lib::error::ExportError;
use gestion_lib::error::NotifyError;
use gestion_lib::error::PrefsError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Lib(#[from] gestion_lib::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),

    #[error("Notification channel gave up after {0} attempts")]
    NotifyFailed(u32),
}

macro_rules! via_lib_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for CliError {
                fn from(e: $ty) -> Self {
                    CliError::Lib(e.into())
                }
            }
        )*
    };
}

via_lib_error!(ApiError, AuthError, ConfigError, ExportError, NotifyError, PrefsError);

impl CliError {
    /// The API refused the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            CliError::Lib(gestion_lib::Error::Api(e)) => e.is_unauthorized(),
            CliError::Lib(gestion_lib::Error::Auth(AuthError::MissingToken)) => true,
            _ => false,
        }
    }
}
