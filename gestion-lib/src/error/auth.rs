//! Authentication error types

/// Errors raised while obtaining a bearer token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No token has been stored yet.
    #[error("No access token available")]
    MissingToken,

    /// The stored token could not be read.
    #[error("Token storage error: {0}")]
    Storage(String),
}
