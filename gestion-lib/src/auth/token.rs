//! TokenProvider trait and AccessToken

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::error::AuthError;
use crate::prefs::PreferenceStore;

/// Settings key the stored token lives under.
pub const TOKEN_KEY: &str = "auth.token";

/// A bearer token with optional expiration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// The bearer token sent on every API call.
    pub access_token: String,
    /// When the token expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Creates a token with no known expiry.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    /// Creates a token that expires at `expires_at`.
    pub fn with_expiry(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: Some(expires_at),
        }
    }

    /// Returns `true` if the token has expired.
    ///
    /// Returns `false` if expiration time is unknown.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Utc::now() >= exp)
    }

    /// Returns the token as a bearer authorization header value.
    pub fn as_bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Supplies the bearer token for REST calls.
///
/// The client calls `get_token` before each request. Acquiring the token in
/// the first place (login) happens elsewhere; providers only hand it out.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use gestion_lib::auth::{AccessToken, TokenProvider};
/// use gestion_lib::error::AuthError;
///
/// struct EnvTokenProvider;
///
/// #[async_trait]
/// impl TokenProvider for EnvTokenProvider {
///     async fn get_token(&self, _base_url: &str) -> Result<AccessToken, AuthError> {
///         std::env::var("MY_TOKEN")
///             .map(AccessToken::new)
///             .map_err(|_| AuthError::MissingToken)
///     }
/// }
/// ```
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Gets an access token for the API at `base_url`.
    async fn get_token(&self, base_url: &str) -> Result<AccessToken, AuthError>;
}

/// A token provider that always returns the same token.
///
/// # Example
///
/// ```
/// use gestion_lib::auth::StaticTokenProvider;
///
/// let provider = StaticTokenProvider::new("my-access-token");
/// ```
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: AccessToken,
}

impl StaticTokenProvider {
    /// Creates a new static token provider with the given access token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(access_token),
        }
    }

    /// Creates a new static token provider from an existing AccessToken.
    pub fn from_token(token: AccessToken) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self, _base_url: &str) -> Result<AccessToken, AuthError> {
        Ok(self.token.clone())
    }
}

/// Reads the token from the settings store on every call.
///
/// A token written by another part of the application is picked up on the
/// next request without rebuilding the client.
#[derive(Clone)]
pub struct StoredTokenProvider {
    store: PreferenceStore,
}

impl StoredTokenProvider {
    pub fn new(store: PreferenceStore) -> Self {
        Self { store }
    }

    /// Writes the token to the store.
    pub async fn save_token(&self, token: &str) -> Result<(), AuthError> {
        self.store
            .set(TOKEN_KEY, &token.to_string())
            .await
            .map(|_| ())
            .map_err(|e| AuthError::Storage(e.to_string()))
    }

    /// Removes the stored token.
    pub async fn clear(&self) -> Result<(), AuthError> {
        self.store
            .delete(TOKEN_KEY)
            .await
            .map(|_| ())
            .map_err(|e| AuthError::Storage(e.to_string()))
    }
}

#[async_trait]
impl TokenProvider for StoredTokenProvider {
    async fn get_token(&self, _base_url: &str) -> Result<AccessToken, AuthError> {
        let token: Option<String> = self
            .store
            .get(TOKEN_KEY)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        match token {
            Some(t) if !t.is_empty() => Ok(AccessToken::new(t)),
            _ => Err(AuthError::MissingToken),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let past = AccessToken::with_expiry("t", Utc::now() - chrono::Duration::minutes(1));
        assert!(past.is_expired());
        assert!(!AccessToken::new("t").is_expired());
        assert_eq!(AccessToken::new("abc").as_bearer(), "Bearer abc");
    }

    #[tokio::test]
    async fn test_stored_provider_reads_latest_token() {
        let provider = StoredTokenProvider::new(PreferenceStore::in_memory());
        assert!(matches!(
            provider.get_token("http://api").await,
            Err(AuthError::MissingToken)
        ));

        provider.save_token("first").await.unwrap();
        assert_eq!(provider.get_token("http://api").await.unwrap().access_token, "first");

        provider.save_token("second").await.unwrap();
        assert_eq!(provider.get_token("http://api").await.unwrap().access_token, "second");

        provider.clear().await.unwrap();
        assert!(provider.get_token("http://api").await.is_err());
    }
}
