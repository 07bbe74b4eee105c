//! Main GestionClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::auth::StaticTokenProvider;
use crate::auth::TokenProvider;
use crate::config::GestionConfig;
use crate::error::ApiError;

/// REST client for the back-office API.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across threads safely. Requests are never retried; a failed call
/// surfaces as an [`ApiError`] and the caller decides what to do.
///
/// # Example
///
/// ```ignore
/// use gestion_lib::{GestionClient, auth::StaticTokenProvider};
/// use gestion_lib::api::Resource;
///
/// let client = GestionClient::builder()
///     .url("https://gestion.example.com/api")
///     .token_provider(StaticTokenProvider::new("my-token"))
///     .build()?;
///
/// let factures = client.list(&Resource::Factures).await?;
/// ```
#[derive(Clone)]
pub struct GestionClient {
    inner: Arc<GestionClientInner>,
}

struct GestionClientInner {
    base_url: String,
    token_provider: Arc<dyn TokenProvider>,
    http_client: Client,
    timeout: Option<Duration>,
}

impl GestionClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> GestionClientBuilder<Missing, Missing> {
        GestionClientBuilder::new()
    }

    /// Client for `config.api_url`.
    ///
    /// Uses the configured token if there is one, otherwise `fallback`.
    pub fn from_config(
        config: &GestionConfig,
        fallback: impl TokenProvider + 'static,
    ) -> Result<Self, ApiError> {
        let builder = Self::builder().url(config.api_url.clone());
        let builder = match &config.token {
            Some(token) => builder.token_provider(StaticTokenProvider::new(token.clone())),
            None => builder.token_provider(fallback),
        };
        builder.timeout(config.timeout).build()
    }

    /// Returns the API base URL.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub(crate) fn token_provider(&self) -> &dyn TokenProvider {
        self.inner.token_provider.as_ref()
    }

    pub(crate) fn http_client(&self) -> &Client {
        &self.inner.http_client
    }

    pub(crate) fn timeout(&self) -> Option<Duration> {
        self.inner.timeout
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`GestionClient`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `url` - The API base URL
/// - `token_provider` - A [`TokenProvider`] implementation
pub struct GestionClientBuilder<Url, Provider> {
    url: Url,
    token_provider: Provider,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl GestionClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            token_provider: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }
}

impl Default for GestionClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> GestionClientBuilder<Missing, P> {
    /// Sets the API base URL.
    pub fn url(self, url: impl Into<String>) -> GestionClientBuilder<Set<String>, P> {
        GestionClientBuilder {
            url: Set(url.into()),
            token_provider: self.token_provider,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U> GestionClientBuilder<U, Missing> {
    /// Sets the token provider for authentication.
    pub fn token_provider<T: TokenProvider + 'static>(
        self,
        provider: T,
    ) -> GestionClientBuilder<U, Set<Arc<dyn TokenProvider>>> {
        GestionClientBuilder {
            url: self.url,
            token_provider: Set(Arc::new(provider) as Arc<dyn TokenProvider>),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U, P> GestionClientBuilder<U, P> {
    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl GestionClientBuilder<Set<String>, Set<Arc<dyn TokenProvider>>> {
    /// Builds the [`GestionClient`].
    ///
    /// Fails if the URL does not parse or the HTTP client cannot be built.
    pub fn build(self) -> Result<GestionClient, ApiError> {
        let base_url = self.url.0;
        url::Url::parse(&base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(GestionClient {
            inner: Arc::new(GestionClientInner {
                base_url,
                token_provider: self.token_provider.0,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rejects_bad_url() {
        let result = GestionClient::builder()
            .url("not a url")
            .token_provider(StaticTokenProvider::new("t"))
            .build();
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_build_keeps_base_url() {
        let client = GestionClient::builder()
            .token_provider(StaticTokenProvider::new("t"))
            .url("http://localhost:3000/api")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");
        assert_eq!(client.timeout(), Some(Duration::from_secs(5)));
    }
}
