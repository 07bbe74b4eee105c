//! Environment configuration.

use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_API_URL: &str = "GESTION_API_URL";
pub const ENV_WS_URL: &str = "GESTION_WS_URL";
pub const ENV_TOKEN: &str = "GESTION_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "GESTION_TIMEOUT_SECS";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Endpoints and credentials for the back-office API.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use gestion_lib::config::GestionConfig;
///
/// let config = GestionConfig::new("http://localhost:3000/api")
///     .ws_url("ws://localhost:3000/ws")
///     .timeout(Duration::from_secs(10));
/// assert_eq!(config.ws_url.as_deref(), Some("ws://localhost:3000/ws"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestionConfig {
    /// REST base URL.
    pub api_url: String,
    /// Notification WebSocket URL.
    pub ws_url: Option<String>,
    /// Bearer token; when absent the stored token is used.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl GestionConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ws_url: None,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads the `GESTION_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = get(ENV_API_URL).ok_or(ConfigError::Missing(ENV_API_URL))?;
        validate_url(ENV_API_URL, &api_url, &["http", "https"])?;

        let ws_url = get(ENV_WS_URL);
        if let Some(ws) = &ws_url {
            validate_url(ENV_WS_URL, ws, &["ws", "wss"])?;
        }

        let timeout = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    ConfigError::invalid(ENV_TIMEOUT_SECS, format!("'{}' is not a number of seconds", raw))
                })?;
                if secs == 0 {
                    return Err(ConfigError::invalid(ENV_TIMEOUT_SECS, "must be at least 1"));
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_url,
            ws_url,
            token: get(ENV_TOKEN),
            timeout,
        })
    }

    pub fn ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = Some(url.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The WebSocket URL, or an error naming the missing variable.
    pub fn require_ws_url(&self) -> Result<&str, ConfigError> {
        self.ws_url.as_deref().ok_or(ConfigError::Missing(ENV_WS_URL))
    }
}

fn validate_url(name: &'static str, raw: &str, schemes: &[&str]) -> Result<(), ConfigError> {
    let url = url::Url::parse(raw).map_err(|e| ConfigError::invalid(name, e.to_string()))?;
    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::invalid(
            name,
            format!("scheme '{}' is not one of {}", url.scheme(), schemes.join(", ")),
        ));
    }
    Ok(())
}
