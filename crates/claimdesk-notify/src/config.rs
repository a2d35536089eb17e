//! Notification gateway configuration.
//!
//! Configures the gateway endpoint and sender identity. Override via
//! environment variables or explicit construction for testing.

use url::Url;

/// Configuration for connecting to the notification gateway.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct NotifyConfig {
    /// Base URL of the notification gateway. Messages are POSTed to
    /// `{gateway_url}/v1/messages`.
    pub gateway_url: Url,
    /// Sender address stamped on every outbound message.
    pub sender: String,
    /// Bearer token for gateway authentication, if the gateway requires one.
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for NotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyConfig")
            .field("gateway_url", &self.gateway_url)
            .field("sender", &self.sender)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl NotifyConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `NOTIFY_GATEWAY_URL` (required)
    /// - `NOTIFY_SENDER` (default: `no-reply@claimdesk.example`)
    /// - `NOTIFY_API_TOKEN` (optional)
    /// - `NOTIFY_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("NOTIFY_GATEWAY_URL").map_err(|_| ConfigError::MissingGatewayUrl)?;
        let gateway_url =
            Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(raw, e.to_string()))?;

        Ok(Self {
            gateway_url,
            sender: std::env::var("NOTIFY_SENDER")
                .unwrap_or_else(|_| "no-reply@claimdesk.example".to_string()),
            api_token: std::env::var("NOTIFY_API_TOKEN").ok(),
            timeout_secs: std::env::var("NOTIFY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `NOTIFY_GATEWAY_URL` is not set.
    #[error("NOTIFY_GATEWAY_URL is not set")]
    MissingGatewayUrl,

    /// A URL value could not be parsed.
    #[error("invalid URL '{0}': {1}")]
    InvalidUrl(String, String),

    /// The API token contains characters that cannot appear in an
    /// Authorization header.
    #[error("NOTIFY_API_TOKEN contains non-header characters")]
    InvalidToken,
}
