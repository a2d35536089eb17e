//! # claimdesk-notify — Notification Gateway Client
//!
//! Typed client for the outbound notification gateway. The platform
//! treats notification delivery as a best-effort side effect: callers
//! dispatch a message after their state change commits and log any
//! failure without surfacing it to the API client.
//!
//! This crate is the only path claimdesk uses to reach the gateway;
//! route handlers never construct HTTP requests to it directly.

pub mod config;
pub mod template;

pub use config::{ConfigError, NotifyConfig};
pub use template::TemplateKey;

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Errors from the notification gateway client.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Configuration problem.
    #[error("notify configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("notify request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The gateway answered with a non-success status.
    #[error("notification gateway returned {status}")]
    Gateway { status: u16 },
}

/// Outbound message payload, as the gateway expects it.
#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    template: &'a str,
    body: String,
}

/// Client for the notification gateway.
#[derive(Debug, Clone)]
pub struct NotifyClient {
    http: reqwest::Client,
    config: NotifyConfig,
}

impl NotifyClient {
    /// Create a new gateway client from configuration.
    pub fn new(config: NotifyConfig) -> Result<Self, NotifyError> {
        let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        if let Some(ref token) = config.api_token {
            let mut headers = reqwest::header::HeaderMap::new();
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| NotifyError::Config(ConfigError::InvalidToken))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }

        let http = builder.build().map_err(|e| NotifyError::Http {
            endpoint: "client_init".to_string(),
            source: e,
        })?;

        Ok(Self { http, config })
    }

    /// Render `template` with `substitutions` and deliver it to `to`.
    ///
    /// Returns `Err` on any delivery failure; whether that failure
    /// matters is the caller's decision. claimdesk logs and drops it.
    pub async fn send(
        &self,
        to: &str,
        template: TemplateKey,
        substitutions: &HashMap<&str, String>,
    ) -> Result<(), NotifyError> {
        let endpoint = self
            .config
            .gateway_url
            .join("v1/messages")
            .map_err(|e| {
                NotifyError::Config(ConfigError::InvalidUrl(
                    self.config.gateway_url.to_string(),
                    e.to_string(),
                ))
            })?;

        let message = OutboundMessage {
            from: &self.config.sender,
            to,
            subject: template.subject(),
            template: template.as_str(),
            body: template::render(template.body(), substitutions),
        };

        let response = self
            .http
            .post(endpoint.clone())
            .json(&message)
            .send()
            .await
            .map_err(|e| NotifyError::Http {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        if response.status().is_success() {
            tracing::debug!(to, template = %template, "notification delivered");
            Ok(())
        } else {
            Err(NotifyError::Gateway {
                status: response.status().as_u16(),
            })
        }
    }
}
