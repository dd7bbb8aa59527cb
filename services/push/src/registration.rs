//! Backend token registration

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

/// Platform tag sent with every registration from this client
pub const PLATFORM_WEB: &str = "WEB";

/// Payload submitted to the backend registration endpoint
#[derive(Debug, Clone, Serialize)]
pub struct TokenRegistration {
    pub token: String,
    pub platform: String,
    pub endpoint: String,
    pub device_info: String,
}

/// Sink accepting token registrations
///
/// The backend upserts registrations keyed by token, so submitting an
/// unchanged token again on a later application load is safe.
#[allow(async_fn_in_trait)]
pub trait RegistrationSink {
    /// Register a token with the backend; any non-success is an error
    async fn register_token(&self, registration: &TokenRegistration) -> Result<()>;
}

/// HTTP sink posting registrations to `POST /push/tokens`
pub struct HttpRegistrationSink {
    http: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl HttpRegistrationSink {
    /// Create a sink over an existing HTTP client
    ///
    /// Sharing the application's `reqwest::Client` keeps one connection
    /// pool for all backend traffic.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        HttpRegistrationSink {
            http,
            base_url: base_url.into(),
            bearer: None,
        }
    }

    /// Attach a bearer credential to registration calls
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

impl RegistrationSink for HttpRegistrationSink {
    async fn register_token(&self, registration: &TokenRegistration) -> Result<()> {
        debug!("POST /push/tokens for platform {}", registration.platform);

        let mut builder = self
            .http
            .post(format!("{}/push/tokens", self.base_url))
            .json(registration);

        if let Some(bearer) = &self.bearer {
            builder = builder.bearer_auth(bearer);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            anyhow::bail!(
                "Push token registration failed with status {}",
                response.status()
            );
        }

        Ok(())
    }
}
