//! HTTP client for the Upkeep backend API
//!
//! A thin wrapper over a shared `reqwest::Client` that stamps the bearer
//! credential and the tenant header onto every request. Both are computed
//! fresh per request, never cached, so a login, logout or organization
//! switch is reflected by the very next call.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{LoginRequest, LoginResponse, Membership};
use crate::session::SessionManager;
use crate::tenant::TenantResolver;

/// Header carrying the active organization code on every scoped request
pub const TENANT_HEADER: &str = "X-Organization-Code";

/// Client for the backend REST API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
    tenant: Arc<TenantResolver>,
}

impl ApiClient {
    /// Create a new API client with its own connection pool
    pub fn new(
        config: &ApiConfig,
        session: Arc<SessionManager>,
        tenant: Arc<TenantResolver>,
    ) -> Self {
        Self::with_http(reqwest::Client::new(), config, session, tenant)
    }

    /// Create an API client over an existing `reqwest::Client`
    ///
    /// Lets other subsystems share one connection pool with this client.
    pub fn with_http(
        http: reqwest::Client,
        config: &ApiConfig,
        session: Arc<SessionManager>,
        tenant: Arc<TenantResolver>,
    ) -> Self {
        ApiClient {
            http,
            base_url: config.base_url.clone(),
            session,
            tenant,
        }
    }

    /// A handle to the underlying HTTP client
    pub fn http(&self) -> reqwest::Client {
        self.http.clone()
    }

    /// Build a request for `path` with credentials and tenant header attached
    ///
    /// The bearer credential and the organization code are read fresh from
    /// the session and resolver on every call. When no organization code is
    /// resolvable the request goes out without the tenant header and the
    /// server decides whether that is acceptable for the endpoint.
    pub fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url);

        if let Some(token) = self.session.access_token() {
            let scheme = self
                .session
                .token_type()
                .unwrap_or_else(|| "Bearer".to_string());
            builder = builder.header(reqwest::header::AUTHORIZATION, format!("{} {}", scheme, token));
        }

        if let Some(code) = self.tenant.resolve_code() {
            builder = builder.header(TENANT_HEADER, code);
        }

        builder
    }

    /// Map a response status onto the client error taxonomy
    fn classify_status(status: StatusCode) -> Result<(), ApiError> {
        if status.is_success() {
            return Ok(());
        }
        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::FORBIDDEN => Err(ApiError::TenantRejected),
            other => Err(ApiError::UnexpectedStatus(other.as_u16())),
        }
    }

    /// Check a response and apply the forced state transitions
    ///
    /// An authentication failure drops the resolver to `Unauthenticated`;
    /// a tenant rejection drops it to `AwaitingSelection`.
    async fn check(&self, response: reqwest::Response) -> ApiResult<reqwest::Response> {
        match Self::classify_status(response.status()) {
            Ok(()) => Ok(response),
            Err(ApiError::Unauthorized) => {
                self.tenant.on_auth_failure();
                Err(ApiError::Unauthorized)
            }
            Err(ApiError::TenantRejected) => {
                self.tenant.on_tenant_rejected();
                Err(ApiError::TenantRejected)
            }
            Err(e) => Err(e),
        }
    }

    /// Authenticate with email and password
    pub async fn login(&self, payload: &LoginRequest) -> ApiResult<LoginResponse> {
        debug!("POST /auth/login for {}", payload.email);

        let response = self
            .request(Method::POST, "/auth/login")
            .json(payload)
            .send()
            .await?;
        let response = self.check(response).await?;
        Ok(response.json().await?)
    }

    /// Fetch the organizations the user is a member of
    pub async fn organizations(&self, user_id: &str) -> ApiResult<Vec<Membership>> {
        let path = format!("/auth/me/organizations/{}", user_id);
        let response = self.request(Method::GET, &path).send().await?;
        let response = self.check(response).await?;
        Ok(response.json().await?)
    }

    /// GET a tenant-scoped resource as JSON
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.request(Method::GET, path).send().await?;
        let response = self.check(response).await?;
        Ok(response.json().await?)
    }
}
