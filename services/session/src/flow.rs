//! Login, selection and logout orchestration
//!
//! Ties the API client, the session manager and the tenant resolver
//! together into the flows the UI layer drives: authenticate, land on an
//! organization (automatically when there is exactly one), switch between
//! organizations, and tear everything down at logout.

use std::sync::Arc;

use common::storage::Scope;
use tracing::info;

use crate::api::ApiClient;
use crate::error::ApiResult;
use crate::models::{LoginRequest, LoginResponse, Membership, Session};
use crate::session::SessionManager;
use crate::tenant::TenantResolver;

/// The API surface the auth flow depends on
///
/// Implemented by [`ApiClient`]; tests substitute counting mocks so the
/// flow runs without a network.
#[allow(async_fn_in_trait)]
pub trait AuthApi {
    /// Authenticate with email and password
    async fn login(&self, payload: &LoginRequest) -> ApiResult<LoginResponse>;

    /// Fetch the user's organization membership list
    async fn organizations(&self, user_id: &str) -> ApiResult<Vec<Membership>>;
}

impl AuthApi for ApiClient {
    async fn login(&self, payload: &LoginRequest) -> ApiResult<LoginResponse> {
        ApiClient::login(self, payload).await
    }

    async fn organizations(&self, user_id: &str) -> ApiResult<Vec<Membership>> {
        ApiClient::organizations(self, user_id).await
    }
}

/// Outcome of a login attempt
#[derive(Debug)]
pub enum LoginOutcome {
    /// Session active and an organization selected; the app can proceed
    Ready,
    /// Authenticated, but the user must pick one of these organizations
    SelectOrganization(Vec<Membership>),
    /// First access: nothing was persisted, the user must change their
    /// password first
    PasswordChangeRequired,
}

/// Orchestrates the session and tenant lifecycle
pub struct AuthFlow<A> {
    api: A,
    session: Arc<SessionManager>,
    tenant: Arc<TenantResolver>,
}

impl<A: AuthApi> AuthFlow<A> {
    /// Create a flow over the given collaborators
    pub fn new(api: A, session: Arc<SessionManager>, tenant: Arc<TenantResolver>) -> Self {
        AuthFlow {
            api,
            session,
            tenant,
        }
    }

    fn session_scope(&self) -> Scope {
        self.session.scope().unwrap_or(Scope::Ephemeral)
    }

    /// Authenticate and land on an organization when possible
    ///
    /// On `firstAccess` nothing is persisted in either scope; the caller
    /// must route the user to the password-change flow. Otherwise the
    /// session is stored in the scope chosen by `remember`, and the
    /// organization is selected automatically when the server pre-selected
    /// one or the membership list has exactly one entry.
    pub async fn login(&self, email: &str, password: &str, remember: bool) -> ApiResult<LoginOutcome> {
        let response = self
            .api
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        if response.first_access {
            info!("First access for {}, password change required", email);
            return Ok(LoginOutcome::PasswordChangeRequired);
        }

        let session = Session {
            access_token: response.access_token,
            token_type: response.token_type,
            user_id: response.id.clone(),
            user_name: Some(email.to_string()),
            remember,
        };
        self.session.begin(&session);
        self.tenant.on_login();

        let scope = if remember { Scope::Durable } else { Scope::Ephemeral };
        let memberships = self.api.organizations(&response.id).await?;

        // A server-side pre-selection wins; name comes from the membership
        // list when the code is found there
        if let Some(code) = response.organization_code {
            let name = memberships
                .iter()
                .find(|m| m.organization.code == code)
                .map(|m| m.organization.name.clone())
                .unwrap_or_default();
            self.tenant.select_organization(&code, &name, scope);
            return Ok(LoginOutcome::Ready);
        }

        match memberships.as_slice() {
            [only] => {
                self.tenant
                    .select_organization(&only.organization.code, &only.organization.name, scope);
                Ok(LoginOutcome::Ready)
            }
            _ => Ok(LoginOutcome::SelectOrganization(memberships)),
        }
    }

    /// Explicitly pick the active organization
    pub fn select_organization(&self, code: &str, name: &str) {
        self.tenant
            .select_organization(code, name, self.session_scope());
    }

    /// Switch to another organization
    ///
    /// All tenant-scoped state downstream is invalid afterwards; consumers
    /// observe this through the resolver's generation counter.
    pub fn switch_organization(&self, code: &str, name: &str) {
        self.tenant
            .switch_organization(code, name, self.session_scope());
    }

    /// End the session and clear all persisted state from both scopes
    pub fn logout(&self) {
        self.session.end();
        self.tenant.on_logout();
    }
}
