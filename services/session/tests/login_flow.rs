//! Integration tests for the login / selection / logout flow
//!
//! The flow runs against a mocked API so no network is involved; the real
//! `ApiClient` is still used to verify what the next outgoing request would
//! carry.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::storage::{Scope, StorageAccessor, StorageKey};
use session::api::{ApiClient, TENANT_HEADER};
use session::config::ApiConfig;
use session::error::ApiResult;
use session::flow::{AuthApi, AuthFlow, LoginOutcome};
use session::models::{LoginRequest, LoginResponse, Membership, Organization};
use session::session::SessionManager;
use session::tenant::{TenantResolver, TenantState};

struct MockApi {
    login_response: LoginResponse,
    memberships: Vec<Membership>,
    login_calls: AtomicUsize,
    organizations_calls: AtomicUsize,
}

impl MockApi {
    fn new(login_response: LoginResponse, memberships: Vec<Membership>) -> Self {
        MockApi {
            login_response,
            memberships,
            login_calls: AtomicUsize::new(0),
            organizations_calls: AtomicUsize::new(0),
        }
    }
}

impl AuthApi for &MockApi {
    async fn login(&self, _payload: &LoginRequest) -> ApiResult<LoginResponse> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.login_response.clone())
    }

    async fn organizations(&self, _user_id: &str) -> ApiResult<Vec<Membership>> {
        self.organizations_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.memberships.clone())
    }
}

fn login_response() -> LoginResponse {
    LoginResponse {
        access_token: "abc".to_string(),
        token_type: "Bearer".to_string(),
        id: "42".to_string(),
        organization_code: None,
        first_access: false,
    }
}

fn membership(code: &str, name: &str) -> Membership {
    Membership {
        organization: Organization {
            id: uuid::Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
        },
        subscription: None,
    }
}

struct Harness {
    storage: Arc<StorageAccessor>,
    session: Arc<SessionManager>,
    tenant: Arc<TenantResolver>,
}

impl Harness {
    fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let storage = Arc::new(StorageAccessor::in_memory());
        let session = Arc::new(SessionManager::new(storage.clone()));
        let tenant = Arc::new(TenantResolver::new(storage.clone()));
        Harness {
            storage,
            session,
            tenant,
        }
    }

    fn flow<'a>(&self, api: &'a MockApi) -> AuthFlow<&'a MockApi> {
        AuthFlow::new(api, self.session.clone(), self.tenant.clone())
    }

    fn api_client(&self) -> ApiClient {
        let config = ApiConfig {
            base_url: "http://localhost:3000".to_string(),
        };
        ApiClient::new(&config, self.session.clone(), self.tenant.clone())
    }
}

#[tokio::test]
async fn single_organization_is_auto_selected() {
    let harness = Harness::new();
    let api = MockApi::new(login_response(), vec![membership("ORG1", "Acme")]);

    let outcome = harness
        .flow(&api)
        .login("jo@example.com", "secret", true)
        .await
        .unwrap();

    assert!(matches!(outcome, LoginOutcome::Ready));
    assert_eq!(
        harness.tenant.state(),
        TenantState::Active("ORG1".to_string())
    );

    // remember=true owns the durable scope
    assert_eq!(
        harness.storage.read(Scope::Durable, StorageKey::OrganizationCode),
        Some("ORG1".to_string())
    );
    assert_eq!(
        harness.storage.read(Scope::Durable, StorageKey::OrganizationName),
        Some("Acme".to_string())
    );

    // The next outgoing request carries the tenant header
    let request = harness
        .api_client()
        .request(reqwest::Method::GET, "/items")
        .build()
        .unwrap();
    assert_eq!(
        request.headers().get(TENANT_HEADER).unwrap(),
        "ORG1"
    );
    assert_eq!(
        request.headers().get("authorization").unwrap(),
        "Bearer abc"
    );
}

#[tokio::test]
async fn multiple_organizations_require_explicit_selection() {
    let harness = Harness::new();
    let api = MockApi::new(
        login_response(),
        vec![membership("ORG1", "Acme"), membership("ORG2", "Globex")],
    );
    let flow = harness.flow(&api);

    let outcome = flow.login("jo@example.com", "secret", false).await.unwrap();

    let list = match outcome {
        LoginOutcome::SelectOrganization(list) => list,
        other => panic!("expected SelectOrganization, got {:?}", other),
    };
    assert_eq!(list.len(), 2);
    assert_eq!(harness.tenant.state(), TenantState::AwaitingSelection);
    assert_eq!(harness.tenant.resolve_code(), None);

    // Explicit pick lands in the session's (ephemeral) scope
    flow.select_organization("ORG2", "Globex");
    assert_eq!(
        harness.tenant.state(),
        TenantState::Active("ORG2".to_string())
    );
    assert_eq!(
        harness
            .storage
            .read(Scope::Ephemeral, StorageKey::OrganizationCode),
        Some("ORG2".to_string())
    );
    assert_eq!(
        harness.storage.read(Scope::Durable, StorageKey::OrganizationCode),
        None
    );
}

#[tokio::test]
async fn server_preselected_organization_wins() {
    let harness = Harness::new();
    let mut response = login_response();
    response.organization_code = Some("ORG2".to_string());
    let api = MockApi::new(
        response,
        vec![membership("ORG1", "Acme"), membership("ORG2", "Globex")],
    );

    let outcome = harness
        .flow(&api)
        .login("jo@example.com", "secret", true)
        .await
        .unwrap();

    assert!(matches!(outcome, LoginOutcome::Ready));
    assert_eq!(harness.tenant.resolve_code(), Some("ORG2".to_string()));
    assert_eq!(
        harness.tenant.organization_name(),
        Some("Globex".to_string())
    );
}

#[tokio::test]
async fn first_access_persists_nothing() {
    let harness = Harness::new();
    let mut response = login_response();
    response.first_access = true;
    let api = MockApi::new(response, vec![membership("ORG1", "Acme")]);

    let outcome = harness
        .flow(&api)
        .login("jo@example.com", "secret", true)
        .await
        .unwrap();

    assert!(matches!(outcome, LoginOutcome::PasswordChangeRequired));
    assert_eq!(api.organizations_calls.load(Ordering::SeqCst), 0);
    assert_eq!(harness.tenant.state(), TenantState::Unauthenticated);

    for key in StorageKey::ALL {
        assert_eq!(harness.storage.read(Scope::Durable, key), None, "{:?}", key);
        assert_eq!(harness.storage.read(Scope::Ephemeral, key), None, "{:?}", key);
    }
}

#[tokio::test]
async fn logout_clears_every_key_from_both_scopes() {
    let harness = Harness::new();
    let api = MockApi::new(login_response(), vec![membership("ORG1", "Acme")]);
    let flow = harness.flow(&api);

    flow.login("jo@example.com", "secret", true).await.unwrap();

    // Scatter extra state across scopes before logging out
    harness
        .storage
        .write(Scope::Ephemeral, StorageKey::FcmToken, "tok");
    harness.session.set_admin_token("admin");

    flow.logout();

    assert_eq!(harness.tenant.state(), TenantState::Unauthenticated);
    for key in StorageKey::ALL {
        assert_eq!(harness.storage.read(Scope::Durable, key), None, "{:?}", key);
        assert_eq!(harness.storage.read(Scope::Ephemeral, key), None, "{:?}", key);
    }

    // A request after logout carries neither credentials nor tenant
    let request = harness
        .api_client()
        .request(reqwest::Method::GET, "/items")
        .build()
        .unwrap();
    assert!(request.headers().get("authorization").is_none());
    assert!(request.headers().get(TENANT_HEADER).is_none());
}

#[tokio::test]
async fn switch_is_visible_to_the_next_request() {
    let harness = Harness::new();
    let api = MockApi::new(login_response(), vec![membership("ORG1", "Acme")]);
    let flow = harness.flow(&api);
    let client = harness.api_client();

    flow.login("jo@example.com", "secret", true).await.unwrap();

    let first = client.request(reqwest::Method::GET, "/items").build().unwrap();
    assert_eq!(first.headers().get(TENANT_HEADER).unwrap(), "ORG1");

    let generation = harness.tenant.generation();
    flow.switch_organization("ORG2", "Globex");

    let second = client.request(reqwest::Method::GET, "/items").build().unwrap();
    assert_eq!(second.headers().get(TENANT_HEADER).unwrap(), "ORG2");
    assert_eq!(harness.tenant.generation(), generation + 1);
}
