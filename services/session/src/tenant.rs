//! Tenant context resolver
//!
//! Decides which organization the user is acting within and keeps that
//! decision consistent with what is persisted. The active code is resolved
//! fresh for every outgoing request (explicit override, then durable scope,
//! then ephemeral scope) so a tenant switch is visible to the very next
//! call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use common::storage::{Scope, StorageAccessor, StorageKey};
use tracing::{info, warn};

/// Where the resolver currently stands in the tenant lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantState {
    /// No authenticated user
    Unauthenticated,
    /// Authenticated, but no organization chosen yet
    AwaitingSelection,
    /// Acting within the given organization
    Active(String),
}

/// Resolves and mutates the active organization selection
pub struct TenantResolver {
    storage: Arc<StorageAccessor>,
    state: RwLock<TenantState>,
    override_code: RwLock<Option<String>>,
    generation: AtomicU64,
}

impl TenantResolver {
    /// Create a resolver in the `Unauthenticated` state
    pub fn new(storage: Arc<StorageAccessor>) -> Self {
        TenantResolver {
            storage,
            state: RwLock::new(TenantState::Unauthenticated),
            override_code: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// The current lifecycle state
    pub fn state(&self) -> TenantState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_state(&self, state: TenantState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Tenant generation counter
    ///
    /// Bumped on every organization switch. Tenant-scoped caches key off
    /// this value and must discard their contents when it changes, so no
    /// stale cross-tenant data is ever visible after a switch.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Set or clear a runtime override that wins over any persisted code
    pub fn set_override(&self, code: Option<String>) {
        *self.override_code.write().unwrap_or_else(|e| e.into_inner()) = code;
    }

    /// The effective organization code for the next request, if any
    ///
    /// Resolution order: runtime override, then durable scope, then
    /// ephemeral scope. Computed fresh on every call, never cached.
    pub fn resolve_code(&self) -> Option<String> {
        if let Some(code) = self
            .override_code
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Some(code);
        }

        self.storage
            .read(Scope::Durable, StorageKey::OrganizationCode)
            .or_else(|| self.storage.read(Scope::Ephemeral, StorageKey::OrganizationCode))
    }

    /// The display name of the active organization, if known
    ///
    /// Not authoritative; the code is what scopes requests.
    pub fn organization_name(&self) -> Option<String> {
        self.storage.read_any(StorageKey::OrganizationName)
    }

    /// Move to `AwaitingSelection` after a successful login
    pub fn on_login(&self) {
        self.set_state(TenantState::AwaitingSelection);
    }

    /// Select the active organization, persisting it in the given scope
    pub fn select_organization(&self, code: &str, name: &str, scope: Scope) {
        info!("Selecting organization {} ({})", code, name);

        self.storage.write(scope, StorageKey::OrganizationCode, code);
        self.storage.write(scope, StorageKey::OrganizationName, name);
        self.set_state(TenantState::Active(code.to_string()));
    }

    /// Switch to a different organization
    ///
    /// Persists the new selection and bumps the generation counter; all
    /// tenant-scoped state downstream is invalid from this point on.
    /// Membership is not validated locally: a code the user no longer has
    /// access to is rejected by the backend on the next scoped call.
    pub fn switch_organization(&self, code: &str, name: &str, scope: Scope) {
        info!("Switching active organization to {} ({})", code, name);

        self.storage.write(scope, StorageKey::OrganizationCode, code);
        self.storage.write(scope, StorageKey::OrganizationName, name);
        self.set_state(TenantState::Active(code.to_string()));
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Drop out of the tenant lifecycle at logout
    ///
    /// Storage is cleared by the session teardown; this only resets the
    /// lifecycle state.
    pub fn on_logout(&self) {
        self.set_state(TenantState::Unauthenticated);
    }

    /// An API call reported an invalid or expired credential
    pub fn on_auth_failure(&self) {
        warn!("Authentication failure reported, forcing re-authentication");
        self.set_state(TenantState::Unauthenticated);
    }

    /// A tenant-scoped call was rejected for the active organization
    ///
    /// The stale selection is removed from both scopes so it stops being
    /// attached to requests, and the user must pick again.
    pub fn on_tenant_rejected(&self) {
        warn!("Active organization rejected by the server, forcing re-selection");

        self.storage
            .clear(&[StorageKey::OrganizationCode, StorageKey::OrganizationName]);
        self.set_state(TenantState::AwaitingSelection);
    }
}
