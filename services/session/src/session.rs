//! Session manager owning the current login session
//!
//! One authoritative scope decision is made per logical session: the
//! `remember` flag chosen at login decides whether the session lives in the
//! durable or the ephemeral storage scope, and every later read and write
//! goes through that one resolved scope.

use std::sync::{Arc, RwLock};

use common::storage::{Scope, StorageAccessor, StorageKey};
use tracing::info;

use crate::models::Session;

/// Manages the client-held session and its storage scope
pub struct SessionManager {
    storage: Arc<StorageAccessor>,
    scope: RwLock<Option<Scope>>,
}

impl SessionManager {
    /// Create a new session manager over the given storage
    pub fn new(storage: Arc<StorageAccessor>) -> Self {
        SessionManager {
            storage,
            scope: RwLock::new(None),
        }
    }

    /// The scope owning the current session, if one is known
    ///
    /// After a restart the scope is re-derived from wherever the access
    /// token is found, since a durable session outlives the process that
    /// made the `remember` decision.
    pub fn scope(&self) -> Option<Scope> {
        if let Some(scope) = *self.scope.read().unwrap_or_else(|e| e.into_inner()) {
            return Some(scope);
        }

        let derived = if self
            .storage
            .read(Scope::Durable, StorageKey::AccessToken)
            .is_some()
        {
            Some(Scope::Durable)
        } else if self
            .storage
            .read(Scope::Ephemeral, StorageKey::AccessToken)
            .is_some()
        {
            Some(Scope::Ephemeral)
        } else {
            None
        };

        if let Some(scope) = derived {
            *self.scope.write().unwrap_or_else(|e| e.into_inner()) = Some(scope);
        }
        derived
    }

    /// Start a session, writing all fields to the scope chosen by `remember`
    pub fn begin(&self, session: &Session) {
        let scope = if session.remember {
            Scope::Durable
        } else {
            Scope::Ephemeral
        };

        info!(
            "Starting session for user {} in {:?} scope",
            session.user_id, scope
        );

        *self.scope.write().unwrap_or_else(|e| e.into_inner()) = Some(scope);

        self.storage
            .write(scope, StorageKey::AccessToken, &session.access_token);
        self.storage
            .write(scope, StorageKey::TokenType, &session.token_type);
        self.storage.write(scope, StorageKey::UserId, &session.user_id);
        if let Some(name) = &session.user_name {
            self.storage.write(scope, StorageKey::UserName, name);
        }
    }

    /// End the session, clearing every client-owned key from BOTH scopes
    ///
    /// Clearing both scopes is deliberate: no residual state may survive
    /// logout even if the original write scope is misremembered.
    pub fn end(&self) {
        info!("Ending session, clearing both storage scopes");

        *self.scope.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.storage.clear(&StorageKey::ALL);
    }

    fn read_field(&self, key: StorageKey) -> Option<String> {
        match self.scope() {
            Some(scope) => self.storage.read(scope, key),
            None => self.storage.read_any(key),
        }
    }

    /// The current bearer credential, if a session exists
    pub fn access_token(&self) -> Option<String> {
        self.read_field(StorageKey::AccessToken)
    }

    /// The credential scheme of the current session (e.g., "Bearer")
    pub fn token_type(&self) -> Option<String> {
        self.read_field(StorageKey::TokenType)
    }

    /// The authenticated user's id, if a session exists
    pub fn user_id(&self) -> Option<String> {
        self.read_field(StorageKey::UserId)
    }

    /// The authenticated user's display name, if known
    pub fn user_name(&self) -> Option<String> {
        self.read_field(StorageKey::UserName)
    }

    /// Store the admin console credential in the session's scope
    pub fn set_admin_token(&self, token: &str) {
        let scope = self.scope().unwrap_or(Scope::Ephemeral);
        self.storage.write(scope, StorageKey::AdminToken, token);
    }

    /// The admin console credential, if one was stored
    pub fn admin_token(&self) -> Option<String> {
        self.read_field(StorageKey::AdminToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(remember: bool) -> Session {
        Session {
            access_token: "abc".to_string(),
            token_type: "Bearer".to_string(),
            user_id: "42".to_string(),
            user_name: Some("jo@example.com".to_string()),
            remember,
        }
    }

    #[test]
    fn remember_true_uses_durable_scope() {
        let storage = Arc::new(StorageAccessor::in_memory());
        let manager = SessionManager::new(storage.clone());

        manager.begin(&session(true));

        assert_eq!(manager.scope(), Some(Scope::Durable));
        assert_eq!(
            storage.read(Scope::Durable, StorageKey::AccessToken),
            Some("abc".to_string())
        );
        assert_eq!(storage.read(Scope::Ephemeral, StorageKey::AccessToken), None);
    }

    #[test]
    fn remember_false_uses_ephemeral_scope() {
        let storage = Arc::new(StorageAccessor::in_memory());
        let manager = SessionManager::new(storage.clone());

        manager.begin(&session(false));

        assert_eq!(manager.scope(), Some(Scope::Ephemeral));
        assert_eq!(storage.read(Scope::Durable, StorageKey::AccessToken), None);
        assert_eq!(
            storage.read(Scope::Ephemeral, StorageKey::AccessToken),
            Some("abc".to_string())
        );
    }

    #[test]
    fn end_clears_both_scopes_whatever_held_the_session() {
        let storage = Arc::new(StorageAccessor::in_memory());
        let manager = SessionManager::new(storage.clone());

        manager.begin(&session(true));
        storage.write(Scope::Ephemeral, StorageKey::FcmToken, "tok");
        storage.write(Scope::Durable, StorageKey::AdminToken, "admin");

        manager.end();

        for key in StorageKey::ALL {
            assert_eq!(storage.read(Scope::Durable, key), None, "{:?}", key);
            assert_eq!(storage.read(Scope::Ephemeral, key), None, "{:?}", key);
        }
        assert_eq!(manager.scope(), None);
    }

    #[test]
    fn scope_is_rederived_after_restart() {
        let storage = Arc::new(StorageAccessor::in_memory());

        // First "process": durable session
        SessionManager::new(storage.clone()).begin(&session(true));

        // Second "process" over the same storage
        let manager = SessionManager::new(storage);
        assert_eq!(manager.scope(), Some(Scope::Durable));
        assert_eq!(manager.access_token(), Some("abc".to_string()));
        assert_eq!(manager.user_id(), Some("42".to_string()));
    }
}
