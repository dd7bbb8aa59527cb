//! Abstractions over the push provider SDK and the background worker
//!
//! The coordinator depends only on the success/failure shape of these
//! operations, not on any provider internals, so tests can substitute
//! counting mocks without a browser shim.

use anyhow::Result;

/// Notification permission as reported by the platform
///
/// Owned by the platform, not persisted by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// The user has not been asked yet
    Default,
    Granted,
    Denied,
}

/// The push provider SDK surface the coordinator depends on
#[allow(async_fn_in_trait)]
pub trait PushProvider {
    /// Whether the runtime environment supports push notifications at all
    fn is_supported(&self) -> bool;

    /// Ask the user for notification permission
    ///
    /// Resolves once the user interacts with the prompt; may fail outright
    /// when the platform blocks the request.
    async fn request_permission(&self) -> Result<Permission>;

    /// Request a device token, identifying the receiving backend project
    /// by its public key credential
    ///
    /// `Ok(None)` means the provider declined to issue a token without
    /// reporting an error.
    async fn get_token(&self, vapid_public_key: &str) -> Result<Option<String>>;
}

/// Registration surface for the push-capable background worker
///
/// The worker receives push events while the application is not in
/// foreground focus; its own message handling is an external contract.
#[allow(async_fn_in_trait)]
pub trait ServiceWorker {
    /// Register the background worker at the given well-known path
    async fn register(&self, path: &str) -> Result<()>;
}
