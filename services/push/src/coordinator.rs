//! Push registration coordinator
//!
//! Runs the one-shot registration protocol on every application load:
//! capability check, worker registration, permission request, token
//! acquisition, local persistence, then backend registration, strictly in
//! that order. Every step is individually best-effort: a missing capability,
//! a denied permission or a failed backend call degrades that step only and
//! is never surfaced to the user.

use std::sync::Arc;

use common::storage::{Scope, StorageAccessor, StorageKey};
use tracing::{debug, info, warn};

use crate::config::PushConfig;
use crate::provider::{Permission, PushProvider, ServiceWorker};
use crate::registration::{PLATFORM_WEB, RegistrationSink, TokenRegistration};

/// Result of one registration cycle, for logs and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The runtime environment has no push support
    Unsupported,
    /// The user denied notification permission, or the request failed
    PermissionDenied,
    /// The provider issued no token
    NoToken,
    /// Token stored locally and registered with the backend
    Registered,
    /// Token stored locally; the backend call failed and is re-attempted
    /// on the next application load
    RegisteredLocallyOnly,
}

/// Coordinates consent, token acquisition and backend registration
pub struct PushCoordinator<P, W, S> {
    provider: P,
    worker: W,
    sink: S,
    storage: Arc<StorageAccessor>,
    config: PushConfig,
}

impl<P, W, S> PushCoordinator<P, W, S>
where
    P: PushProvider,
    W: ServiceWorker,
    S: RegistrationSink,
{
    /// Create a coordinator over the given collaborators
    pub fn new(
        provider: P,
        worker: W,
        sink: S,
        storage: Arc<StorageAccessor>,
        config: PushConfig,
    ) -> Self {
        PushCoordinator {
            provider,
            worker,
            sink,
            storage,
            config,
        }
    }

    /// Run one registration cycle
    ///
    /// Local persistence of the token happens before the backend call and
    /// is never skipped, so a failed registration never loses the token.
    /// The cycle re-runs on every load where permission is already granted;
    /// the backend upserts by token, so that is safe.
    pub async fn run(&self) -> RegistrationOutcome {
        if !self.provider.is_supported() {
            debug!("Push notifications unsupported in this environment");
            return RegistrationOutcome::Unsupported;
        }

        // Worker registration is independent of permission state and its
        // failure degrades this step only; a provider that truly needs the
        // worker fails token acquisition below instead.
        if let Err(e) = self.worker.register(&self.config.worker_path).await {
            warn!(
                "Background worker registration at {} failed: {}",
                self.config.worker_path, e
            );
        }

        let permission = match self.provider.request_permission().await {
            Ok(permission) => permission,
            Err(e) => {
                warn!("Notification permission request failed: {}", e);
                return RegistrationOutcome::PermissionDenied;
            }
        };

        if permission != Permission::Granted {
            debug!("Notification permission not granted: {:?}", permission);
            return RegistrationOutcome::PermissionDenied;
        }

        let token = match self.provider.get_token(&self.config.vapid_public_key).await {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                warn!("Push provider returned no token");
                return RegistrationOutcome::NoToken;
            }
            Err(e) => {
                warn!("Failed to obtain push token: {}", e);
                return RegistrationOutcome::NoToken;
            }
        };

        // Persisted immediately, whatever happens to the backend call
        self.storage
            .write(Scope::Durable, StorageKey::FcmToken, &token);

        let registration = TokenRegistration {
            token,
            platform: PLATFORM_WEB.to_string(),
            endpoint: self.config.endpoint.clone(),
            device_info: self.config.device_info.clone(),
        };

        match self.sink.register_token(&registration).await {
            Ok(()) => {
                info!("Push token registered with backend");
                RegistrationOutcome::Registered
            }
            Err(e) => {
                warn!("Backend push registration failed: {}", e);
                RegistrationOutcome::RegisteredLocallyOnly
            }
        }
    }
}
