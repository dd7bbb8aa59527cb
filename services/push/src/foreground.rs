//! Foreground message delivery
//!
//! While the application is open and focused, incoming push messages bypass
//! the background worker and are surfaced directly as a transient
//! notification. This path is independent of the registration protocol and
//! keeps no state of its own.

use serde::Deserialize;
use tracing::debug;

/// A push payload delivered while the application is in the foreground
#[derive(Debug, Clone, Deserialize)]
pub struct ForegroundMessage {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    /// Opaque payload for the screens, carried as-is
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Displays a transient user-visible notification
pub trait Notifier {
    fn notify(&self, title: &str, body: &str);
}

/// Stateless deliver-and-display path for foreground messages
pub struct ForegroundDispatcher<N> {
    notifier: N,
}

impl<N: Notifier> ForegroundDispatcher<N> {
    /// Create a dispatcher over the given notifier
    pub fn new(notifier: N) -> Self {
        ForegroundDispatcher { notifier }
    }

    /// Surface a payload as a transient notification
    pub fn dispatch(&self, message: &ForegroundMessage) {
        debug!("Foreground push message received");

        let title = message.title.as_deref().unwrap_or("Upkeep");
        let body = message.body.as_deref().unwrap_or_default();
        self.notifier.notify(title, body);
    }
}
