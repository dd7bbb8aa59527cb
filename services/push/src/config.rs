//! Push registration configuration

use anyhow::Result;

/// Configuration for the push registration coordinator
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Public key credential identifying the receiving backend project
    pub vapid_public_key: String,
    /// Well-known path of the push-capable background worker
    pub worker_path: String,
    /// Origin identifier reported to the backend at registration
    pub endpoint: String,
    /// Device descriptor reported to the backend at registration
    pub device_info: String,
}

impl PushConfig {
    /// Create a new PushConfig from environment variables
    ///
    /// # Environment Variables
    /// - `PUSH_VAPID_PUBLIC_KEY`: Public key credential for the push provider (required)
    /// - `PUSH_WORKER_PATH`: Background worker path (default: "/push-worker.js")
    /// - `PUSH_ENDPOINT`: Origin identifier (default: "http://localhost:8080")
    /// - `PUSH_DEVICE_INFO`: Device descriptor (default: "web")
    pub fn from_env() -> Result<Self> {
        let vapid_public_key = std::env::var("PUSH_VAPID_PUBLIC_KEY")
            .map_err(|_| anyhow::anyhow!("PUSH_VAPID_PUBLIC_KEY environment variable not set"))?;

        let worker_path =
            std::env::var("PUSH_WORKER_PATH").unwrap_or_else(|_| "/push-worker.js".to_string());
        let endpoint =
            std::env::var("PUSH_ENDPOINT").unwrap_or_else(|_| "http://localhost:8080".to_string());
        let device_info = std::env::var("PUSH_DEVICE_INFO").unwrap_or_else(|_| "web".to_string());

        Ok(PushConfig {
            vapid_public_key,
            worker_path,
            endpoint,
            device_info,
        })
    }
}
