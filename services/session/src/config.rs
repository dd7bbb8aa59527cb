//! API client configuration

use anyhow::Result;

/// Configuration for the Upkeep API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the backend API (e.g., "https://api.upkeep.app")
    pub base_url: String,
}

impl ApiConfig {
    /// Create a new ApiConfig from environment variables
    ///
    /// # Environment Variables
    /// - `API_BASE_URL`: Base URL of the backend API (default: "http://localhost:3000")
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // A trailing slash would produce double slashes when joining paths
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(ApiConfig { base_url })
    }
}
