use std::env;

use serde::{Deserialize, Serialize};

#[derive(Default, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL, no trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

impl ApiConfig {
    pub fn new() -> Self {
        let base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_seconds = env::var("API_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Self {
            base_url,
            timeout_seconds,
        }
    }
}
