mod client;

pub use client::ApiClient;

use lernu_types::UnitResources;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API returned HTTP {0}")]
    Api(u16),
}

/// Media endpoints needed by the resource cache, split out so the cache can
/// be driven by a fake in tests.
#[async_trait::async_trait]
pub trait MediaSource: Send + Sync {
    /// Manifest of media files a unit's lessons depend on
    async fn unit_resources(
        &self,
        unit_id: &str,
        language: &str,
    ) -> Result<UnitResources, ApiError>;

    async fn audio(&self, filename: &str) -> Result<Vec<u8>, ApiError>;

    async fn image(&self, filename: &str) -> Result<Vec<u8>, ApiError>;
}
