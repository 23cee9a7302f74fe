//! Provider trait definitions for background-removal services
//!
//! Every removal service (remove.bg, removal.ai, ...) implements
//! `BackgroundRemover` so the fallback chain can treat them uniformly.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Single-provider failure
///
/// These are recovered by falling back to the next provider and are only
/// surfaced as part of an aggregate failure.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Provider returned an empty image")]
    EmptyResponse,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

// ============================================================================
// Provider Trait
// ============================================================================

/// A background-removal service
///
/// `submit` sends the image once and returns the processed image bytes.
/// Implementations must not retry internally.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Provider code (e.g., "remove_bg")
    fn code(&self) -> &'static str;

    /// Provider display name (e.g., "remove.bg")
    fn name(&self) -> &'static str;

    /// Remove the background from an encoded image
    ///
    /// # Arguments
    /// * `image` - Encoded source image (JPEG or PNG)
    /// * `content_type` - MIME type of `image`
    async fn submit(&self, image: Bytes, content_type: &str) -> ProviderResult<Bytes>;
}
