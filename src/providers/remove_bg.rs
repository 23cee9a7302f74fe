//! remove.bg API Client Implementation
//!
//! Primary background-removal provider.
//!
//! API Docs: https://www.remove.bg/api

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::debug;

use crate::config::ProviderSettings;
use crate::providers::http_client::RateLimitedClient;
use crate::providers::traits::{BackgroundRemover, ProviderError, ProviderResult};

pub const REMOVE_BG_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";

/// remove.bg API client
pub struct RemoveBgProvider {
    client: RateLimitedClient,
    api_key: Option<String>,
    endpoint: String,
}

impl RemoveBgProvider {
    pub fn new(settings: &ProviderSettings, connect_timeout: Duration) -> ProviderResult<Self> {
        Ok(RemoveBgProvider {
            client: RateLimitedClient::new(settings.rate_limit_per_minute, connect_timeout)?,
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
            endpoint: settings.endpoint.clone(),
        })
    }
}

#[async_trait]
impl BackgroundRemover for RemoveBgProvider {
    fn code(&self) -> &'static str {
        "remove_bg"
    }

    fn name(&self) -> &'static str {
        "remove.bg"
    }

    async fn submit(&self, image: Bytes, content_type: &str) -> ProviderResult<Bytes> {
        let api_key = self.api_key.as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("remove.bg API key not set".to_string()))?;

        debug!(endpoint = %self.endpoint, bytes = image.len(), "remove.bg request");

        let part = Part::bytes(image.to_vec())
            .file_name("image")
            .mime_str(content_type)?;
        let form = Form::new()
            .part("image_file", part)
            .text("size", "auto");

        self.client
            .post_multipart(&self.endpoint, form)
            .header("X-Api-Key", api_key)
            .send_for_image()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            endpoint: REMOVE_BG_ENDPOINT.to_string(),
            api_key: api_key.map(str::to_string),
            rate_limit_per_minute: 50,
        }
    }

    #[test]
    fn test_provider_identity() {
        let provider = RemoveBgProvider::new(&settings(Some("key")), Duration::from_secs(5)).unwrap();
        assert_eq!(provider.code(), "remove_bg");
        assert_eq!(provider.name(), "remove.bg");
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let provider = RemoveBgProvider::new(&settings(Some("")), Duration::from_secs(5)).unwrap();
        let result = provider.submit(Bytes::from_static(b"img"), "image/png").await;
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }
}
