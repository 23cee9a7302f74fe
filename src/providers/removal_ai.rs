//! removal.ai API Client Implementation
//!
//! Secondary provider, used when remove.bg fails.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::debug;

use crate::config::ProviderSettings;
use crate::providers::http_client::RateLimitedClient;
use crate::providers::traits::{BackgroundRemover, ProviderError, ProviderResult};

pub const REMOVAL_AI_ENDPOINT: &str = "https://api.removal.ai/3.0/remove";

/// removal.ai API client
pub struct RemovalAiProvider {
    client: RateLimitedClient,
    token: Option<String>,
    endpoint: String,
}

impl RemovalAiProvider {
    pub fn new(settings: &ProviderSettings, connect_timeout: Duration) -> ProviderResult<Self> {
        Ok(RemovalAiProvider {
            client: RateLimitedClient::new(settings.rate_limit_per_minute, connect_timeout)?,
            token: settings.api_key.clone().filter(|k| !k.is_empty()),
            endpoint: settings.endpoint.clone(),
        })
    }
}

#[async_trait]
impl BackgroundRemover for RemovalAiProvider {
    fn code(&self) -> &'static str {
        "removal_ai"
    }

    fn name(&self) -> &'static str {
        "removal.ai"
    }

    async fn submit(&self, image: Bytes, content_type: &str) -> ProviderResult<Bytes> {
        let token = self.token.as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("removal.ai token not set".to_string()))?;

        debug!(endpoint = %self.endpoint, bytes = image.len(), "removal.ai request");

        let part = Part::bytes(image.to_vec())
            .file_name("image")
            .mime_str(content_type)?;

        self.client
            .post_multipart(&self.endpoint, Form::new().part("image_file", part))
            .header("Rm-Token", token)
            .send_for_image()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_fails_without_network() {
        let settings = ProviderSettings {
            endpoint: REMOVAL_AI_ENDPOINT.to_string(),
            api_key: None,
            rate_limit_per_minute: 30,
        };
        let provider = RemovalAiProvider::new(&settings, Duration::from_secs(5)).unwrap();

        assert_eq!(provider.code(), "removal_ai");
        let result = provider.submit(Bytes::from_static(b"img"), "image/jpeg").await;
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }
}
