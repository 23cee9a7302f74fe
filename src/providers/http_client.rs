//! Rate-Limited HTTP Client for background-removal APIs
//!
//! Wraps a reqwest client with a per-provider request quota and maps
//! provider HTTP responses onto `ProviderError`. Requests are sent once;
//! retrying is the fallback chain's job, not the client's.

use bytes::Bytes;
use governor::{Quota, RateLimiter, state::NotKeyed, clock::DefaultClock, middleware::NoOpMiddleware};
use reqwest::{multipart::Form, Client, RequestBuilder, Response, StatusCode};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, warn};

use crate::providers::traits::{ProviderError, ProviderResult};

/// Rate-limited HTTP client for API requests
pub struct RateLimitedClient {
    /// Inner HTTP client
    client: Client,

    /// Rate limiter (requests per minute)
    limiter: RateLimiter<NotKeyed, governor::state::InMemoryState, DefaultClock, NoOpMiddleware>,
}

impl RateLimitedClient {
    /// Create a new rate-limited client
    ///
    /// # Arguments
    /// * `rate_limit_per_minute` - Maximum requests allowed per minute (at least 1)
    /// * `connect_timeout` - TCP/TLS connect timeout
    pub fn new(rate_limit_per_minute: u32, connect_timeout: Duration) -> ProviderResult<Self> {
        // Ensure at least 1 request per minute
        let rate = NonZeroU32::new(rate_limit_per_minute.max(1)).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_minute(rate));

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(4)
            .user_agent(concat!("idphoto-studio/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(RateLimitedClient { client, limiter })
    }

    /// Build a multipart POST request
    pub fn post_multipart(&self, url: &str, form: Form) -> RateLimitedRequestBuilder<'_> {
        RateLimitedRequestBuilder {
            client: self,
            builder: self.client.post(url).multipart(form),
        }
    }

    /// Wait for rate limit and execute request
    async fn execute(&self, builder: RequestBuilder) -> ProviderResult<Response> {
        self.limiter.until_ready().await;

        debug!("Executing rate-limited request");

        let response = builder.send().await?;
        check_status(response).await
    }
}

/// Map non-2xx responses onto provider errors
async fn check_status(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        warn!(retry_after_secs = retry_after, "Rate limited by provider");

        return Err(ProviderError::RateLimited {
            retry_after_secs: retry_after,
        });
    }

    let body = response.text().await.unwrap_or_default();
    let message: String = body.chars().take(500).collect();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ProviderError::AuthFailed(format!("HTTP {}: {}", status.as_u16(), message)));
    }

    Err(ProviderError::ApiError {
        status: status.as_u16(),
        message,
    })
}

/// Request builder wrapper that enforces rate limiting
pub struct RateLimitedRequestBuilder<'a> {
    client: &'a RateLimitedClient,
    builder: RequestBuilder,
}

impl<'a> RateLimitedRequestBuilder<'a> {
    /// Add a header to the request
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Send the request (waits for rate limit)
    pub async fn send(self) -> ProviderResult<Response> {
        self.client.execute(self.builder).await
    }

    /// Send the request and read the body as a non-empty image
    pub async fn send_for_image(self) -> ProviderResult<Bytes> {
        let bytes = self.send().await?.bytes().await?;
        if bytes.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(bytes)
    }
}
