//! Ordered fallback across background-removal providers
//!
//! Providers are tried strictly one after another in priority order. The
//! first success wins; a provider failure is logged and converted into an
//! attempt on the next provider. Only exhaustion of the whole chain is
//! reported to the caller.

use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::ProvidersSettings;
use crate::providers::removal_ai::RemovalAiProvider;
use crate::providers::remove_bg::RemoveBgProvider;
use crate::providers::traits::{BackgroundRemover, ProviderError, ProviderResult};

/// Per-provider timeout when none is configured
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// One failed provider attempt
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: &'static str,
    pub error: ProviderError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.error)
    }
}

/// Aggregate removal failure
#[derive(Debug, Error)]
pub enum RemovalError {
    #[error("No background-removal providers are configured")]
    NoProviders,

    #[error("All background-removal providers failed")]
    AllProvidersFailed { attempts: Vec<ProviderFailure> },
}

/// Successful removal
#[derive(Debug, Clone)]
pub struct RemovalOutcome {
    pub image: Bytes,
    /// Code of the provider that produced `image`
    pub provider: &'static str,
    /// True when the primary provider failed and a later one succeeded
    pub fallback_used: bool,
}

/// Receives the non-fatal "switching to a fallback provider" signal
pub trait FallbackListener: Send + Sync {
    fn fallback_engaged(&self, failed: &str, error: &ProviderError, next: &str);
}

/// Listener that only logs
pub struct LogFallbackListener;

impl FallbackListener for LogFallbackListener {
    fn fallback_engaged(&self, failed: &str, error: &ProviderError, next: &str) {
        warn!(failed, next, error = %error, "Primary provider failed, trying fallback");
    }
}

/// Priority-ordered list of removal providers
pub struct FallbackChain {
    providers: Vec<Arc<dyn BackgroundRemover>>,
    timeout: Duration,
}

impl FallbackChain {
    pub fn new(timeout: Duration) -> Self {
        FallbackChain {
            providers: Vec::new(),
            timeout,
        }
    }

    /// Append a provider with lower priority than those already added
    pub fn with_provider(mut self, provider: Arc<dyn BackgroundRemover>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Build the remove.bg → removal.ai chain from settings
    ///
    /// Providers without credentials are left out.
    pub fn from_settings(settings: &ProvidersSettings) -> ProviderResult<Self> {
        let connect_timeout = Duration::from_secs(settings.connect_timeout_secs);
        let mut chain = FallbackChain::new(Duration::from_secs(settings.timeout_secs));

        if settings.primary.is_configured() {
            chain = chain.with_provider(Arc::new(RemoveBgProvider::new(&settings.primary, connect_timeout)?));
        } else {
            warn!("remove.bg API key not configured, skipping primary provider");
        }

        if settings.secondary.is_configured() {
            chain = chain.with_provider(Arc::new(RemovalAiProvider::new(&settings.secondary, connect_timeout)?));
        } else {
            warn!("removal.ai token not configured, skipping secondary provider");
        }

        info!(providers = ?chain.provider_codes(), timeout_secs = settings.timeout_secs, "Background removal chain ready");
        Ok(chain)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_codes(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.code()).collect()
    }

    /// Run the chain until one provider succeeds
    ///
    /// `listener` is told at most once per call, at the first failure that
    /// still has a provider left to try.
    pub async fn remove_background(
        &self,
        image: Bytes,
        content_type: &str,
        listener: &dyn FallbackListener,
    ) -> Result<RemovalOutcome, RemovalError> {
        if self.providers.is_empty() {
            return Err(RemovalError::NoProviders);
        }

        let mut attempts = Vec::new();

        for (index, provider) in self.providers.iter().enumerate() {
            let start = Instant::now();
            let result = tokio::time::timeout(self.timeout, provider.submit(image.clone(), content_type))
                .await
                .unwrap_or(Err(ProviderError::Timeout(self.timeout)));

            match result {
                Ok(processed) => {
                    info!(
                        provider = provider.code(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        bytes = processed.len(),
                        fallback = index > 0,
                        "Background removed"
                    );
                    return Ok(RemovalOutcome {
                        image: processed,
                        provider: provider.code(),
                        fallback_used: index > 0,
                    });
                }
                Err(e) => {
                    warn!(
                        provider = provider.code(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        error = %e,
                        "Background removal provider failed"
                    );

                    if attempts.is_empty() {
                        if let Some(next) = self.providers.get(index + 1) {
                            listener.fallback_engaged(provider.code(), &e, next.code());
                        }
                    }

                    attempts.push(ProviderFailure {
                        provider: provider.code(),
                        error: e,
                    });
                }
            }
        }

        error!(
            attempts = %attempts.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
            "All background removal providers failed"
        );
        Err(RemovalError::AllProvidersFailed { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted provider that counts its calls
    struct FakeProvider {
        code: &'static str,
        response: Option<&'static [u8]>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn ok(code: &'static str, response: &'static [u8]) -> Arc<Self> {
            Arc::new(FakeProvider { code, response: Some(response), delay: None, calls: AtomicUsize::new(0) })
        }

        fn failing(code: &'static str) -> Arc<Self> {
            Arc::new(FakeProvider { code, response: None, delay: None, calls: AtomicUsize::new(0) })
        }

        fn slow(code: &'static str, delay: Duration) -> Arc<Self> {
            Arc::new(FakeProvider { code, response: Some(b"late"), delay: Some(delay), calls: AtomicUsize::new(0) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BackgroundRemover for FakeProvider {
        fn code(&self) -> &'static str {
            self.code
        }

        fn name(&self) -> &'static str {
            self.code
        }

        async fn submit(&self, _image: Bytes, _content_type: &str) -> ProviderResult<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.response {
                Some(bytes) => Ok(Bytes::from_static(bytes)),
                None => Err(ProviderError::ApiError { status: 500, message: "boom".to_string() }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingListener {
        events: Mutex<Vec<(String, String)>>,
    }

    impl FallbackListener for RecordingListener {
        fn fallback_engaged(&self, failed: &str, _error: &ProviderError, next: &str) {
            self.events.lock().push((failed.to_string(), next.to_string()));
        }
    }

    fn chain(providers: &[Arc<FakeProvider>]) -> FallbackChain {
        providers.iter().fold(FallbackChain::new(DEFAULT_PROVIDER_TIMEOUT), |chain, p| {
            chain.with_provider(p.clone())
        })
    }

    fn input() -> Bytes {
        Bytes::from_static(b"source")
    }

    #[tokio::test]
    async fn test_primary_success_skips_secondary() {
        let primary = FakeProvider::ok("primary", b"from-primary");
        let secondary = FakeProvider::ok("secondary", b"from-secondary");
        let listener = RecordingListener::default();

        let outcome = chain(&[primary.clone(), secondary.clone()])
            .remove_background(input(), "image/png", &listener)
            .await
            .unwrap();

        assert_eq!(outcome.image, Bytes::from_static(b"from-primary"));
        assert_eq!(outcome.provider, "primary");
        assert!(!outcome.fallback_used);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
        assert!(listener.events.lock().is_empty());
    }

    #[tokio::test]
    async fn test_secondary_used_after_primary_failure() {
        let primary = FakeProvider::failing("primary");
        let secondary = FakeProvider::ok("secondary", b"from-secondary");
        let listener = RecordingListener::default();

        let outcome = chain(&[primary.clone(), secondary.clone()])
            .remove_background(input(), "image/png", &listener)
            .await
            .unwrap();

        assert_eq!(outcome.image, Bytes::from_static(b"from-secondary"));
        assert!(outcome.fallback_used);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
        assert_eq!(
            *listener.events.lock(),
            vec![("primary".to_string(), "secondary".to_string())]
        );
    }

    #[tokio::test]
    async fn test_all_failed_aggregates_causes() {
        let primary = FakeProvider::failing("primary");
        let secondary = FakeProvider::failing("secondary");
        let listener = RecordingListener::default();

        let result = chain(&[primary, secondary])
            .remove_background(input(), "image/png", &listener)
            .await;

        match result {
            Err(RemovalError::AllProvidersFailed { attempts }) => {
                let codes: Vec<_> = attempts.iter().map(|a| a.provider).collect();
                assert_eq!(codes, vec!["primary", "secondary"]);
            }
            other => panic!("expected AllProvidersFailed, got {:?}", other),
        }
        // Warning fires once even though the fallback failed too
        assert_eq!(listener.events.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_three_providers_notify_once() {
        let providers = [
            FakeProvider::failing("a"),
            FakeProvider::failing("b"),
            FakeProvider::ok("c", b"from-c"),
        ];
        let listener = RecordingListener::default();

        let outcome = chain(&providers)
            .remove_background(input(), "image/png", &listener)
            .await
            .unwrap();

        assert_eq!(outcome.provider, "c");
        assert_eq!(listener.events.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let result = FallbackChain::new(DEFAULT_PROVIDER_TIMEOUT)
            .remove_background(input(), "image/png", &LogFallbackListener)
            .await;
        assert!(matches!(result, Err(RemovalError::NoProviders)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_provider_times_out_and_falls_back() {
        let slow = FakeProvider::slow("slow", Duration::from_secs(120));
        let fast = FakeProvider::ok("fast", b"from-fast");
        let listener = RecordingListener::default();

        let outcome = chain(&[slow.clone(), fast])
            .remove_background(input(), "image/png", &listener)
            .await
            .unwrap();

        assert_eq!(outcome.provider, "fast");
        assert_eq!(slow.calls(), 1);
    }
}
