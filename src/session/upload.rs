//! Upload → background removal → commit

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::domain::UploadKind;
use crate::providers::{FallbackChain, FallbackListener, LogFallbackListener, ProviderError, RemovalError};

use super::{SessionHandle, StoredImage};

/// User-facing warning when the primary provider failed
pub const FALLBACK_WARNING: &str = "Primary background removal service failed, trying backup service";

/// Collects fallback warnings for the response; logging is left to
/// [`LogFallbackListener`]
#[derive(Default)]
pub struct WarningCollector {
    messages: Mutex<Vec<String>>,
}

impl WarningCollector {
    pub fn into_messages(self) -> Vec<String> {
        self.messages.into_inner()
    }
}

impl FallbackListener for WarningCollector {
    fn fallback_engaged(&self, failed: &str, error: &ProviderError, next: &str) {
        LogFallbackListener.fallback_engaged(failed, error, next);
        self.messages.lock().push(FALLBACK_WARNING.to_string());
    }
}

/// Result of an upload whose background removal succeeded
#[derive(Debug)]
pub enum UploadOutcome {
    /// The processed image is now the session's current image
    Processed {
        provider: &'static str,
        fallback_used: bool,
        warnings: Vec<String>,
    },
    /// A newer upload arrived while this one was processing; result dropped
    Superseded { warnings: Vec<String> },
}

/// Store `image` as the session's upload and run background removal on it
///
/// The session lock is never held across the provider calls. On total
/// failure the session keeps the raw upload and no processed image.
pub async fn upload_and_remove(
    session: &SessionHandle,
    chain: &FallbackChain,
    image: Bytes,
    kind: UploadKind,
) -> Result<UploadOutcome, RemovalError> {
    let (session_id, token) = {
        let mut guard = session.lock();
        let token = guard.begin_upload(StoredImage::from_upload(image.clone(), kind));
        (guard.id, token)
    };

    info!(session_id = %session_id, version = token, bytes = image.len(), "Starting background removal");

    let collector = WarningCollector::default();
    let outcome = chain.remove_background(image, kind.mime(), &collector).await;
    let warnings = collector.into_messages();
    let outcome = outcome?;

    let committed = session
        .lock()
        .commit_processed(token, StoredImage::new(outcome.image, "image/png"));

    if committed {
        Ok(UploadOutcome::Processed {
            provider: outcome.provider,
            fallback_used: outcome.fallback_used,
            warnings,
        })
    } else {
        warn!(session_id = %session_id, version = token, "Discarding superseded background removal result");
        Ok(UploadOutcome::Superseded { warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::traits::ProviderResult;
    use crate::providers::{BackgroundRemover, DEFAULT_PROVIDER_TIMEOUT};
    use crate::session::SessionStore;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Scripted {
        code: &'static str,
        ok: bool,
    }

    #[async_trait]
    impl BackgroundRemover for Scripted {
        fn code(&self) -> &'static str {
            self.code
        }

        fn name(&self) -> &'static str {
            self.code
        }

        async fn submit(&self, _image: Bytes, _content_type: &str) -> ProviderResult<Bytes> {
            if self.ok {
                Ok(Bytes::from_static(b"processed"))
            } else {
                Err(ProviderError::ApiError { status: 503, message: "down".to_string() })
            }
        }
    }

    /// Starts a second upload while the first one is in flight
    struct Racing {
        session: SessionHandle,
    }

    #[async_trait]
    impl BackgroundRemover for Racing {
        fn code(&self) -> &'static str {
            "racing"
        }

        fn name(&self) -> &'static str {
            "racing"
        }

        async fn submit(&self, _image: Bytes, _content_type: &str) -> ProviderResult<Bytes> {
            self.session
                .lock()
                .begin_upload(StoredImage::new(Bytes::from_static(b"newer"), "image/png"));
            Ok(Bytes::from_static(b"stale"))
        }
    }

    fn chain(providers: Vec<Arc<dyn BackgroundRemover>>) -> FallbackChain {
        providers
            .into_iter()
            .fold(FallbackChain::new(DEFAULT_PROVIDER_TIMEOUT), FallbackChain::with_provider)
    }

    #[tokio::test]
    async fn test_fallback_result_is_committed_with_warning() {
        let store = SessionStore::new();
        let session = store.create();
        let chain = chain(vec![
            Arc::new(Scripted { code: "primary", ok: false }) as Arc<dyn BackgroundRemover>,
            Arc::new(Scripted { code: "secondary", ok: true }) as Arc<dyn BackgroundRemover>,
        ]);

        let outcome = upload_and_remove(&session, &chain, Bytes::from_static(b"raw"), UploadKind::Png)
            .await
            .unwrap();

        match outcome {
            UploadOutcome::Processed { provider, fallback_used, warnings } => {
                assert_eq!(provider, "secondary");
                assert!(fallback_used);
                assert_eq!(warnings, vec![FALLBACK_WARNING.to_string()]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(session.lock().processed.as_ref().unwrap().bytes, Bytes::from_static(b"processed"));
    }

    #[tokio::test]
    async fn test_total_failure_sets_no_processed_image() {
        let store = SessionStore::new();
        let session = store.create();
        let chain = chain(vec![
            Arc::new(Scripted { code: "primary", ok: false }) as Arc<dyn BackgroundRemover>,
            Arc::new(Scripted { code: "secondary", ok: false }) as Arc<dyn BackgroundRemover>,
        ]);

        let result = upload_and_remove(&session, &chain, Bytes::from_static(b"raw"), UploadKind::Jpeg).await;

        assert!(matches!(result, Err(RemovalError::AllProvidersFailed { .. })));
        let guard = session.lock();
        assert!(guard.processed.is_none());
        assert_eq!(guard.original.as_ref().unwrap().content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_superseded_result_is_dropped() {
        let store = SessionStore::new();
        let session = store.create();
        let chain = chain(vec![Arc::new(Racing { session: session.clone() }) as Arc<dyn BackgroundRemover>]);

        let outcome = upload_and_remove(&session, &chain, Bytes::from_static(b"older"), UploadKind::Png)
            .await
            .unwrap();

        assert!(matches!(outcome, UploadOutcome::Superseded { .. }));
        let guard = session.lock();
        assert!(guard.processed.is_none());
        assert_eq!(guard.original.as_ref().unwrap().bytes, Bytes::from_static(b"newer"));
    }
}
