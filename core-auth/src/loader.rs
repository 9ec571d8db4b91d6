//! Init-once loading of the external SDK scripts.
//!
//! Each SDK has a load-status cell (`NotLoaded | Loading | Loaded`) instead of
//! a bare boolean, so concurrent callers share one in-flight load and a failed
//! attempt resets cleanly for retry. The host's `load_sdk` future runs on a
//! spawned task: a caller that gets cancelled mid-await cannot strand the
//! other waiters.

use crate::error::{AuthError, Result};
use bridge_traits::{SdkHost, SdkId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

type LoadOutcome = std::result::Result<(), String>;

enum LoadState {
    NotLoaded,
    Loading(Vec<oneshot::Sender<LoadOutcome>>),
    Loaded,
}

/// Ensures exactly one load of each external SDK per process lifetime.
pub struct ScriptLoader {
    host: Arc<dyn SdkHost>,
    cells: Arc<Mutex<HashMap<SdkId, LoadState>>>,
}

impl ScriptLoader {
    pub fn new(host: Arc<dyn SdkHost>) -> Self {
        Self {
            host,
            cells: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Ensure the SDK is loaded, suspending until the load completes.
    ///
    /// Resolves immediately if the SDK already loaded. Concurrent callers for
    /// the same SDK share one underlying load. A failed load resets the cell,
    /// so a later call retries with a fresh host load.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::LoadFailed`] when the host signals a load error.
    pub async fn ensure_loaded(&self, sdk: SdkId) -> Result<()> {
        let rx = {
            let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
            match cells.entry(sdk).or_insert(LoadState::NotLoaded) {
                LoadState::Loaded => return Ok(()),
                LoadState::Loading(waiters) => {
                    debug!(sdk = %sdk, "joining in-flight SDK load");
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    rx
                }
                state @ LoadState::NotLoaded => {
                    let (tx, rx) = oneshot::channel();
                    *state = LoadState::Loading(vec![tx]);
                    info!(sdk = %sdk, "loading SDK script");
                    self.spawn_load(sdk);
                    rx
                }
            }
        };

        match rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(reason)) => Err(AuthError::LoadFailed { sdk, reason }),
            // Load task dropped without notifying; treat as a failed load.
            Err(_) => Err(AuthError::LoadFailed {
                sdk,
                reason: "load task aborted".to_string(),
            }),
        }
    }

    fn spawn_load(&self, sdk: SdkId) {
        let host = Arc::clone(&self.host);
        let cells = Arc::clone(&self.cells);
        tokio::spawn(async move {
            let outcome: LoadOutcome = host.load_sdk(sdk).await.map_err(|e| e.to_string());

            let waiters = {
                let mut cells = cells.lock().unwrap_or_else(|e| e.into_inner());
                let state = cells.entry(sdk).or_insert(LoadState::NotLoaded);
                let next = if outcome.is_ok() {
                    LoadState::Loaded
                } else {
                    LoadState::NotLoaded
                };
                match std::mem::replace(state, next) {
                    LoadState::Loading(waiters) => waiters,
                    _ => Vec::new(),
                }
            };

            if let Err(reason) = &outcome {
                warn!(sdk = %sdk, reason = %reason, "SDK script load failed");
            } else {
                info!(sdk = %sdk, "SDK script loaded");
            }

            for waiter in waiters {
                let _ = waiter.send(outcome.clone());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Host whose loads block until released, counting invocations.
    struct GatedHost {
        calls: AtomicUsize,
        release: Notify,
        fail_first: AtomicUsize,
    }

    impl GatedHost {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                release: Notify::new(),
                fail_first: AtomicUsize::new(0),
            })
        }

        fn failing_first(n: usize) -> Arc<Self> {
            let host = Self::new();
            host.fail_first.store(n, Ordering::SeqCst);
            host
        }
    }

    #[async_trait::async_trait]
    impl SdkHost for GatedHost {
        async fn load_sdk(&self, sdk: SdkId) -> BridgeResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            if self.fail_first.load(Ordering::SeqCst) > 0 {
                self.fail_first.fetch_sub(1, Ordering::SeqCst);
                return Err(BridgeError::LoadFailed(format!("{} unreachable", sdk)));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_load_completes_and_is_idempotent() {
        let host = GatedHost::new();
        let loader = ScriptLoader::new(host.clone());

        // notify_one stores a permit, so the release cannot be missed.
        host.release.notify_one();
        loader.ensure_loaded(SdkId::Identity).await.unwrap();

        // Second call resolves without touching the host again.
        loader.ensure_loaded(SdkId::Identity).await.unwrap();
        assert_eq!(host.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_load() {
        let host = GatedHost::new();
        let loader = Arc::new(ScriptLoader::new(host.clone()));

        let l1 = Arc::clone(&loader);
        let l2 = Arc::clone(&loader);
        let h1 = tokio::spawn(async move { l1.ensure_loaded(SdkId::StorageClient).await });
        let h2 = tokio::spawn(async move { l2.ensure_loaded(SdkId::StorageClient).await });

        // Both callers must be waiting on the single in-flight load before
        // it is released.
        tokio::task::yield_now().await;
        host.release.notify_one();

        h1.await.unwrap().unwrap();
        h2.await.unwrap().unwrap();
        assert_eq!(host.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_sdks_load_independently() {
        let host = GatedHost::new();
        let loader = Arc::new(ScriptLoader::new(host.clone()));

        let l1 = Arc::clone(&loader);
        let l2 = Arc::clone(&loader);
        let h1 = tokio::spawn(async move { l1.ensure_loaded(SdkId::Identity).await });
        let h2 = tokio::spawn(async move { l2.ensure_loaded(SdkId::StorageClient).await });

        host.release.notify_one();
        host.release.notify_one();

        h1.await.unwrap().unwrap();
        h2.await.unwrap().unwrap();
        assert_eq!(host.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_retryable() {
        let host = GatedHost::failing_first(1);
        let loader = ScriptLoader::new(host.clone());

        host.release.notify_one();
        let err = loader.ensure_loaded(SdkId::Identity).await.unwrap_err();
        assert!(matches!(err, AuthError::LoadFailed { sdk, .. } if sdk == SdkId::Identity));

        // Retry issues a fresh host load that now succeeds.
        host.release.notify_one();
        loader.ensure_loaded(SdkId::Identity).await.unwrap();
        assert_eq!(host.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_waiters_all_see_failure() {
        let host = GatedHost::failing_first(1);
        let loader = Arc::new(ScriptLoader::new(host.clone()));

        let l1 = Arc::clone(&loader);
        let l2 = Arc::clone(&loader);
        let h1 = tokio::spawn(async move { l1.ensure_loaded(SdkId::Identity).await });
        let h2 = tokio::spawn(async move { l2.ensure_loaded(SdkId::Identity).await });

        tokio::task::yield_now().await;
        host.release.notify_one();

        assert!(h1.await.unwrap().is_err());
        assert!(h2.await.unwrap().is_err());
        assert_eq!(host.calls.load(Ordering::SeqCst), 1);
    }
}
