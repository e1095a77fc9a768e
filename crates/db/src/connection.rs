//! Store connection management.
//!
//! The initial connect is retried with linear backoff. If every attempt
//! fails the caller keeps serving in degraded mode; request handlers then go
//! through [`ConnectionManager::run`], which reconnects once on demand when
//! no handle is installed or the operation hits a connection-level failure.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::store::TodoStore;

/// Opens a fresh store handle.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> StoreResult<Arc<dyn TodoStore>>;
}

/// Linear backoff for the initial connect.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total connect attempts, including the first one.
    pub max_attempts: u32,
    /// Wait after the first failure; grows by the same amount each attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Owns the active store handle.
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    policy: RetryPolicy,
    handle: RwLock<Option<Arc<dyn TodoStore>>>,
    /// Serializes on-demand reconnects so concurrent failures open one handle.
    reconnect_lock: Mutex<()>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>, policy: RetryPolicy) -> Self {
        Self {
            connector,
            policy,
            handle: RwLock::new(None),
            reconnect_lock: Mutex::new(()),
        }
    }

    /// Try to connect up to `max_attempts` times, sleeping between attempts.
    ///
    /// Returns `false` when every attempt failed; the manager then has no
    /// handle until a later request reconnects on demand.
    pub async fn connect_with_retry(&self) -> bool {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.connector.connect().await {
                Ok(store) => {
                    self.install(store);
                    tracing::info!(attempt, "Connected to store");
                    return true;
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "Store connection attempt failed",
                    );
                    if attempt < max_attempts {
                        let delay = self.policy.delay_after(attempt);
                        tracing::info!(delay_ms = delay.as_millis() as u64, "Retrying store connection");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        tracing::error!(max_attempts, "Could not connect to store, continuing in degraded mode");
        false
    }

    /// The currently installed handle, if any.
    pub fn handle(&self) -> Option<Arc<dyn TodoStore>> {
        self.handle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_connected(&self) -> bool {
        self.handle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Run a store operation against the current handle.
    ///
    /// Reconnects once first if no handle is installed. If the operation
    /// fails with [`StoreError::Unavailable`], reconnects once and re-runs
    /// it; a failed reconnect drops the stale handle. Any reconnect failure
    /// is reported as [`StoreError::Unavailable`].
    pub async fn run<T, F, Fut>(&self, op: F) -> StoreResult<T>
    where
        F: Fn(Arc<dyn TodoStore>) -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let store = match self.handle() {
            Some(store) => store,
            None => self.reconnect_for_request(None).await?,
        };

        match op(Arc::clone(&store)).await {
            Err(StoreError::Unavailable(reason)) => {
                tracing::warn!(%reason, "Store connection lost during request");
                let fresh = self.reconnect_for_request(Some(&store)).await?;
                op(fresh).await
            }
            other => other,
        }
    }

    /// Release the handle. Subsequent requests will reconnect on demand.
    pub async fn close(&self) {
        let taken = self
            .handle
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(store) = taken {
            store.close().await;
            tracing::info!("Store connection closed");
        }
    }

    /// Make exactly one connect attempt and install the result.
    ///
    /// Any failure is reported as [`StoreError::Unavailable`].
    pub async fn reconnect(&self) -> StoreResult<Arc<dyn TodoStore>> {
        let _guard = self.reconnect_lock.lock().await;
        self.connect_once(None).await
    }

    /// Reconnect on behalf of a request, at most once.
    ///
    /// `stale` is the handle the request saw fail, if any. When another
    /// request already installed a different handle while this one waited
    /// for the lock, that handle is returned without connecting.
    async fn reconnect_for_request(
        &self,
        stale: Option<&Arc<dyn TodoStore>>,
    ) -> StoreResult<Arc<dyn TodoStore>> {
        let _guard = self.reconnect_lock.lock().await;

        if let Some(current) = self.handle() {
            let is_stale = stale.is_some_and(|s| Arc::ptr_eq(s, &current));
            if !is_stale {
                return Ok(current);
            }
        }
        self.connect_once(stale).await
    }

    /// Caller must hold `reconnect_lock`.
    async fn connect_once(
        &self,
        stale: Option<&Arc<dyn TodoStore>>,
    ) -> StoreResult<Arc<dyn TodoStore>> {
        tracing::info!("Attempting on-demand store reconnect");
        match self.connector.connect().await {
            Ok(store) => {
                self.install(Arc::clone(&store));
                tracing::info!("Store reconnected");
                Ok(store)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Store reconnect failed");
                if let Some(stale) = stale {
                    self.invalidate(stale);
                }
                Err(match e {
                    StoreError::Operation(msg) => StoreError::Unavailable(msg),
                    unavailable => unavailable,
                })
            }
        }
    }

    /// Install `store`, closing the handle it displaces in the background.
    fn install(&self, store: Arc<dyn TodoStore>) {
        let displaced = self
            .handle
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Arc::clone(&store));
        if let Some(old) = displaced {
            if !Arc::ptr_eq(&old, &store) {
                retire(old);
            }
        }
    }

    /// Drop `stale` unless another request already replaced it.
    fn invalidate(&self, stale: &Arc<dyn TodoStore>) {
        let removed = {
            let mut slot = self.handle.write().unwrap_or_else(PoisonError::into_inner);
            if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, stale)) {
                slot.take()
            } else {
                None
            }
        };
        if let Some(old) = removed {
            retire(old);
        }
    }
}

/// Close a handle that is no longer installed. In-flight requests may still
/// hold it, so the close runs on its own task.
fn retire(store: Arc<dyn TodoStore>) {
    tokio::spawn(async move {
        store.close().await;
        tracing::debug!("Displaced store handle closed");
    });
}
