//! Single-flight coordination for credential refresh.
//!
//! Every completed refresh attempt bumps a generation counter. A caller
//! records the generation before it sends a request; if the request comes
//! back 401 and the generation has moved on by the time the caller holds the
//! guard, somebody else already re-authenticated and the caller reuses that
//! outcome instead of logging in again.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use super::Credential;

/// Default bound on waiting for another caller's refresh
const DEFAULT_WAIT: Duration = Duration::from_secs(5);

pub struct RefreshGuard {
    /// Outcome of the most recent attempt. Holding the lock is "refreshing".
    last_outcome: Mutex<Option<Credential>>,
    generation: AtomicU64,
    wait: Duration,
}

impl Default for RefreshGuard {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT)
    }
}

impl RefreshGuard {
    pub fn new(wait: Duration) -> Self {
        Self {
            last_outcome: Mutex::new(None),
            generation: AtomicU64::new(0),
            wait,
        }
    }

    /// Number of refresh attempts completed so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_refreshing(&self) -> bool {
        self.last_outcome.try_lock().is_err()
    }

    /// Run `attempt` unless an attempt has completed since `observed`.
    ///
    /// If another attempt is in flight, waits up to the configured bound for
    /// it and returns its outcome. When the bound elapses first, `fallback`
    /// supplies the result (the currently stored credential). The guard is
    /// released when this returns, including when `attempt` fails or the
    /// future is dropped.
    pub async fn run<A, Fut, F>(&self, observed: u64, fallback: F, attempt: A) -> Option<Credential>
    where
        A: FnOnce() -> Fut,
        Fut: Future<Output = Option<Credential>>,
        F: FnOnce() -> Option<Credential>,
    {
        let mut last_outcome = match tokio::time::timeout(self.wait, self.last_outcome.lock()).await {
            Ok(guard) => guard,
            Err(_) => {
                debug!(wait_ms = self.wait.as_millis() as u64, "Gave up waiting for in-flight refresh");
                return fallback();
            }
        };

        if self.generation() != observed {
            debug!(observed, current = self.generation(), "Reusing outcome of completed refresh");
            return last_outcome.clone();
        }

        let outcome = attempt().await;
        *last_outcome = outcome.clone();
        self.generation.fetch_add(1, Ordering::AcqRel);
        outcome
    }

    /// Record a credential obtained without `run`, e.g. an explicit login.
    ///
    /// Waits for any in-flight attempt, then runs `store` under the guard.
    /// On success the credential becomes the latest outcome and the
    /// generation advances, so callers that observed an older generation
    /// reuse it.
    pub async fn publish<S, E>(&self, credential: Credential, store: S) -> Result<(), E>
    where
        S: FnOnce() -> Result<(), E>,
    {
        let mut last_outcome = self.last_outcome.lock().await;
        store()?;
        *last_outcome = Some(credential);
        self.generation.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
