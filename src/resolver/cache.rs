//! Single-slot cache for the resolved service URL.
//!
//! # Design Decisions
//! - One slot per proxy instance, never shared between services
//! - Expiry is scheduled: a timer task clears the slot when the TTL elapses
//! - Every stored value carries a generation; a timer only clears the
//!   generation it was scheduled for
//! - Reads are lock-free (`ArcSwapOption`), writes are serialized together
//!   with their timer

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use url::Url;

/// A resolved URL and the moment it stops being valid.
#[derive(Debug)]
pub struct CachedUrl {
    pub url: Url,
    pub expires_at: Instant,
    generation: u64,
}

#[derive(Debug, Default)]
struct ExpiryTimer {
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl ExpiryTimer {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Holds at most one resolved URL with a time-to-live.
#[derive(Debug, Default)]
pub struct UrlCache {
    slot: Arc<ArcSwapOption<CachedUrl>>,
    timer: Mutex<ExpiryTimer>,
}

impl UrlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached URL, if present and not yet expired.
    pub fn get(&self) -> Option<Url> {
        let entry = self.slot.load();
        entry
            .as_deref()
            .filter(|cached| Instant::now() < cached.expires_at)
            .map(|cached| cached.url.clone())
    }

    /// Store `url` and schedule its removal after `ttl`.
    ///
    /// Replaces any previous value and cancels its timer. Must be called
    /// from within a Tokio runtime.
    pub fn put(&self, url: Url, ttl: Duration) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        timer.cancel();
        timer.generation += 1;
        let generation = timer.generation;

        tracing::debug!(
            url = %url,
            ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
            "caching service url"
        );

        self.slot.store(Some(Arc::new(CachedUrl {
            url,
            expires_at: Instant::now() + ttl,
            generation,
        })));

        let slot = Arc::downgrade(&self.slot);
        timer.task = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let Some(slot) = slot.upgrade() else {
                return;
            };
            let previous = slot.rcu(|current| match current {
                Some(cached) if cached.generation == generation => None,
                other => other.clone(),
            });
            if let Some(expired) = previous.filter(|c| c.generation == generation) {
                tracing::debug!(url = %expired.url, "service url cache expired");
            }
        }));
    }

    /// Clear the slot and cancel its pending expiry.
    pub fn invalidate(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        timer.cancel();
        self.slot.store(None);
    }

    /// Whether the slot holds a value, regardless of expiry.
    pub fn is_populated(&self) -> bool {
        self.slot.load().is_some()
    }
}

impl Drop for UrlCache {
    fn drop(&mut self) {
        self.timer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}
