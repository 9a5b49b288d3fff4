//! Single-shot, cancellable timers keyed by purpose.
//!
//! Each [`TimerKey`] owns at most one pending task. Scheduling a key that
//! already has a pending task aborts the old one first, so re-arming always
//! supersedes and never stacks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::{SnapError, SnapResult};

/// What a timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Delay between the capture grant and frame acquisition.
    CaptureDelay,
    /// Deferred clipboard wipe after a copy.
    ClipboardClear,
}

struct Scheduled {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Registry of pending timers. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct TimerRegistry {
    pending: Arc<Mutex<HashMap<TimerKey, Scheduled>>>,
    generation: Arc<AtomicU64>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `job` once after `delay`, replacing any pending timer for `key`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: TimerKey, delay: Duration, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        let mut pending = lock(&self.pending);

        if let Some(previous) = pending.remove(&key) {
            previous.handle.abort();
            tracing::debug!(?key, "Superseded pending timer");
        }

        let registry = self.pending.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let current = {
                let mut pending = lock(&registry);
                match pending.get(&key) {
                    Some(entry) if entry.generation == generation => {
                        pending.remove(&key);
                        true
                    }
                    _ => false,
                }
            };
            if current {
                tracing::debug!(?key, "Timer fired");
                job();
            }
        });

        tracing::debug!(?key, delay_ms = delay.as_millis() as u64, "Timer armed");
        pending.insert(key, Scheduled { generation, handle });
    }

    /// Wait for `delay` under `key`.
    ///
    /// Resolves with `Err(SnapError::Cancelled)` if the timer is cancelled or
    /// superseded before it fires.
    pub async fn sleep(&self, key: TimerKey, delay: Duration) -> SnapResult<()> {
        let (tx, rx) = oneshot::channel();
        self.schedule(key, delay, move || {
            let _ = tx.send(());
        });
        rx.await.map_err(|_| SnapError::Cancelled)
    }

    /// Cancel the pending timer for `key`. Returns whether one was pending.
    pub fn cancel(&self, key: TimerKey) -> bool {
        match lock(&self.pending).remove(&key) {
            Some(entry) => {
                entry.handle.abort();
                tracing::debug!(?key, "Timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, key: TimerKey) -> bool {
        lock(&self.pending).contains_key(&key)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

fn lock(
    pending: &Mutex<HashMap<TimerKey, Scheduled>>,
) -> MutexGuard<'_, HashMap<TimerKey, Scheduled>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn rearming_supersedes_instead_of_stacking() {
        let timers = TimerRegistry::new();
        let fired = Arc::new(AtomicUsize::new(0));

        for marker in [1, 10] {
            let fired = fired.clone();
            timers.schedule(TimerKey::ClipboardClear, Duration::from_secs(5), move || {
                fired.fetch_add(marker, Ordering::SeqCst);
            });
        }
        assert_eq!(timers.pending_count(), 1);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 10);
        assert!(!timers.is_pending(TimerKey::ClipboardClear));
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let timers = TimerRegistry::new();
        timers.schedule(TimerKey::ClipboardClear, Duration::from_secs(5), || {});
        timers.schedule(TimerKey::CaptureDelay, Duration::from_secs(5), || {});
        assert_eq!(timers.pending_count(), 2);

        assert!(timers.cancel(TimerKey::CaptureDelay));
        assert!(!timers.cancel(TimerKey::CaptureDelay));
        assert!(timers.is_pending(TimerKey::ClipboardClear));
    }

    #[tokio::test(start_paused = true)]
    async fn sleep_resolves_when_fired() {
        let timers = TimerRegistry::new();
        timers
            .sleep(TimerKey::CaptureDelay, Duration::from_secs(3))
            .await
            .unwrap();
        assert_eq!(timers.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_sleep_reports_cancellation() {
        let timers = TimerRegistry::new();
        let waiter = {
            let timers = timers.clone();
            tokio::spawn(async move {
                timers
                    .sleep(TimerKey::CaptureDelay, Duration::from_secs(30))
                    .await
            })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(timers.cancel(TimerKey::CaptureDelay));

        let result = waiter.await.unwrap();
        assert!(matches!(result, Err(SnapError::Cancelled)));
    }
}
