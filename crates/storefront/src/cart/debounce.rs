//! Debounced cart persistence.
//!
//! Provides:
//! - `PersistDebouncer` - Collapses bursts of cart snapshots into one write
//!
//! When the cart changes, the new snapshot replaces any pending one and the
//! timer restarts. If another change arrives before the timer fires, only the
//! latest snapshot is written. Dropping the debouncer cancels the timer
//! without writing.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::storage::CartStorage;
use crate::error::capture_internal;

/// Schedules cart snapshot writes after a quiet period.
pub struct PersistDebouncer {
    storage: Arc<dyn CartStorage>,
    key: Arc<str>,
    delay: Duration,
    /// Latest unwritten snapshot. Only held to swap the value, never across
    /// a write.
    pending: Arc<Mutex<Option<String>>>,
    /// Held for the whole write. A writer takes the snapshot after acquiring
    /// it, so a timer that already woke up can never overwrite a newer flush.
    write_lock: Arc<Mutex<()>>,
    timer: Option<JoinHandle<()>>,
}

impl PersistDebouncer {
    /// Create a debouncer writing to `key` in `storage` after `delay`.
    #[must_use]
    pub fn new(storage: Arc<dyn CartStorage>, key: &str, delay: Duration) -> Self {
        Self {
            storage,
            key: Arc::from(key),
            delay,
            pending: Arc::new(Mutex::new(None)),
            write_lock: Arc::new(Mutex::new(())),
            timer: None,
        }
    }

    /// Replace the pending snapshot and restart the timer.
    ///
    /// Outside a Tokio runtime there is no timer to run, so the snapshot is
    /// written immediately.
    pub fn schedule(&mut self, snapshot: String) {
        *lock(&self.pending) = Some(snapshot);
        self.cancel_timer();

        let Ok(handle) = Handle::try_current() else {
            tracing::debug!(key = %self.key, "No async runtime, writing cart snapshot immediately");
            self.flush();
            return;
        };

        let storage = Arc::clone(&self.storage);
        let key = Arc::clone(&self.key);
        let pending = Arc::clone(&self.pending);
        let write_lock = Arc::clone(&self.write_lock);
        let delay = self.delay;

        self.timer = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            write_pending(storage.as_ref(), &key, &pending, &write_lock);
        }));
    }

    /// Cancel the timer and write the pending snapshot now.
    pub fn flush(&mut self) {
        self.cancel_timer();
        write_pending(
            self.storage.as_ref(),
            &self.key,
            &self.pending,
            &self.write_lock,
        );
    }

    /// Cancel the timer and discard the pending snapshot.
    pub fn cancel(&mut self) {
        self.cancel_timer();
        lock(&self.pending).take();
    }

    /// Whether a snapshot is waiting to be written.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        lock(&self.pending).is_some()
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for PersistDebouncer {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

impl std::fmt::Debug for PersistDebouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistDebouncer")
            .field("key", &self.key)
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Write the pending snapshot, if any. Failures are logged and dropped: the
/// cart keeps working in memory.
fn write_pending(
    storage: &dyn CartStorage,
    key: &str,
    pending: &Mutex<Option<String>>,
    write_lock: &Mutex<()>,
) {
    let _writing = lock(write_lock);
    let Some(snapshot) = lock(pending).take() else {
        return;
    };

    match storage.save(key, &snapshot) {
        Ok(()) => tracing::debug!(key, bytes = snapshot.len(), "Cart snapshot persisted"),
        Err(e) => {
            capture_internal(&e, "persist cart snapshot");
        }
    }
}
