//! Loading flag with a minimum visible duration.
//!
//! A request that finishes in a few milliseconds would otherwise flash a
//! spinner on and straight back off. [`DelayedLoading`] turns on immediately,
//! but once on it stays on for at least the configured minimum duration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::LoadingConfig;

#[derive(Debug, Default)]
struct LoadingInner {
    /// When the flag was last switched on.
    shown_at: Option<Instant>,
    /// Bumped on every `set_true`; a scheduled clear only applies if it
    /// still matches.
    generation: u64,
}

/// Boolean loading flag with hysteresis.
///
/// Cheap to clone; clones share the same flag.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use admin_shell::loading::DelayedLoading;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let loading = DelayedLoading::new(Duration::from_millis(300));
/// loading.set_true();
/// loading.set_false();
/// // Still visible: the minimum duration has not elapsed yet.
/// assert!(loading.get());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DelayedLoading {
    inner: Arc<Mutex<LoadingInner>>,
    value: Arc<watch::Sender<bool>>,
    dirty: Arc<AtomicBool>,
    min_duration: Duration,
}

impl DelayedLoading {
    /// Create a flag (initially false) with the given minimum visible duration.
    pub fn new(min_duration: Duration) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(Mutex::new(LoadingInner::default())),
            value: Arc::new(tx),
            dirty: Arc::new(AtomicBool::new(false)),
            min_duration,
        }
    }

    /// Create a flag from the loading section of the shell configuration.
    pub fn from_config(config: &LoadingConfig) -> Self {
        Self::new(config.min_duration())
    }

    /// The configured minimum visible duration.
    pub fn min_duration(&self) -> Duration {
        self.min_duration
    }

    /// Current value of the flag.
    pub fn get(&self) -> bool {
        *self.value.borrow()
    }

    /// Subscribe to changes of the flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.value.subscribe()
    }

    /// Switch the flag on immediately, cancelling any pending clear.
    pub fn set_true(&self) {
        let mut inner = self.lock();
        inner.generation = inner.generation.wrapping_add(1);
        inner.shown_at = Some(Instant::now());
        self.publish(true);
    }

    /// Request the flag be switched off.
    ///
    /// Clears immediately when the minimum duration has already elapsed since
    /// the last `set_true`, otherwise schedules the clear for when it does.
    pub fn set_false(&self) {
        let inner = self.lock();
        if !self.get() {
            return;
        }

        let elapsed = inner
            .shown_at
            .map(|at| at.elapsed())
            .unwrap_or(Duration::MAX);
        if elapsed >= self.min_duration {
            self.publish(false);
            return;
        }

        let remaining = self.min_duration - elapsed;
        let generation = inner.generation;
        drop(inner);

        match Handle::try_current() {
            Ok(handle) => {
                log::debug!("Loading clear deferred by {:?}", remaining);
                let this = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(remaining).await;
                    this.clear_if_current(generation);
                });
            }
            Err(_) => {
                log::warn!("No tokio runtime to defer loading clear; clearing now");
                self.publish(false);
            }
        }
    }

    /// Check if the flag changed since the last `clear_dirty`.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    fn clear_if_current(&self, generation: u64) {
        let inner = self.lock();
        if inner.generation == generation {
            self.publish(false);
        }
    }

    fn publish(&self, value: bool) {
        let previous = self.value.send_replace(value);
        if previous != value {
            self.dirty.store(true, Ordering::SeqCst);
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoadingInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for DelayedLoading {
    fn default() -> Self {
        Self::from_config(&LoadingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_duration_clears_without_runtime() {
        let loading = DelayedLoading::new(Duration::ZERO);
        loading.set_true();
        assert!(loading.get());
        loading.set_false();
        assert!(!loading.get());
    }

    #[test]
    fn test_no_runtime_falls_back_to_immediate_clear() {
        let loading = DelayedLoading::new(Duration::from_secs(10));
        loading.set_true();
        loading.set_false();
        assert!(!loading.get());
    }

    #[test]
    fn test_set_false_when_already_false_is_noop() {
        let loading = DelayedLoading::new(Duration::from_secs(1));
        loading.set_false();
        assert!(!loading.get());
        assert!(!loading.is_dirty());
    }
}
