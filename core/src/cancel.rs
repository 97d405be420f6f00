//! Cancellation handles and the per-request registry
//!
//! Every dispatch attempt gets a fresh [`CancellationHandle`]: issued from
//! the [`CancellationRegistry`] right before the transport call, retired
//! unconditionally once the call settles. Handles are never reused across
//! attempts — a retry gets its own.
//!
//! The registry is the only shared mutable state in the core. Entries are
//! keyed by handle id, so concurrent requests issue and retire without
//! cross-talk.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::Notify;

/// One-shot cancellation signal observed by the transport.
///
/// Cloning is cheap and all clones observe the same signal. Signaling after
/// the call has settled is a harmless no-op.
#[derive(Clone, Debug, Default)]
pub struct CancelSignal {
    inner: Arc<SignalInner>,
}

#[derive(Debug, Default)]
struct SignalInner {
    canceled: AtomicBool,
    notify: Notify,
}

impl CancelSignal {
    /// Create an unsignaled signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal. Idempotent.
    pub fn cancel(&self) {
        if !self.inner.canceled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Whether the signal has fired.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        self.inner.canceled.load(Ordering::SeqCst)
    }

    /// Resolve once the signal fires; resolves immediately if it already has.
    pub async fn canceled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            // Register before re-checking the flag so a concurrent cancel()
            // between the check and the await cannot be missed.
            notified.as_mut().enable();
            if self.is_canceled() {
                return;
            }
            notified.await;
        }
    }
}

/// Cancellation handle for a single dispatch attempt.
#[derive(Clone, Debug)]
pub struct CancellationHandle {
    /// Registry key for this attempt
    pub id: u64,
    /// The signal the transport races its call against
    pub signal: CancelSignal,
}

/// Table of live cancellation signals, keyed per in-flight attempt.
///
/// Clones share the same table, so a client and its `extend`ed descendants
/// can cancel each other's requests.
#[derive(Clone, Debug, Default)]
pub struct CancellationRegistry {
    entries: Arc<RwLock<HashMap<u64, CancelSignal>>>,
    next_id: Arc<AtomicU64>,
}

impl CancellationRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh handle and register its signal.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (indicates a panic in another thread)
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn issue(&self) -> CancellationHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let signal = CancelSignal::new();
        self.entries
            .write()
            .expect("cancellation registry lock poisoned - indicates a panic in another thread")
            .insert(id, signal.clone());
        CancellationHandle { id, signal }
    }

    /// Remove a handle's entry. Retiring an absent or already retired handle
    /// is a no-op and never affects other live handles.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (indicates a panic in another thread)
    #[allow(clippy::expect_used)]
    pub fn retire(&self, handle: &CancellationHandle) {
        self.entries
            .write()
            .expect("cancellation registry lock poisoned - indicates a panic in another thread")
            .remove(&handle.id);
    }

    /// Signal one live attempt by id. Returns whether an entry was found.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (indicates a panic in another thread)
    #[allow(clippy::expect_used)]
    pub fn cancel(&self, id: u64) -> bool {
        self.entries
            .read()
            .expect("cancellation registry lock poisoned - indicates a panic in another thread")
            .get(&id)
            .map(CancelSignal::cancel)
            .is_some()
    }

    /// Signal every live attempt.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (indicates a panic in another thread)
    #[allow(clippy::expect_used)]
    pub fn cancel_all(&self) {
        for signal in self
            .entries
            .read()
            .expect("cancellation registry lock poisoned - indicates a panic in another thread")
            .values()
        {
            signal.cancel();
        }
    }

    /// Number of live entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned (indicates a panic in another thread)
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn active(&self) -> usize {
        self.entries
            .read()
            .expect("cancellation registry lock poisoned - indicates a panic in another thread")
            .len()
    }
}
