use std::sync::atomic::{ AtomicU64, Ordering };
use tokio::sync::Mutex;

/// Holds the result of the most recently dispatched request for one display
/// slot. Every dispatch takes a sequence number from `begin`; a completion
/// is applied only if its number is still the latest, so responses arriving
/// out of order can never overwrite newer state with older state.
pub struct ResponseSlot<T> {
    dispatched: AtomicU64,
    value: Mutex<Option<(u64, T)>>,
}

impl<T: Clone> ResponseSlot<T> {
    pub fn new() -> Self {
        Self {
            dispatched: AtomicU64::new(0),
            value: Mutex::new(None),
        }
    }

    /// Tag a new request at dispatch time.
    pub fn begin(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a completed request. Returns false (and discards the value)
    /// when a newer request has been dispatched since `seq` was taken.
    pub async fn accept(&self, seq: u64, value: T) -> bool {
        if seq != self.dispatched.load(Ordering::SeqCst) {
            return false;
        }
        let mut guard = self.value.lock().await;
        *guard = Some((seq, value));
        true
    }

    /// Current value, if the latest dispatched request has completed.
    pub async fn get(&self) -> Option<T> {
        self.value.lock().await.as_ref().map(|(_, v)| v.clone())
    }

    /// Drop the displayed value without affecting the dispatch counter.
    pub async fn clear(&self) {
        *self.value.lock().await = None;
    }
}

impl<T: Clone> Default for ResponseSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
