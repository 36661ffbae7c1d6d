//! Process-wide request serialization.
//!
//! Every generic API call runs inside `RequestQueue::run`, which holds a fair
//! async mutex for the whole unit of work (all attempts and the sleeps between
//! them). `tokio::sync::Mutex` grants the lock in request order, so units run
//! one at a time in submission order. A unit that fails or panics releases
//! its turn like any other.
//!
//! There is no priority, cancellation or timeout here. A unit that never
//! completes blocks every later one.

use std::future::Future;
use std::sync::{Arc, OnceLock};

use tokio::sync::Mutex;

/// FIFO queue allowing at most one unit of work in flight.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    slot: Arc<Mutex<()>>,
}

impl RequestQueue {
    /// A queue private to its clones. Useful for tests.
    pub fn new() -> Self {
        Self::default()
    }

    /// The queue shared by every client in the process.
    pub fn global() -> Self {
        static GLOBAL: OnceLock<RequestQueue> = OnceLock::new();
        GLOBAL.get_or_init(RequestQueue::new).clone()
    }

    /// Wait for this submission's turn, then run `work` to completion.
    pub async fn run<F, Fut, T>(&self, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _turn = self.slot.lock().await;
        work().await
    }

    pub fn same_queue(&self, other: &RequestQueue) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}
