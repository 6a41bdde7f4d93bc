//! Single-slot trailing debounce timer.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Runs the most recently scheduled action once `delay` has passed without a
/// newer one. Scheduling again aborts the pending action; dropping the
/// debouncer aborts it too.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    slot: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, slot: None }
    }

    /// Cancel whatever is pending and arm `action` for `delay` from now.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        }));
    }

    /// Abort the pending action; returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.slot.take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.slot.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
