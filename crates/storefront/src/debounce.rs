//! Trailing-edge debounce for async handlers.
//!
//! A burst of [`Debouncer::call`]s spaced closer than the delay collapses
//! into one handler invocation, `delay` after the last call, with the last
//! call's argument. Only the pending timer is cancelled by a newer call:
//! once the delay has elapsed the handler runs on its own task and is
//! never aborted.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Debounced wrapper around an async handler.
///
/// Must be used from within a tokio runtime.
pub struct Debouncer<T> {
    delay: Duration,
    handler: Arc<dyn Fn(T) -> BoxFuture + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Debouncer<T> {
    /// Wrap `handler` so that it runs at most once per quiet period of
    /// `delay`.
    pub fn new<F, Fut>(delay: Duration, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            delay,
            handler: Arc::new(move |arg: T| -> BoxFuture { Box::pin(handler(arg)) }),
            pending: Mutex::new(None),
        }
    }

    /// Schedule the handler with `arg`, replacing any pending invocation.
    ///
    /// Fire-and-forget: the handler's completion is not observable here.
    pub fn call(&self, arg: T) {
        let delay = self.delay;
        let handler = Arc::clone(&self.handler);

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detach so a later call cannot abort a handler that already started
            tokio::spawn(handler(arg));
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(timer);

        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Drop the pending invocation, if any.
    pub fn cancel(&self) {
        if let Some(pending) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pending.abort();
        }
    }
}

impl<T> Debouncer<T> {
    /// Whether an invocation is scheduled and its delay has not elapsed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(pending) = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pending.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::{Instant, sleep};

    use super::*;

    type Calls = Arc<Mutex<Vec<(String, Instant)>>>;

    fn recording_debouncer(delay: Duration) -> (Debouncer<String>, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let debouncer = Debouncer::new(delay, move |text: String| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push((text, Instant::now()));
            }
        });
        (debouncer, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_call_runs_once_after_delay() {
        let delay = Duration::from_millis(500);
        let (debouncer, calls) = recording_debouncer(delay);
        let start = Instant::now();

        debouncer.call("shoes".to_string());
        assert!(debouncer.is_pending());

        sleep(delay * 2).await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "shoes");
        assert!(calls[0].1 - start >= delay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_argument() {
        let delay = Duration::from_millis(500);
        let (debouncer, calls) = recording_debouncer(delay);

        let mut last_call = Instant::now();
        for text in ["s", "sh", "sho", "shoe", "shoes"] {
            debouncer.call(text.to_string());
            last_call = Instant::now();
            sleep(Duration::from_millis(100)).await;
        }

        sleep(delay * 2).await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "shoes");
        assert!(calls[0].1 - last_call >= delay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_separated_by_quiet_period_each_run() {
        let delay = Duration::from_millis(200);
        let (debouncer, calls) = recording_debouncer(delay);

        debouncer.call("first".to_string());
        sleep(delay * 2).await;
        debouncer.call("second".to_string());
        sleep(delay * 2).await;

        let texts: Vec<_> = calls.lock().unwrap().iter().map(|c| c.0.clone()).collect();
        assert_eq!(texts, ["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_call() {
        let delay = Duration::from_millis(200);
        let (debouncer, calls) = recording_debouncer(delay);

        debouncer.call("never".to_string());
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        sleep(delay * 2).await;
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_call_does_not_abort_running_handler() {
        let delay = Duration::from_millis(100);
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&finished);

        // Handler that takes longer than the debounce window
        let debouncer = Debouncer::new(delay, move |_: u32| {
            let counter = Arc::clone(&counter);
            async move {
                sleep(Duration::from_millis(1_000)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        debouncer.call(1);
        sleep(delay + Duration::from_millis(10)).await;
        // First handler is now in flight; this only replaces the timer
        debouncer.call(2);

        sleep(Duration::from_millis(3_000)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_call() {
        let delay = Duration::from_millis(200);
        let (debouncer, calls) = recording_debouncer(delay);

        debouncer.call("dropped".to_string());
        drop(debouncer);

        sleep(delay * 2).await;
        assert!(calls.lock().unwrap().is_empty());
    }
}
