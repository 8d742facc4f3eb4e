//! Trailing-edge debounce on the Tokio timer.
//!
//! Each [`Debounced`] owns one pending timer. A call aborts whatever is pending
//! and schedules the callback `delay` later with the newest arguments, so a burst
//! of calls collapses into one invocation. Firing is fire-and-forget: nothing is
//! returned to the caller and there is no flush.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

struct Inner<A> {
    callback: Box<dyn Fn(A) + Send + Sync>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    runtime: Handle,
}

/// A debounced wrapper around a callback taking `A`.
///
/// Clones share the same pending timer; separately created wrappers never
/// interfere with each other.
pub struct Debounced<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for Debounced<A> {
    fn clone(&self) -> Self {
        Debounced {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Wrap `callback` so it runs at most once per quiet period of `delay`.
///
/// # Panics
///
/// Panics when called outside a Tokio runtime, like `tokio::spawn`.
pub fn debounce<A, F>(callback: F, delay: Duration) -> Debounced<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debounced {
        inner: Arc::new(Inner {
            callback: Box::new(callback),
            delay,
            pending: Mutex::new(None),
            runtime: Handle::current(),
        }),
    }
}

impl<A: Send + 'static> Debounced<A> {
    /// Supersede any pending call and schedule `args` for `delay` from now.
    pub fn call(&self, args: A) {
        let mut pending = self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = pending.take() {
            if !previous.is_finished() {
                trace!("Debounce: superseding pending call");
            }
            previous.abort();
        }

        let inner = Arc::clone(&self.inner);
        *pending = Some(self.inner.runtime.spawn(async move {
            tokio::time::sleep(inner.delay).await;
            (inner.callback)(args);
        }));
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    /// Whether a call is scheduled and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, Instant};

    fn recorder() -> (Arc<Mutex<Vec<(String, Duration)>>>, Instant) {
        (Arc::new(Mutex::new(Vec::new())), Instant::now())
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once_with_last_args() {
        let (calls, start) = recorder();
        let sink = Arc::clone(&calls);
        let debounced = debounce(
            move |query: String| sink.lock().unwrap().push((query, start.elapsed())),
            Duration::from_millis(100),
        );

        debounced.call("first".to_string());
        sleep(Duration::from_millis(50)).await;
        debounced.call("second".to_string());
        sleep(Duration::from_millis(50)).await;
        debounced.call("third".to_string());

        sleep(Duration::from_millis(99)).await;
        assert!(calls.lock().unwrap().is_empty());
        assert!(debounced.is_pending());

        sleep(Duration::from_millis(2)).await;
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "third");
        assert!(calls[0].1 >= Duration::from_millis(200));
        assert!(calls[0].1 < Duration::from_millis(201));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_period_allows_second_invocation() {
        let (calls, start) = recorder();
        let sink = Arc::clone(&calls);
        let debounced = debounce(
            move |n: u32| sink.lock().unwrap().push((n.to_string(), start.elapsed())),
            Duration::from_millis(100),
        );

        debounced.call(1);
        sleep(Duration::from_millis(150)).await;
        debounced.call(2);
        sleep(Duration::from_millis(150)).await;

        let calls = calls.lock().unwrap();
        let args: Vec<&str> = calls.iter().map(|(a, _)| a.as_str()).collect();
        assert_eq!(args, vec!["1", "2"]);
        assert!(!debounced.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_wrappers_keep_their_own_timers() {
        let (calls, _) = recorder();
        let sink_a = Arc::clone(&calls);
        let sink_b = Arc::clone(&calls);
        let a = debounce(
            move |s: &'static str| sink_a.lock().unwrap().push((s.to_string(), Duration::ZERO)),
            Duration::from_millis(100),
        );
        let b = debounce(
            move |s: &'static str| sink_b.lock().unwrap().push((s.to_string(), Duration::ZERO)),
            Duration::from_millis(100),
        );

        a.call("a1");
        b.call("b1");
        sleep(Duration::from_millis(10)).await;
        a.call("a2");
        sleep(Duration::from_millis(200)).await;

        let mut args: Vec<String> = calls.lock().unwrap().iter().map(|(a, _)| a.clone()).collect();
        args.sort();
        assert_eq!(args, vec!["a2", "b1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_one_timer() {
        let (calls, _) = recorder();
        let sink = Arc::clone(&calls);
        let original = debounce(
            move |s: &'static str| sink.lock().unwrap().push((s.to_string(), Duration::ZERO)),
            Duration::from_millis(100),
        );
        let copy = original.clone();
        assert_eq!(copy.delay(), Duration::from_millis(100));

        original.call("from-original");
        copy.call("from-copy");
        sleep(Duration::from_millis(200)).await;

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "from-copy");
    }
}
