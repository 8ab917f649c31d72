//! Directory change debouncing
//!
//! Filesystem watchers deliver one event per change, which arrive in bursts
//! while files are copied or edited. `ChangeDebouncer` coalesces a burst into
//! a single settle callback fired after a quiet period with no new events.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

struct DebounceState {
    deadline: Option<Instant>,
    running: bool,
}

struct Inner {
    quiet: Duration,
    state: Mutex<DebounceState>,
    cond: Condvar,
}

/// Coalesces high-frequency change notifications into settle callbacks.
///
/// `notify()` may be called from any thread; every call restarts the quiet
/// period, so N notifications in rapid succession produce exactly one settle
/// callback, fired no earlier than the quiet period after the last call.
/// The callback runs on the debouncer's timer thread.
pub struct ChangeDebouncer {
    inner: Arc<Inner>,
    handle: Option<JoinHandle<()>>,
}

impl ChangeDebouncer {
    /// Create a debouncer with the given quiet period and settle callback
    pub fn new<F>(quiet: Duration, on_settled: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        let inner = Arc::new(Inner {
            quiet,
            state: Mutex::new(DebounceState {
                deadline: None,
                running: true,
            }),
            cond: Condvar::new(),
        });

        let timer_inner = inner.clone();
        let handle = std::thread::Builder::new()
            .name("change-debouncer".into())
            .spawn(move || Self::timer_loop(timer_inner, on_settled))
            .ok();

        Self { inner, handle }
    }

    /// Record a change notification, restarting the quiet period
    pub fn notify(&self) {
        {
            let mut state = self.inner.state.lock();
            state.deadline = Some(Instant::now() + self.inner.quiet);
        }
        self.inner.cond.notify_one();
    }

    fn timer_loop<F: Fn()>(inner: Arc<Inner>, on_settled: F) {
        let mut state = inner.state.lock();
        loop {
            if !state.running {
                return;
            }
            match state.deadline {
                None => {
                    inner.cond.wait(&mut state);
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        state.deadline = None;
                        drop(state);
                        on_settled();
                        state = inner.state.lock();
                    } else {
                        inner.cond.wait_for(&mut state, deadline - now);
                    }
                }
            }
        }
    }
}

impl Drop for ChangeDebouncer {
    fn drop(&mut self) {
        {
            let mut state = self.inner.state.lock();
            state.running = false;
        }
        self.inner.cond.notify_one();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_burst_settles_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let debouncer = ChangeDebouncer::new(Duration::from_millis(50), move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        for _ in 0..50 {
            debouncer.notify();
        }
        std::thread::sleep(Duration::from_millis(250));

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_settle_waits_full_quiet_period() {
        let (tx, rx) = std::sync::mpsc::channel();
        let debouncer = ChangeDebouncer::new(Duration::from_millis(150), move || {
            let _ = tx.send(Instant::now());
        });

        debouncer.notify();
        std::thread::sleep(Duration::from_millis(50));
        let last = Instant::now();
        debouncer.notify();

        let fired = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(fired.duration_since(last) >= Duration::from_millis(150));
    }

    #[test]
    fn test_separate_bursts_settle_separately() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let debouncer = ChangeDebouncer::new(Duration::from_millis(30), move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        debouncer.notify();
        std::thread::sleep(Duration::from_millis(120));
        debouncer.notify();
        std::thread::sleep(Duration::from_millis(120));

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_quiet_debouncer_never_fires() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let _debouncer = ChangeDebouncer::new(Duration::from_millis(10), move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
