//! Background prefetching with pause/redirect/stop
//!
//! A dedicated worker continuously warms the caches for files relevant to
//! the current viewing context (the directory being browsed, its parent,
//! and its immediate subdirectories). The controlling thread retargets or
//! halts the worker through a gated, generation-counted context so a pass
//! never finishes stale work.

use crate::resolver::ThumbnailResolver;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

struct Context {
    directory: PathBuf,
    dimension: u32,
    generation: u64,
    gate_open: bool,
    running: bool,
}

struct Shared {
    ctx: Mutex<Context>,
    cond: Condvar,
}

/// Background thumbnail prefetcher.
///
/// The worker starts gated; call [`Prefetcher::run`] (or [`resume`]) to let
/// it work. `run` atomically retargets the context and bumps a generation
/// counter, so a worker mid-pass abandons its remaining items even when the
/// new `(directory, dimension)` happens to equal the old one.
///
/// Completed paths arrive on the completion queue; the consumer drains it
/// non-blockingly via [`Prefetcher::drain_completed`].
///
/// [`resume`]: Prefetcher::resume
pub struct Prefetcher {
    shared: Arc<Shared>,
    completions: Receiver<PathBuf>,
    handle: Option<JoinHandle<()>>,
}

impl Prefetcher {
    /// Spawn the worker thread for an initial context. The gate starts
    /// closed: no work happens until `run` or `resume` opens it.
    pub fn spawn(
        resolver: Arc<ThumbnailResolver>,
        directory: impl Into<PathBuf>,
        dimension: u32,
        idle_poll: Duration,
    ) -> Self {
        let shared = Arc::new(Shared {
            ctx: Mutex::new(Context {
                directory: directory.into(),
                dimension,
                generation: 0,
                gate_open: false,
                running: true,
            }),
            cond: Condvar::new(),
        });
        let (tx, rx) = crossbeam_channel::unbounded();

        let worker_shared = shared.clone();
        let handle = match std::thread::Builder::new()
            .name("thumbnail-prefetch".into())
            .spawn(move || worker_loop(worker_shared, resolver, tx, idle_poll))
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!("Failed to spawn prefetch worker: {}", e);
                None
            }
        };

        Self {
            shared,
            completions: rx,
            handle,
        }
    }

    /// Redirect the worker to a new context and open the gate.
    ///
    /// Linearizable with respect to the worker: context fields and the
    /// generation bump change under one lock, so the worker observes either
    /// the old pass (and abandons it at the next gate check) or the new one.
    pub fn run(&self, directory: impl Into<PathBuf>, dimension: u32) {
        {
            let mut ctx = self.shared.ctx.lock();
            ctx.directory = directory.into();
            ctx.dimension = dimension;
            ctx.generation += 1;
            ctx.gate_open = true;
        }
        self.shared.cond.notify_all();
    }

    /// Close the gate. The worker finishes its in-flight item, then blocks
    /// before the next one. Context is preserved.
    pub fn pause(&self) {
        self.shared.ctx.lock().gate_open = false;
    }

    /// Reopen the gate without changing context
    pub fn resume(&self) {
        self.shared.ctx.lock().gate_open = true;
        self.shared.cond.notify_all();
    }

    /// Drain every completed path currently queued, without blocking
    pub fn drain_completed(&self) -> Vec<PathBuf> {
        self.completions.try_iter().collect()
    }

    /// The completion queue receiver, for consumers that select on it
    pub fn completions(&self) -> &Receiver<PathBuf> {
        &self.completions
    }

    /// Stop the worker and join it. After this returns no background
    /// activity outlives the owning view.
    pub fn stop(&mut self) {
        {
            let mut ctx = self.shared.ctx.lock();
            ctx.running = false;
            ctx.gate_open = true;
        }
        self.shared.cond.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Prefetcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(
    shared: Arc<Shared>,
    resolver: Arc<ThumbnailResolver>,
    completions: Sender<PathBuf>,
    idle_poll: Duration,
) {
    loop {
        // Consistent snapshot for this pass
        let (generation, directory, dimension) = {
            let ctx = shared.ctx.lock();
            if !ctx.running {
                return;
            }
            (ctx.generation, ctx.directory.clone(), ctx.dimension)
        };

        tracing::debug!(
            "Prefetch pass over {} at {}px",
            directory.display(),
            dimension
        );

        let mut abandoned = false;
        for path in app_fs::relevant_files(&directory) {
            {
                let mut ctx = shared.ctx.lock();
                while ctx.running && !ctx.gate_open {
                    shared.cond.wait(&mut ctx);
                }
                if !ctx.running {
                    return;
                }
                if ctx.generation != generation {
                    // Context changed out from under us: abandon the pass
                    abandoned = true;
                    break;
                }
            }

            // A failure on one file never aborts the rest of the pass
            if resolver.resolve(&path, dimension).is_some() {
                let _ = completions.send(path);
            }
        }
        if abandoned {
            continue;
        }

        // Idle until redirected, stopped, or the poll interval elapses; the
        // timeout path re-scans so externally added files are discovered
        // even without a filesystem event.
        let mut ctx = shared.ctx.lock();
        while ctx.running && ctx.generation == generation {
            if shared.cond.wait_for(&mut ctx, idle_poll).timed_out() {
                break;
            }
        }
        if !ctx.running {
            return;
        }
    }
}
