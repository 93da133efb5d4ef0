//! Cancellable repeating background tasks.
//!
//! Each poller is a named thread running its tick immediately and then on a
//! fixed wall-clock interval. Ticks are fire-and-forget: a slow tick delays
//! only this poller's next run, nothing else. The returned handle is the
//! only way to stop a poller from outside; a tick can also stop its own
//! poller by returning [`PollOutcome::Stop`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Sleep in slices so a stop request takes effect promptly instead of
/// waiting out the full poll interval.
const SLEEP_SLICE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Continue,
    Stop,
}

pub struct PollerHandle {
    name: &'static str,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Ask the poller to stop without waiting for its thread. Safe to call
    /// from a UI frame; the thread may still be mid-request when this
    /// returns, but it will not tick again.
    pub fn signal_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Signal the poller to stop and wait for its thread to finish.
    /// Idempotent; safe to call after the poller stopped itself. Blocks
    /// through an in-flight tick, so only use this for explicit shutdown.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

// Dropping only signals: a handle may be dropped on the UI thread while the
// poller's tick sits in a slow request, and joining here would stall the
// frame until that request finishes. The thread winds down on its own.
impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.signal_stop();
    }
}

impl std::fmt::Debug for PollerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("PollerHandle")
            .field("name", &self.name)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Run `tick` now and then every `interval` until it returns
/// [`PollOutcome::Stop`] or the handle is stopped/dropped.
pub fn spawn_repeating<F>(name: &'static str, interval: Duration, mut tick: F) -> PollerHandle
where
    F: FnMut() -> PollOutcome + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();
    let thread = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            tracing::debug!(poller = name, "poller started");
            loop {
                if stop_flag.load(Ordering::SeqCst) {
                    break;
                }
                if tick() == PollOutcome::Stop {
                    stop_flag.store(true, Ordering::SeqCst);
                    break;
                }
                // Wall-clock wait, sliced for prompt cancellation.
                let deadline = Instant::now() + interval;
                while Instant::now() < deadline {
                    if stop_flag.load(Ordering::SeqCst) {
                        break;
                    }
                    thread::sleep(SLEEP_SLICE.min(deadline - Instant::now()));
                }
            }
            tracing::debug!(poller = name, "poller stopped");
        })
        .expect("could not spawn poller thread");

    PollerHandle {
        name,
        stop,
        thread: Some(thread),
    }
}
