//! Expiry Sweep Task
//!
//! Background thread that periodically removes expired cache entries.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;

const THREAD_NAME: &str = "mini-cache-sweep";

/// Handle to a running sweep thread.
///
/// `stop` signals the thread and waits for it to exit, so no sweep runs
/// once it returns.
#[derive(Debug)]
pub struct SweepHandle {
    stop_tx: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl SweepHandle {
    /// Signals the thread to stop and joins it.
    pub fn stop(mut self) {
        self.shutdown();
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    fn shutdown(&mut self) {
        // A send error means the thread is already gone
        let _ = self.stop_tx.send(());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Expiry sweep thread panicked");
            }
        }
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawns a thread that runs `cleanup_expired` on `cache` every `interval`.
///
/// The thread waits on a stop channel with the interval as timeout, so a
/// stop request is seen immediately rather than after the next tick.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(Mutex::new(CacheStore::new(1000, EvictionPolicy::Lru)?));
/// let sweeper = spawn_sweep_task(cache.clone(), Duration::from_secs(10))?;
/// // Later, during shutdown:
/// sweeper.stop();
/// ```
pub fn spawn_sweep_task(
    cache: Arc<Mutex<CacheStore>>,
    interval: Duration,
) -> io::Result<SweepHandle> {
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    let thread = thread::Builder::new()
        .name(THREAD_NAME.into())
        .spawn(move || {
            info!(
                "Starting expiry sweep with interval of {} ms",
                interval.as_millis()
            );

            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }

                let removed = cache.lock().cleanup_expired();
                if removed.is_empty() {
                    debug!("Expiry sweep: no expired entries found");
                } else {
                    info!("Expiry sweep: removed {} expired entries", removed.len());
                }
            }

            info!("Expiry sweep stopped");
        })?;

    Ok(SweepHandle {
        stop_tx,
        thread: Some(thread),
    })
}
