//! Background key-state polling

use crate::key::VirtualKey;
use crate::tracker::{KeyEdge, KeySnapshot, KeyTracker};
use crate::HotKeyResult;
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Reports whether a key is physically held right now
pub trait KeyStateSource: Send + 'static {
    fn is_down(&self, key: VirtualKey) -> bool;

    fn snapshot(&self, keys: &[VirtualKey]) -> KeySnapshot {
        keys.iter().copied().filter(|&k| self.is_down(k)).collect()
    }
}

/// Polling thread feeding [`KeyEdge`]s to the UI thread
pub struct HotKeyPoller {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl HotKeyPoller {
    /// Spawn the poller.
    ///
    /// Edges go to `sender`; `notify` runs after each batch so the receiving
    /// thread can be woken (e.g. by posting a window message). The thread exits
    /// on [`stop`](Self::stop) or once the receiver is gone.
    pub fn start<S: KeyStateSource>(
        source: S,
        watched: Vec<VirtualKey>,
        sender: Sender<KeyEdge>,
        notify: impl Fn() + Send + 'static,
    ) -> HotKeyResult<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        tracing::debug!(?watched, "starting key poller");
        let handle = thread::Builder::new()
            .name("hotkey-poller".into())
            .spawn(move || {
                let mut tracker = KeyTracker::new(watched);

                while !stop_flag.load(Ordering::Relaxed) {
                    let snapshot = source.snapshot(tracker.watched());
                    let edges = tracker.update(&snapshot);

                    if !edges.is_empty() {
                        if edges.into_iter().any(|edge| sender.send(edge).is_err()) {
                            tracing::debug!("key event receiver dropped, stopping poller");
                            break;
                        }
                        notify();
                    }

                    thread::sleep(POLL_INTERVAL);
                }
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the thread and wait for it to exit
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("key poller thread panicked");
            }
        }
    }
}

impl Drop for HotKeyPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
