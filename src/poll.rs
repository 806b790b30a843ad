// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Background acquisition loop for platform snapshot sources
//!
//! Platform queries can take long enough that hosts run them off the main
//! thread. [`SnapshotPoller`] owns that thread: it polls a [`SnapshotSource`]
//! at a fixed interval and delivers batches over a channel. The consumer
//! drains the channel from a single thread and applies the batches to its
//! splitter there, so the splitter itself never sees concurrent calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::snapshot::{QueryConfig, SnapshotBatch, SnapshotSource};

/// Drives a snapshot source on a background thread
pub struct SnapshotPoller {
    batch_rx: mpsc::Receiver<SnapshotBatch>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SnapshotPoller {
    /// Spawn the polling thread
    ///
    /// `config.refresh_interval` is the delay between cycles; `None` runs a
    /// single cycle and lets the thread finish. A cycle that fails is logged
    /// and dropped, matching the contract that corrupt frames are filtered
    /// before they reach the splitter.
    pub fn spawn<S>(mut source: S, config: QueryConfig) -> Self
    where
        S: SnapshotSource + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let thread_cancel = Arc::clone(&cancel);
        let (batch_tx, batch_rx) = mpsc::channel();
        let refresh_interval = config.refresh_interval;
        log::debug!("snapshot poller starting with {config:?}");

        let handle = thread::spawn(move || {
            while !thread_cancel.load(Ordering::Relaxed) {
                match source.poll() {
                    Ok(batch) => {
                        if !batch.is_empty() && batch_tx.send(batch).is_err() {
                            // Receiver dropped, nobody left to deliver to
                            break;
                        }
                    }
                    Err(err) => log::warn!("snapshot cycle failed, dropping frame: {err}"),
                }

                match refresh_interval {
                    Some(interval) => thread::sleep(interval),
                    None => break,
                }
            }
            log::debug!("snapshot poller finished");
        });

        Self {
            batch_rx,
            cancel,
            handle: Some(handle),
        }
    }

    /// Drain every batch delivered since the last call
    ///
    /// Non-blocking; intended to be called once per host refresh from the
    /// one thread that owns the splitter.
    pub fn poll_batches(&self) -> Vec<SnapshotBatch> {
        let mut batches = Vec::new();
        while let Ok(batch) = self.batch_rx.try_recv() {
            batches.push(batch);
        }
        batches
    }

    /// Check whether the polling thread is still running
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Cancel the loop and wait for the thread to finish
    ///
    /// Idempotent; also invoked on drop. The thread observes cancellation
    /// after at most one refresh interval.
    pub fn stop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("snapshot poller thread panicked");
            }
        }
    }
}

impl Drop for SnapshotPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
