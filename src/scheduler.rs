//! Deferred notification scheduling.
//!
//! Mutators never invoke subscriber callbacks synchronously. Each internal
//! sync enqueues one [`FlushTask`] onto a channel that stands in for the end
//! of the current cooperative turn; the owner drains it with
//! [`ObservableMap::flush`](crate::ObservableMap::flush) once its own
//! synchronous work is done.
//!
//! Two task shapes carry the delivery semantics:
//! - [`FlushTask::Batch`] holds callbacks captured when the mutation
//!   happened; an unsubscribe after capture does not retract them.
//! - [`FlushTask::Channel`] is resolved against the live registry at flush
//!   time, so an unsubscribe before the flush suppresses delivery and a
//!   subscriber added in between is swept in.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::subscriptions::{Channel, Subscriber};

/// One scheduled delivery.
pub(crate) enum FlushTask {
    /// Callbacks captured at schedule time (per-item syncs).
    Batch(Vec<Subscriber>),
    /// A global channel, resolved at flush time (size/keys/filtered syncs).
    Channel(Channel),
}

/// The store's cooperative task queue.
pub(crate) struct Scheduler {
    tx: Sender<FlushTask>,
    rx: Receiver<FlushTask>,
    flushing: AtomicBool,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            flushing: AtomicBool::new(false),
        }
    }

    pub(crate) fn schedule(&self, task: FlushTask) {
        // The receiver lives as long as self; a failed send means teardown.
        let _ = self.tx.send(task);
    }

    pub(crate) fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Drain the tasks that were queued before this call began, invoking
    /// their callbacks. Tasks scheduled by those callbacks stay queued for
    /// the next turn. `resolve` maps a channel marker to its current
    /// subscribers.
    pub(crate) fn flush<F>(&self, mut resolve: F) -> Result<usize>
    where
        F: FnMut(Channel) -> Vec<Subscriber>,
    {
        if self.flushing.swap(true, Ordering::SeqCst) {
            return Err(StoreError::ReentrantFlush);
        }
        let _guard = FlushingGuard(&self.flushing);

        let turn = self.rx.len();
        let mut delivered = 0;
        for _ in 0..turn {
            let task = match self.rx.try_recv() {
                Ok(task) => task,
                Err(_) => break,
            };
            let batch = match task {
                FlushTask::Batch(batch) => batch,
                FlushTask::Channel(channel) => resolve(channel),
            };
            for callback in batch {
                callback();
                delivered += 1;
            }
        }

        debug!(tasks = turn, delivered, "flush turn complete");
        Ok(delivered)
    }
}

struct FlushingGuard<'a>(&'a AtomicBool);

impl Drop for FlushingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
