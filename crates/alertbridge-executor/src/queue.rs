//! Unbounded FIFO of validated alerts.
//!
//! The intake side holds [`AlertSender`] clones and never blocks; the worker
//! owns the single [`AlertReceiver`].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alertbridge_core::Alert;
use alertbridge_telemetry::Metrics;
use tokio::sync::mpsc;

use crate::error::{ExecutorError, ExecutorResult};

/// Item carried by the queue.
#[derive(Debug, Clone)]
pub enum QueueItem {
    Alert(Alert),
    /// Poison item: the worker stops when it dequeues this.
    Shutdown,
}

/// Create a connected sender/receiver pair.
pub fn alert_queue() -> (AlertSender, AlertReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let depth = Arc::new(AtomicUsize::new(0));
    let control = tx.downgrade();
    (
        AlertSender {
            tx,
            depth: depth.clone(),
        },
        AlertReceiver { rx, depth, control },
    )
}

/// Producer handle. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AlertSender {
    tx: mpsc::UnboundedSender<QueueItem>,
    depth: Arc<AtomicUsize>,
}

impl AlertSender {
    /// Append an alert. Fails only once the receiver is gone.
    pub fn enqueue(&self, alert: Alert) -> ExecutorResult<()> {
        // Count before sending so the receiver never sees depth go negative.
        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        if self.tx.send(QueueItem::Alert(alert)).is_err() {
            self.depth.fetch_sub(1, Ordering::SeqCst);
            return Err(ExecutorError::QueueClosed);
        }
        Metrics::queue_depth_set(depth as i64);
        Ok(())
    }

    /// Append the poison item.
    pub fn shutdown(&self) -> ExecutorResult<()> {
        self.tx
            .send(QueueItem::Shutdown)
            .map_err(|_| ExecutorError::QueueClosed)
    }

    /// Alerts enqueued but not yet dequeued.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer handle, owned by the queue worker.
#[derive(Debug)]
pub struct AlertReceiver {
    rx: mpsc::UnboundedReceiver<QueueItem>,
    depth: Arc<AtomicUsize>,
    /// Does not keep the channel open.
    control: mpsc::WeakUnboundedSender<QueueItem>,
}

impl AlertReceiver {
    /// Wait for the next item. `None` once every sender is dropped and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<QueueItem> {
        let item = self.rx.recv().await?;
        if matches!(item, QueueItem::Alert(_)) {
            let depth = self.depth.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
            Metrics::queue_depth_set(depth as i64);
        }
        Some(item)
    }

    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    /// Weak sender for control items.
    pub(crate) fn control(&self) -> mpsc::WeakUnboundedSender<QueueItem> {
        self.control.clone()
    }

    /// Stop accepting new items; already queued items can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
