//! Queued Alert Dispatch

use crate::classifier::AlertDecision;
use crate::sink::AlertSink;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Default number of alerts that may wait for the sink
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Hands alerting decisions to a sink on a background task.
///
/// `notify` never blocks the caller: when the queue is full the alert is
/// dropped and counted.
pub struct AlertDispatcher {
    tx: mpsc::Sender<AlertDecision>,
    worker: JoinHandle<usize>,
    dropped: AtomicUsize,
}

impl AlertDispatcher {
    /// Start the worker task. Must be called from within a tokio runtime.
    pub fn spawn(sink: Arc<dyn AlertSink>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<AlertDecision>(capacity.max(1));
        info!("Starting alert dispatcher (queue capacity {})", capacity.max(1));

        let worker = tokio::spawn(async move {
            let mut played = 0usize;
            while let Some(decision) = rx.recv().await {
                match sink.play(&decision) {
                    Ok(()) => {
                        played += 1;
                        metrics::counter!("crowd_watch_alerts_dispatched_total").increment(1);
                    }
                    Err(e) => error!("Alert sink failed: {}", e),
                }
            }
            debug!("Alert dispatcher drained after {} alerts", played);
            played
        });

        Self {
            tx,
            worker,
            dropped: AtomicUsize::new(0),
        }
    }

    /// Queue a decision for the sink if it calls for an alert.
    ///
    /// Returns whether the decision was queued.
    pub fn notify(&self, decision: &AlertDecision) -> bool {
        if !decision.should_alert {
            return false;
        }

        match self.tx.try_send(decision.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Alert dropped: dispatch queue is full");
                self.record_drop();
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Alert dropped: dispatcher has stopped");
                self.record_drop();
                false
            }
        }
    }

    /// Alerts dropped so far because the queue was full or closed
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("crowd_watch_alerts_dropped_total").increment(1);
    }

    /// Close the queue and wait for queued alerts to be played.
    ///
    /// Returns how many alerts the sink played successfully.
    pub async fn shutdown(self) -> usize {
        drop(self.tx);
        match self.worker.await {
            Ok(played) => played,
            Err(e) => {
                error!("Alert dispatcher task failed: {}", e);
                0
            }
        }
    }
}
