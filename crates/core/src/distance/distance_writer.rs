//! Background writer that folds chair movement deltas into total distances.
//!
//! Location handlers enqueue deltas without waiting; a single worker task
//! collects them and flushes one coalesced upsert per interval. Flush failures
//! are logged and the batch is dropped, so totals may under-count after a
//! storage error.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::distance_model::ChairTotalDistanceDelta;
use super::distance_traits::DistanceRepositoryTrait;
use crate::constants::{DISTANCE_FLUSH_INTERVAL, DISTANCE_QUEUE_CAPACITY};

/// Tuning for the aggregation writer.
#[derive(Debug, Clone)]
pub struct DistanceWriterConfig {
    pub queue_capacity: usize,
    pub flush_interval: Duration,
}

impl Default for DistanceWriterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DISTANCE_QUEUE_CAPACITY,
            flush_interval: DISTANCE_FLUSH_INTERVAL,
        }
    }
}

/// Why a delta was not accepted. The delta is handed back to the caller.
#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("distance queue is full")]
    QueueFull(ChairTotalDistanceDelta),
    #[error("distance writer has stopped")]
    Closed(ChairTotalDistanceDelta),
}

impl EnqueueError {
    pub fn into_delta(self) -> ChairTotalDistanceDelta {
        match self {
            EnqueueError::QueueFull(delta) | EnqueueError::Closed(delta) => delta,
        }
    }
}

/// Handle to the running aggregation worker.
pub struct DistanceAggregationWriter {
    tx: mpsc::Sender<ChairTotalDistanceDelta>,
    shutdown_tx: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DistanceAggregationWriter {
    /// Spawns the worker on the current Tokio runtime.
    pub fn spawn(repository: Arc<dyn DistanceRepositoryTrait>, config: DistanceWriterConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = tokio::spawn(distance_writer_worker(
            rx,
            shutdown_rx,
            repository,
            config.flush_interval,
        ));

        Self {
            tx,
            shutdown_tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Submits a delta without waiting.
    pub fn enqueue(&self, delta: ChairTotalDistanceDelta) -> Result<(), EnqueueError> {
        self.tx.try_send(delta).map_err(|err| match err {
            mpsc::error::TrySendError::Full(delta) => EnqueueError::QueueFull(delta),
            mpsc::error::TrySendError::Closed(delta) => EnqueueError::Closed(delta),
        })
    }

    /// Submits a delta, waiting for queue space if necessary.
    pub async fn enqueue_wait(&self, delta: ChairTotalDistanceDelta) -> Result<(), EnqueueError> {
        self.tx
            .send(delta)
            .await
            .map_err(|mpsc::error::SendError(delta)| EnqueueError::Closed(delta))
    }

    /// Signals the worker to flush what it holds and stop, then waits for it.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        let worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(worker) = worker {
            if let Err(err) = worker.await {
                error!("Chair total distance writer ended abnormally: {}", err);
            }
        }
    }
}

/// Merges deltas for the same chair: distances are summed and the latest
/// timestamp wins. Output is ordered by chair id.
pub fn coalesce_deltas(deltas: Vec<ChairTotalDistanceDelta>) -> Vec<ChairTotalDistanceDelta> {
    let mut by_chair: BTreeMap<String, ChairTotalDistanceDelta> = BTreeMap::new();
    for delta in deltas {
        match by_chair.get_mut(&delta.chair_id) {
            Some(acc) => {
                acc.distance += delta.distance;
                if delta.updated_at > acc.updated_at {
                    acc.updated_at = delta.updated_at;
                }
            }
            None => {
                by_chair.insert(delta.chair_id.clone(), delta);
            }
        }
    }
    by_chair.into_values().collect()
}

async fn distance_writer_worker(
    mut rx: mpsc::Receiver<ChairTotalDistanceDelta>,
    mut shutdown_rx: watch::Receiver<bool>,
    repository: Arc<dyn DistanceRepositoryTrait>,
    flush_interval: Duration,
) {
    info!("Chair total distance writer started (flush every {:?})", flush_interval);

    let mut pending: Vec<ChairTotalDistanceDelta> = Vec::new();
    let mut ticker = tokio::time::interval(flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    while let Ok(delta) = rx.try_recv() {
                        pending.push(delta);
                    }
                    flush(&repository, std::mem::take(&mut pending)).await;
                    info!("Chair total distance writer shutting down");
                    return;
                }
            }

            _ = ticker.tick() => {
                flush(&repository, std::mem::take(&mut pending)).await;
            }

            delta = rx.recv() => {
                match delta {
                    Some(delta) => pending.push(delta),
                    None => {
                        flush(&repository, std::mem::take(&mut pending)).await;
                        info!("Chair total distance queue closed, writer shutting down");
                        return;
                    }
                }
            }
        }
    }
}

async fn flush(repository: &Arc<dyn DistanceRepositoryTrait>, pending: Vec<ChairTotalDistanceDelta>) {
    if pending.is_empty() {
        return;
    }

    let received = pending.len();
    let batch = coalesce_deltas(pending);
    let chairs = batch.len();

    match repository.upsert_chair_total_distances(batch).await {
        Ok(_) => debug!(
            "Flushed {} distance delta(s) for {} chair(s)",
            received, chairs
        ),
        Err(err) => {
            error!("Failed to update chair_total_distances: {}", err);
            warn!(
                "Dropped {} distance delta(s) for {} chair(s) after failed flush",
                received, chairs
            );
        }
    }
}
