//! Background geometry worker.
//!
//! Runs [`compute`] on a tokio task. Requests are immutable snapshots and
//! answers come back on a per-request oneshot channel, so the worker never
//! reads or writes the component store. The engine stays the single writer
//! and applies answers with `Engine::apply_transform_response`.

#[cfg(test)]
#[path = "worker_test.rs"]
mod worker_test;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::transform::{TransformRequest, TransformResponse, compute};

const DEFAULT_QUEUE_CAPACITY: usize = 64;

struct Job {
    request: TransformRequest,
    reply: oneshot::Sender<TransformResponse>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WorkerError {
    #[error("geometry worker has shut down")]
    Closed,
    #[error("geometry worker queue is full")]
    Full,
    #[error("geometry worker dropped the request without answering")]
    Dropped,
}

/// Cloneable handle to the worker task. The task exits once every handle is dropped.
#[derive(Debug, Clone)]
pub struct GeometryWorker {
    tx: mpsc::Sender<Job>,
}

impl GeometryWorker {
    /// Spawn the worker on the current tokio runtime.
    #[must_use]
    pub fn spawn() -> Self {
        Self::spawn_with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    #[must_use]
    pub fn spawn_with_capacity(queue_capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<Job>(queue_capacity.max(1));
        info!(queue_capacity, "geometry worker started");

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let gesture = job.request.gesture;
                let response = compute(&job.request);
                if job.reply.send(response).is_err() {
                    debug!(gesture, "transform requester went away before the answer");
                }
            }
            info!("geometry worker stopped");
        });

        Self { tx }
    }

    /// Submit a request and wait for its answer.
    pub async fn transform(&self, request: TransformRequest) -> Result<TransformResponse, WorkerError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job { request, reply })
            .await
            .map_err(|_| WorkerError::Closed)?;
        rx.await.map_err(|_| WorkerError::Dropped)
    }

    /// Enqueue without waiting; the answer arrives on the returned receiver.
    pub fn try_submit(&self, request: TransformRequest) -> Result<oneshot::Receiver<TransformResponse>, WorkerError> {
        let (reply, rx) = oneshot::channel();
        match self.tx.try_send(Job { request, reply }) {
            Ok(()) => Ok(rx),
            Err(mpsc::error::TrySendError::Full(job)) => {
                warn!(gesture = job.request.gesture, "geometry worker queue full; dropping request");
                Err(WorkerError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(WorkerError::Closed),
        }
    }
}
