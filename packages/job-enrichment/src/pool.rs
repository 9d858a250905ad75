//! Fixed-width worker pool with a full completion barrier.
//!
//! `width` tokio tasks pull jobs from one shared queue and push results onto
//! a channel. [`WorkerPool::run`] returns only after every worker has been
//! joined, so callers never see partial results. Results come back in
//! completion order, tagged with the index of the job that produced them.

use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A job whose handler panicked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("job panicked: {message}")]
pub struct JobPanicked {
    pub message: String,
}

/// Output of one job.
#[derive(Debug)]
pub struct Completed<R> {
    /// Position of the job in the input
    pub index: usize,
    pub result: Result<R, JobPanicked>,
}

/// Bounded pool of worker tasks.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    width: usize,
}

impl WorkerPool {
    /// Create a pool. A width of zero is treated as one.
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Run `handler` once per job on at most `width` concurrent tasks.
    ///
    /// A panicking handler is caught and reported for its own job only; the
    /// worker keeps draining the queue.
    pub async fn run<J, R, F, Fut>(&self, jobs: Vec<J>, handler: F) -> Vec<Completed<R>>
    where
        J: Send + 'static,
        R: Send + 'static,
        F: Fn(J) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
    {
        let total = jobs.len();
        if total == 0 {
            return Vec::new();
        }

        let queue: Arc<Mutex<VecDeque<(usize, J)>>> =
            Arc::new(Mutex::new(jobs.into_iter().enumerate().collect()));
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();
        let handler = Arc::new(handler);
        let workers = self.width.min(total);

        debug!(jobs = total, workers = workers, "Starting worker pool");

        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let queue = queue.clone();
                let result_tx = result_tx.clone();
                let handler = handler.clone();

                tokio::spawn(async move {
                    loop {
                        let next = queue
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .pop_front();
                        let Some((index, job)) = next else {
                            break;
                        };

                        let result = AssertUnwindSafe((*handler)(job))
                            .catch_unwind()
                            .await
                            .map_err(|payload| JobPanicked {
                                message: panic_message(payload.as_ref()),
                            });

                        if let Err(e) = &result {
                            warn!(worker = worker, job = index, error = %e, "Worker job panicked");
                        }

                        if result_tx.send(Completed { index, result }).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();

        // Only workers hold senders from here on, so the channel closes once
        // they have all exited.
        drop(result_tx);

        for joined in join_all(handles).await {
            if let Err(e) = joined {
                warn!(error = %e, "Worker task ended abnormally");
            }
        }

        let mut completed = Vec::with_capacity(total);
        while let Some(done) = result_rx.recv().await {
            completed.push(done);
        }
        completed
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
