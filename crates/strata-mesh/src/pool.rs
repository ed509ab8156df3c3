//! Background chunk builds on a fixed pool of worker threads.
//!
//! Requests travel to workers as [`WorkerMessage`]s over a bounded channel
//! and results come back over an unbounded one, so workers never block on a
//! slow main thread. Each queued build has a cancellation flag; a worker
//! checks it before starting and again before replying.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use dashmap::DashMap;
use strata_cubesphere::ChunkKey;

use crate::error::{BuildPoolError, SubmitError};
use crate::protocol::WorkerMessage;
use crate::request::{BuildRequest, BuildResult};

/// A queued message and its cancellation flag.
struct Job {
    message: WorkerMessage,
    cancelled: Arc<AtomicBool>,
}

/// Run one job. Returns the reply, or `None` if the job was cancelled.
fn run_job(job: &Job) -> Option<WorkerMessage> {
    if job.cancelled.load(Ordering::Relaxed) {
        return None;
    }
    let reply = job.message.handle()?;
    if job.cancelled.load(Ordering::Relaxed) {
        return None;
    }
    Some(reply)
}

/// Worker thread count used when none is configured: all cores but two,
/// at least one.
#[must_use]
pub fn default_worker_count() -> usize {
    let cpus = num_cpus::get().max(2);
    (cpus - 2).max(1)
}

/// Fixed-size pool of chunk build workers.
pub struct BuildPool {
    task_sender: Option<Sender<Job>>,
    result_receiver: Receiver<WorkerMessage>,
    worker_handles: Vec<JoinHandle<()>>,
    /// Cancellation flag per queued or running build.
    active: Arc<DashMap<ChunkKey, Arc<AtomicBool>>>,
    in_flight: Arc<AtomicUsize>,
    budget: usize,
}

impl BuildPool {
    /// Spawn `worker_count` workers accepting at most `budget` builds in
    /// flight. A zero `worker_count` picks [`default_worker_count`].
    pub fn new(worker_count: usize, budget: usize) -> Result<Self, BuildPoolError> {
        let worker_count = if worker_count == 0 {
            default_worker_count()
        } else {
            worker_count
        };
        let budget = budget.max(1);
        let (task_tx, task_rx) = crossbeam_channel::bounded::<Job>(budget);
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<WorkerMessage>();
        let in_flight = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::with_capacity(worker_count);
        for index in 0..worker_count {
            let rx = task_rx.clone();
            let tx = result_tx.clone();
            let flight = Arc::clone(&in_flight);

            let handle = std::thread::Builder::new()
                .name(format!("strata-build-{index}"))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        match run_job(&job) {
                            Some(reply) => {
                                let _ = tx.send(reply);
                            }
                            None => tracing::trace!("skipped cancelled build"),
                        }
                        flight.fetch_sub(1, Ordering::Relaxed);
                    }
                })
                .map_err(|source| BuildPoolError::Spawn { index, source })?;
            handles.push(handle);
        }

        tracing::info!(workers = worker_count, budget, "build pool started");

        Ok(Self {
            task_sender: Some(task_tx),
            result_receiver: result_rx,
            worker_handles: handles,
            active: Arc::new(DashMap::new()),
            in_flight,
            budget,
        })
    }

    /// Queue a build. Never blocks.
    pub fn submit(&self, request: BuildRequest) -> Result<(), SubmitError> {
        let Some(sender) = &self.task_sender else {
            return Err(SubmitError::Disconnected);
        };
        let in_flight = self.in_flight.load(Ordering::Relaxed);
        if in_flight >= self.budget {
            return Err(SubmitError::Saturated { in_flight });
        }

        let key = request.key;
        let cancelled = Arc::new(AtomicBool::new(false));
        if let Some(previous) = self.active.insert(key, Arc::clone(&cancelled)) {
            previous.store(true, Ordering::Relaxed);
        }
        self.in_flight.fetch_add(1, Ordering::Relaxed);

        let job = Job {
            message: WorkerMessage::build(request),
            cancelled,
        };
        sender.try_send(job).map_err(|e| {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            self.active.remove(&key);
            match e {
                TrySendError::Full(_) => SubmitError::Saturated {
                    in_flight: self.in_flight.load(Ordering::Relaxed),
                },
                TrySendError::Disconnected(_) => SubmitError::Disconnected,
            }
        })
    }

    /// Cancel a queued or running build. No-op if it already finished.
    pub fn cancel(&self, key: &ChunkKey) {
        if let Some((_, cancelled)) = self.active.remove(key) {
            cancelled.store(true, Ordering::Relaxed);
        }
    }

    /// Cancel every outstanding build.
    pub fn cancel_all(&self) {
        for entry in self.active.iter() {
            entry.value().store(true, Ordering::Relaxed);
        }
        self.active.clear();
    }

    /// Collect every finished build. Call once per frame.
    pub fn drain_results(&self) -> Vec<BuildResult> {
        let mut results = Vec::new();
        while let Ok(message) = self.result_receiver.try_recv() {
            if let Some(result) = message.into_result() {
                self.active.remove(&result.key);
                results.push(result);
            }
        }
        results
    }

    /// Builds queued or running.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn is_pending(&self, key: &ChunkKey) -> bool {
        self.active.contains_key(key)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_handles.len()
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Close the queue and join every worker.
    pub fn shutdown(&mut self) {
        self.cancel_all();
        self.task_sender.take();
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for BuildPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
