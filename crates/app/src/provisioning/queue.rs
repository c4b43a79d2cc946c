//! In-process work queue and worker pool.

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use mockall::automock;
use tokio::{
    sync::{
        Mutex,
        mpsc::{self, Receiver, Sender, error::TrySendError},
    },
    task::JoinHandle,
};
use tracing::{Instrument, error, info, info_span, warn};

use crate::{
    ids::ProviderResourceId,
    provisioning::{CreateResourceEvent, ProvisioningError, QueueError},
};

/// Default number of jobs waiting for a worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default number of concurrent workers.
pub const DEFAULT_WORKERS: usize = 4;

/// One unit of background work.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Create {
        event: CreateResourceEvent,
        provider_resource_id: ProviderResourceId,
    },
    Delete {
        provider_resource_id: ProviderResourceId,
    },
}

impl Job {
    #[must_use]
    pub const fn kind(&self) -> JobKind {
        match self {
            Self::Create { .. } => JobKind::Create,
            Self::Delete { .. } => JobKind::Delete,
        }
    }

    #[must_use]
    pub fn provider_resource_id(&self) -> &ProviderResourceId {
        match self {
            Self::Create {
                provider_resource_id,
                ..
            }
            | Self::Delete {
                provider_resource_id,
            } => provider_resource_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Create,
    Delete,
}

impl JobKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobOutcome {
    Succeeded,
    Failed,
}

impl JobOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// What happened to one job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub kind: JobKind,
    pub provider_resource_id: ProviderResourceId,
    pub outcome: JobOutcome,
    pub elapsed: Duration,
}

#[automock]
#[async_trait]
/// Executes one job to completion.
pub trait JobRunner: Send + Sync {
    async fn run(&self, job: Job) -> Result<(), ProvisioningError>;
}

#[automock]
/// Receives the report of every finished job.
pub trait JobObserver: Send + Sync {
    fn job_finished(&self, report: &JobReport);
}

/// Producer handle of the work queue.
#[derive(Debug, Clone)]
pub struct WorkQueue {
    sender: Sender<Job>,
}

/// Consumer side of the work queue, handed to a [`WorkerPool`].
#[derive(Debug)]
pub struct JobReceiver {
    receiver: Receiver<Job>,
}

impl WorkQueue {
    /// Create a queue holding at most `capacity` waiting jobs.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, JobReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        (Self { sender }, JobReceiver { receiver })
    }

    /// Enqueue a job without waiting for a free slot.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] when every slot is taken and
    /// [`QueueError::Closed`] once the workers have stopped.
    pub fn submit(&self, job: Job) -> Result<(), QueueError> {
        self.sender.try_send(job).map_err(|error| match error {
            TrySendError::Full(job) => {
                warn!(
                    kind = %job.kind(),
                    provider_resource_id = %job.provider_resource_id(),
                    "work queue full; job rejected"
                );

                QueueError::Full
            }
            TrySendError::Closed(_) => QueueError::Closed,
        })
    }
}

impl JobReceiver {
    /// Wait for the next job. Returns `None` once every [`WorkQueue`] handle
    /// is dropped and nothing is left to run.
    pub async fn recv(&mut self) -> Option<Job> {
        self.receiver.recv().await
    }

    /// Take the next job if one is already waiting.
    pub fn try_recv(&mut self) -> Option<Job> {
        self.receiver.try_recv().ok()
    }
}

/// Fixed set of workers draining one [`WorkQueue`].
#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `workers` tasks that run queued jobs until every [`WorkQueue`]
    /// handle is dropped and the queue is empty.
    #[must_use]
    pub fn spawn(
        workers: usize,
        receiver: JobReceiver,
        runner: Arc<dyn JobRunner>,
        observer: Arc<dyn JobObserver>,
    ) -> Self {
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..workers.max(1))
            .map(|worker| {
                let receiver = Arc::clone(&receiver);
                let runner = Arc::clone(&runner);
                let observer = Arc::clone(&observer);

                tokio::spawn(async move {
                    loop {
                        let next = receiver.lock().await.recv().await;

                        let Some(job) = next else {
                            break;
                        };

                        run_job(worker, job, &runner, observer.as_ref()).await;
                    }
                })
            })
            .collect();

        Self { workers }
    }

    /// Wait for every worker to finish.
    pub async fn join(self) {
        for worker in self.workers {
            if let Err(error) = worker.await {
                error!("worker stopped abnormally: {error}");
            }
        }

        info!("work queue drained");
    }
}

async fn run_job(
    worker: usize,
    job: Job,
    runner: &Arc<dyn JobRunner>,
    observer: &dyn JobObserver,
) {
    let kind = job.kind();
    let provider_resource_id = job.provider_resource_id().clone();

    let span = info_span!(
        "job",
        worker,
        kind = %kind,
        provider_resource_id = %provider_resource_id
    );

    let started = Instant::now();

    // A panicking job only takes down its own task, never the worker.
    let runner = Arc::clone(runner);
    let task = tokio::spawn(async move { runner.run(job).await }.instrument(span.clone()));

    let outcome = match task.await {
        Ok(Ok(())) => {
            span.in_scope(|| info!("job succeeded"));

            JobOutcome::Succeeded
        }
        Ok(Err(error)) => {
            span.in_scope(|| error!("job failed: {error}"));

            JobOutcome::Failed
        }
        Err(error) => {
            span.in_scope(|| error!("job aborted: {error}"));

            JobOutcome::Failed
        }
    };

    observer.job_finished(&JobReport {
        kind,
        provider_resource_id,
        outcome,
        elapsed: started.elapsed(),
    });
}
