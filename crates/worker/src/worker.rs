use std::sync::Arc;
use std::time::Duration;

use notify_core::{Job, JobId, JobOutcome, JobStore, StoreError};
use tokio::sync::watch;

use crate::task::JobHandler;

const FINISH_BACKOFF_START: Duration = Duration::from_millis(50);
const FINISH_BACKOFF_MAX: Duration = Duration::from_secs(5);

/// Long-lived consumer: claims one job at a time and records its outcome.
pub struct Worker {
    id: String,
    store: Arc<dyn JobStore>,
    handler: Arc<dyn JobHandler>,
    poll_interval: Duration,
}

impl Worker {
    pub fn new(
        id: impl Into<String>,
        store: Arc<dyn JobStore>,
        handler: Arc<dyn JobHandler>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            store,
            handler,
            poll_interval,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Claims and executes at most one job.
    ///
    /// Returns the job in its terminal state, or `None` if the queue was
    /// empty. Job faults never surface here. Store errors while claiming are
    /// returned; once a job has run, its outcome is written until it sticks.
    pub async fn run_once(&self) -> Result<Option<Job>, StoreError> {
        let Some(job) = self.store.claim_next(&self.id).await? else {
            return Ok(None);
        };
        tracing::info!(job_id = %job.id, worker_id = %self.id, "claimed job");

        let outcome = self.execute(&job).await;
        match &outcome {
            JobOutcome::Succeeded(_) => tracing::info!(job_id = %job.id, "job succeeded"),
            JobOutcome::Failed(reason) => {
                tracing::warn!(job_id = %job.id, reason = %reason, "job failed")
            }
        }

        let done = self.record_outcome(&job.id, outcome).await?;
        Ok(Some(done))
    }

    /// Writes the terminal outcome, retrying transient store faults with
    /// exponential backoff. A job that is already terminal counts as written.
    async fn record_outcome(&self, id: &JobId, outcome: JobOutcome) -> Result<Job, StoreError> {
        let mut backoff = FINISH_BACKOFF_START;
        loop {
            match self.store.finish(id, outcome.clone()).await {
                Ok(job) => return Ok(job),
                Err(StoreError::InvalidTransition { from, .. }) if from.is_terminal() => {
                    // An earlier attempt landed even though its reply was lost.
                    if let Some(job) = self.store.get(id).await? {
                        return Ok(job);
                    }
                    return Err(StoreError::NotFound(id.clone()));
                }
                Err(e @ (StoreError::NotFound(_) | StoreError::InvalidTransition { .. })) => {
                    return Err(e)
                }
                Err(e) => {
                    tracing::warn!(
                        job_id = %id,
                        error = %e,
                        retry_in_ms = backoff.as_millis() as u64,
                        "failed to record job outcome; retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(FINISH_BACKOFF_MAX);
                }
            }
        }
    }

    /// Runs the handler on its own task so a panic is contained to this job.
    async fn execute(&self, job: &Job) -> JobOutcome {
        let handler = Arc::clone(&self.handler);
        let payload = job.payload.clone();
        match tokio::spawn(async move { handler.handle(&payload).await }).await {
            Ok(Ok(result)) => JobOutcome::Succeeded(result),
            Ok(Err(e)) => JobOutcome::Failed(e.to_string()),
            Err(e) if e.is_panic() => JobOutcome::Failed("job panicked".to_string()),
            Err(e) => JobOutcome::Failed(e.to_string()),
        }
    }

    /// Consumes jobs until `shutdown` flips to true or its sender is dropped.
    ///
    /// A job that is already executing is finished before the loop exits.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(worker_id = %self.id, "worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            match self.run_once().await {
                Ok(Some(_)) => continue,
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "job store error; backing off"),
            }

            let closed = tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => false,
                res = shutdown.changed() => res.is_err(),
            };
            if closed {
                break;
            }
        }
        tracing::info!(worker_id = %self.id, "worker stopped");
    }
}
