//! Job queue + result store interface.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Job, JobId, JobOutcome, JobState};

/// Errors raised by a [`JobStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The broker could not be reached or refused the operation.
    #[error("job store unavailable: {0}")]
    Unavailable(String),
    /// No job with this id exists.
    #[error("job not found: {0}")]
    NotFound(JobId),
    /// The requested state change breaks the job lifecycle.
    #[error("job {id}: illegal transition {from} -> {to}")]
    InvalidTransition {
        /// Job the transition was requested for.
        id: JobId,
        /// State the job is in.
        from: JobState,
        /// State that was requested.
        to: JobState,
    },
}

impl StoreError {
    /// Wraps a backend error as `Unavailable`.
    pub fn unavailable<E: std::fmt::Display>(e: E) -> Self {
        Self::Unavailable(e.to_string())
    }
}

/// Queue and result store shared by the gateway and the workers.
///
/// The gateway only calls [`enqueue`](JobStore::enqueue) and
/// [`get`](JobStore::get); workers call [`claim_next`](JobStore::claim_next)
/// and [`finish`](JobStore::finish). Backends must make `claim_next`
/// atomic so that two workers never receive the same job.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Creates a Pending job carrying `payload` and returns it.
    async fn enqueue(&self, payload: String) -> Result<Job, StoreError>;

    /// Moves the oldest Pending job to Running on behalf of `worker_id`.
    /// Returns `None` when the queue is empty.
    async fn claim_next(&self, worker_id: &str) -> Result<Option<Job>, StoreError>;

    /// Moves a Running job to its terminal state.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown ids, `InvalidTransition` if the job is not
    /// Running (including when it is already terminal).
    async fn finish(&self, id: &JobId, outcome: JobOutcome) -> Result<Job, StoreError>;

    /// Looks a job up by id.
    async fn get(&self, id: &JobId) -> Result<Option<Job>, StoreError>;
}
