use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::model::{Job, JobId, JobOutcome, JobState};
use crate::now_ms;
use crate::store::{JobStore, StoreError};

/// In-memory job store. Not durable; shared only within one process.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    jobs: HashMap<JobId, Job>,
    pending: VecDeque<JobId>,
}

impl InMemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs ever enqueued.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.jobs.len()
    }

    /// True when nothing has been enqueued yet.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn enqueue(&self, payload: String) -> Result<Job, StoreError> {
        let job = Job::new(payload);
        let mut inner = self.inner.lock().await;
        inner.pending.push_back(job.id.clone());
        inner.jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    async fn claim_next(&self, worker_id: &str) -> Result<Option<Job>, StoreError> {
        let mut inner = self.inner.lock().await;
        while let Some(id) = inner.pending.pop_front() {
            let Some(job) = inner.jobs.get_mut(&id) else {
                continue;
            };
            if job.state != JobState::Pending {
                continue;
            }
            job.state = JobState::Running;
            job.started_ms = Some(now_ms());
            job.worker_id = Some(worker_id.to_string());
            return Ok(Some(job.clone()));
        }
        Ok(None)
    }

    async fn finish(&self, id: &JobId, outcome: JobOutcome) -> Result<Job, StoreError> {
        let mut inner = self.inner.lock().await;
        let job = inner
            .jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let next = outcome.state();
        if !job.state.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                id: id.clone(),
                from: job.state,
                to: next,
            });
        }

        job.state = next;
        job.finished_ms = Some(now_ms());
        match outcome {
            JobOutcome::Succeeded(result) => job.result = Some(result),
            JobOutcome::Failed(reason) => job.error = Some(reason),
        }
        Ok(job.clone())
    }

    async fn get(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        Ok(self.inner.lock().await.jobs.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.is_empty().await);
        assert!(store.claim_next("w1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_enqueue_assigns_unique_ids() {
        let store = InMemoryStore::new();
        let a = store.enqueue("a".into()).await.unwrap();
        let b = store.enqueue("a".into()).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.state, JobState::Pending);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_claim_is_fifo_and_exclusive() {
        let store = InMemoryStore::new();
        let first = store.enqueue("first".into()).await.unwrap();
        let second = store.enqueue("second".into()).await.unwrap();

        let claimed = store.claim_next("w1").await.unwrap().unwrap();
        assert_eq!(claimed.id, first.id);
        assert_eq!(claimed.state, JobState::Running);
        assert_eq!(claimed.worker_id.as_deref(), Some("w1"));

        let claimed = store.claim_next("w2").await.unwrap().unwrap();
        assert_eq!(claimed.id, second.id);

        assert!(store.claim_next("w3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_finish_success_attaches_result() {
        let store = InMemoryStore::new();
        let job = store.enqueue("m".into()).await.unwrap();
        store.claim_next("w1").await.unwrap();

        let done = store
            .finish(&job.id, JobOutcome::Succeeded("ok".into()))
            .await
            .unwrap();
        assert_eq!(done.state, JobState::Succeeded);
        assert_eq!(done.result.as_deref(), Some("ok"));
        assert!(done.finished_ms.is_some());
    }

    #[tokio::test]
    async fn test_finish_requires_running() {
        let store = InMemoryStore::new();
        let job = store.enqueue("m".into()).await.unwrap();

        let err = store
            .finish(&job.id, JobOutcome::Failed("boom".into()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidTransition { from: JobState::Pending, .. }
        ));
    }

    #[tokio::test]
    async fn test_terminal_state_is_final() {
        let store = InMemoryStore::new();
        let job = store.enqueue("m".into()).await.unwrap();
        store.claim_next("w1").await.unwrap();
        store
            .finish(&job.id, JobOutcome::Failed("boom".into()))
            .await
            .unwrap();

        let err = store
            .finish(&job.id, JobOutcome::Succeeded("late".into()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidTransition { from: JobState::Failed, .. }
        ));

        let stored = store.get(&job.id).await.unwrap().unwrap();
        assert_eq!(stored.state, JobState::Failed);
        assert!(stored.result.is_none());
    }

    #[tokio::test]
    async fn test_finish_unknown_job() {
        let store = InMemoryStore::new();
        let err = store
            .finish(&JobId::from("nope"), JobOutcome::Succeeded("x".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.get(&JobId::from("nope")).await.unwrap().is_none());
    }
}
