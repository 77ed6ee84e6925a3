use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::{connect, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;

use crate::config::BrokerConfig;
use crate::model::{Job, JobId, JobOutcome, JobState};
use crate::now_ms;
use crate::store::{JobStore, StoreError};

const TABLE: &str = "job";

/// Job store backed by SurrealDB.
///
/// The engine is picked from the endpoint scheme, so the same code talks to
/// a shared broker (`ws://`), an embedded file store (`surrealkv://`) or a
/// process-local one (`mem://`).
#[derive(Clone)]
pub struct SurrealStore {
    inner: Surreal<Any>,
}

/// Row layout of the `job` table. The record key is the job id; `job_id`
/// repeats it as a plain string so rows decode without the record-id type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JobRecord {
    job_id: String,
    payload: String,
    state: JobState,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    error: Option<String>,
    created_ms: i64,
    #[serde(default)]
    started_ms: Option<i64>,
    #[serde(default)]
    finished_ms: Option<i64>,
    #[serde(default)]
    worker_id: Option<String>,
}

impl From<&Job> for JobRecord {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id.0.clone(),
            payload: job.payload.clone(),
            state: job.state,
            result: job.result.clone(),
            error: job.error.clone(),
            created_ms: job.created_ms,
            started_ms: job.started_ms,
            finished_ms: job.finished_ms,
            worker_id: job.worker_id.clone(),
        }
    }
}

impl From<JobRecord> for Job {
    fn from(rec: JobRecord) -> Self {
        Self {
            id: JobId(rec.job_id),
            payload: rec.payload,
            state: rec.state,
            result: rec.result,
            error: rec.error,
            created_ms: rec.created_ms,
            started_ms: rec.started_ms,
            finished_ms: rec.finished_ms,
            worker_id: rec.worker_id,
        }
    }
}

/// Claim rounds before reporting an empty queue under heavy contention.
const CLAIM_ROUNDS: usize = 4;

/// SurrealDB reports optimistic-transaction clashes as retryable errors.
fn is_conflict(e: &surrealdb::Error) -> bool {
    let msg = e.to_string();
    msg.contains("read or write conflict") || msg.contains("can be retried")
}

impl SurrealStore {
    /// Connects to the broker named by `cfg` and applies the schema.
    pub async fn connect(cfg: &BrokerConfig) -> Result<Self, StoreError> {
        let inner = connect(cfg.url.as_str())
            .await
            .map_err(StoreError::unavailable)?;

        if let Some((username, password)) = cfg.credentials() {
            inner
                .signin(Root { username, password })
                .await
                .map_err(StoreError::unavailable)?;
        }

        inner
            .use_ns(cfg.namespace.clone())
            .use_db(cfg.database.clone())
            .await
            .map_err(StoreError::unavailable)?;

        let store = Self { inner };
        store.apply_schema().await?;
        tracing::debug!(url = %cfg.url, ns = %cfg.namespace, db = %cfg.database, "job store connected");
        Ok(store)
    }

    async fn pending_candidates(&self) -> Result<Vec<JobRecord>, surrealdb::Error> {
        let q_select = r#"
            SELECT * FROM job
            WHERE state = 'pending'
            ORDER BY created_ms ASC, job_id ASC
            LIMIT 10;
        "#;
        self.inner.query(q_select).await?.take(0)
    }

    async fn try_claim(
        &self,
        job_id: &str,
        worker_id: &str,
    ) -> Result<Option<Job>, surrealdb::Error> {
        let q_claim = r#"
            UPDATE type::thing('job', $id)
            SET state = 'running',
                started_ms = $now,
                worker_id = $worker
            WHERE state = 'pending'
            RETURN AFTER;
        "#;
        let updated: Vec<JobRecord> = self
            .inner
            .query(q_claim)
            .bind(("id", job_id.to_string()))
            .bind(("now", now_ms()))
            .bind(("worker", worker_id.to_string()))
            .await?
            .take(0)?;
        Ok(updated.into_iter().next().map(Job::from))
    }

    async fn apply_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("../schema.surql");
        self.inner
            .query(schema)
            .await
            .map_err(StoreError::unavailable)?
            .check()
            .map_err(StoreError::unavailable)?;
        Ok(())
    }
}

#[async_trait]
impl JobStore for SurrealStore {
    async fn enqueue(&self, payload: String) -> Result<Job, StoreError> {
        let job = Job::new(payload);
        let created: Option<JobRecord> = self
            .inner
            .create((TABLE, job.id.0.clone()))
            .content(JobRecord::from(&job))
            .await
            .map_err(StoreError::unavailable)?;
        if created.is_none() {
            return Err(StoreError::Unavailable("create returned no record".into()));
        }
        Ok(job)
    }

    async fn claim_next(&self, worker_id: &str) -> Result<Option<Job>, StoreError> {
        // Pick a few candidates, then claim with a conditional update. The
        // `WHERE state = 'pending'` guard keeps concurrent workers from
        // claiming the same row; a write conflict means another worker got
        // there first.
        for _ in 0..CLAIM_ROUNDS {
            let candidates = match self.pending_candidates().await {
                Ok(c) => c,
                Err(e) if is_conflict(&e) => continue,
                Err(e) => return Err(StoreError::unavailable(e)),
            };
            if candidates.is_empty() {
                return Ok(None);
            }

            for candidate in candidates {
                match self.try_claim(&candidate.job_id, worker_id).await {
                    Ok(Some(job)) => return Ok(Some(job)),
                    Ok(None) => {}
                    Err(e) if is_conflict(&e) => {
                        tracing::debug!(job_id = %candidate.job_id, "claim lost to a concurrent worker");
                    }
                    Err(e) => return Err(StoreError::unavailable(e)),
                }
            }
        }
        Ok(None)
    }

    async fn finish(&self, id: &JobId, outcome: JobOutcome) -> Result<Job, StoreError> {
        let next = outcome.state();
        let (result, error) = match outcome {
            JobOutcome::Succeeded(result) => (Some(result), None),
            JobOutcome::Failed(reason) => (None, Some(reason)),
        };

        let q_finish = r#"
            UPDATE type::thing('job', $id)
            SET state = $state,
                result = $result,
                error = $error,
                finished_ms = $now
            WHERE state = 'running'
            RETURN AFTER;
        "#;
        let mut resp = self
            .inner
            .query(q_finish)
            .bind(("id", id.0.clone()))
            .bind(("state", next))
            .bind(("result", result))
            .bind(("error", error))
            .bind(("now", now_ms()))
            .await
            .map_err(StoreError::unavailable)?;
        let updated: Vec<JobRecord> = resp.take(0).map_err(StoreError::unavailable)?;
        if let Some(rec) = updated.into_iter().next() {
            return Ok(rec.into());
        }

        match self.get(id).await? {
            None => Err(StoreError::NotFound(id.clone())),
            Some(job) => Err(StoreError::InvalidTransition {
                id: id.clone(),
                from: job.state,
                to: next,
            }),
        }
    }

    async fn get(&self, id: &JobId) -> Result<Option<Job>, StoreError> {
        let rec: Option<JobRecord> = self
            .inner
            .select((TABLE, id.0.clone()))
            .await
            .map_err(StoreError::unavailable)?;
        Ok(rec.map(Job::from))
    }
}
