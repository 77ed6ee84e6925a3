use std::sync::Arc;

use notify_core::api::HealthResponse;
use notify_core::{JobId, JobStatusView, JobStore};

use crate::error::ApiError;

/// Returned to the caller right after a job is enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub task_id: JobId,
    pub message: String,
}

/// Stateless facade over the job store.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn JobStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Enqueues one notification job for `recipient` and returns immediately.
    pub async fn submit_notification(&self, recipient: &str) -> Result<JobHandle, ApiError> {
        let recipient = recipient.trim();
        if recipient.is_empty() {
            return Err(ApiError::validation("email must not be empty"));
        }

        let job = self
            .store
            .enqueue(format!("Notification sent to {recipient}"))
            .await?;
        tracing::info!(job_id = %job.id, "notification job enqueued");

        Ok(JobHandle {
            task_id: job.id,
            message: format!("Email will be sent to {recipient}"),
        })
    }

    /// Unknown ids are reported as `NotFound` rather than "in progress".
    pub async fn get_job_status(&self, id: &str) -> Result<JobStatusView, ApiError> {
        let job_id = JobId::from(id);
        let job = self
            .store
            .get(&job_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        Ok(job.status_view())
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse::ok()
    }
}
