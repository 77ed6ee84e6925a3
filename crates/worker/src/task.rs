use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::append_log::AppendLog;

/// Faults raised by a job body. Every variant ends the job as Failed.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The durable write of the job's record failed.
    #[error("durable write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Handler(String),
}

/// The body executed for each claimed job.
#[async_trait]
pub trait JobHandler: Send + Sync + 'static {
    /// Runs the job and returns its confirmation text.
    async fn handle(&self, payload: &str) -> Result<String, TaskError>;
}

/// Simulated slow notification send: wait, record the message, confirm.
pub struct NotificationTask {
    delay: Duration,
    log: AppendLog,
}

impl NotificationTask {
    pub fn new(delay: Duration, log: AppendLog) -> Self {
        Self { delay, log }
    }
}

#[async_trait]
impl JobHandler for NotificationTask {
    async fn handle(&self, payload: &str) -> Result<String, TaskError> {
        tokio::time::sleep(self.delay).await;
        self.log.append_line(payload).await?;
        Ok(format!("Task completed: {payload}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notification_task_records_and_confirms() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifications.log");
        let task = NotificationTask::new(Duration::ZERO, AppendLog::new(&path));

        let out = task
            .handle("Notification sent to alice@example.com")
            .await
            .unwrap();
        assert_eq!(out, "Task completed: Notification sent to alice@example.com");
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Notification sent to alice@example.com\n"
        );
    }

    #[tokio::test]
    async fn test_write_fault_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let task = NotificationTask::new(
            Duration::ZERO,
            AppendLog::new(dir.path().join("missing").join("n.log")),
        );
        let err = task.handle("m").await.unwrap_err();
        assert!(matches!(err, TaskError::Io(_)));
    }
}
