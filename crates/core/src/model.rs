use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{new_ulid, now_ms};

/// Opaque job identifier (ULID string by convention).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Allocates a fresh identifier. Called exactly once per job, at enqueue.
    pub fn new() -> Self {
        Self(new_ulid().to_string())
    }

    /// Borrows the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Runtime status for a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Enqueued, not yet picked up by a worker.
    Pending,
    /// Claimed by a worker and executing.
    Running,
    /// Finished normally; a result is attached.
    Succeeded,
    /// Finished with a fault; no result.
    Failed,
}

impl JobState {
    /// Succeeded and Failed have no outgoing transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Pending -> Running -> {Succeeded, Failed}. Nothing else.
    pub fn can_transition_to(self, next: JobState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Succeeded)
                | (Self::Running, Self::Failed)
        )
    }

    /// Stable lowercase name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of background work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    /// Assigned once at enqueue, never reused.
    pub id: JobId,
    /// The message handed to the worker.
    pub payload: String,
    /// Current lifecycle state.
    pub state: JobState,

    /// Present only when `state == Succeeded`.
    #[serde(default)]
    pub result: Option<String>,
    /// Failure reason, present only when `state == Failed`. Never exposed to
    /// HTTP callers.
    #[serde(default)]
    pub error: Option<String>,

    /// Enqueue time, unix epoch ms.
    pub created_ms: i64,
    /// Set when a worker claims the job.
    #[serde(default)]
    pub started_ms: Option<i64>,
    /// Set on the terminal write.
    #[serde(default)]
    pub finished_ms: Option<i64>,

    /// Worker that claimed the job.
    #[serde(default)]
    pub worker_id: Option<String>,
}

impl Job {
    /// A new Pending job with a freshly allocated id.
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            payload: payload.into(),
            state: JobState::Pending,
            result: None,
            error: None,
            created_ms: now_ms(),
            started_ms: None,
            finished_ms: None,
            worker_id: None,
        }
    }

    /// Caller-facing projection of the job state.
    pub fn status_view(&self) -> JobStatusView {
        JobStatusView::from(self)
    }
}

/// Terminal result of executing a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Normal completion with the handler's confirmation text.
    Succeeded(String),
    /// Fault during execution. The reason is kept for operators only.
    Failed(String),
}

impl JobOutcome {
    /// The terminal state this outcome moves a Running job into.
    pub fn state(&self) -> JobState {
        match self {
            Self::Succeeded(_) => JobState::Succeeded,
            Self::Failed(_) => JobState::Failed,
        }
    }
}

/// What a polling client is allowed to see about a job.
///
/// Pending and Running are deliberately indistinguishable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatusView {
    /// Pending or Running.
    InProgress,
    /// Succeeded, with the result text.
    Completed {
        /// Confirmation string produced by the worker.
        result: String,
    },
    /// Failed. No detail is exposed.
    Failed,
}

impl JobStatusView {
    /// Wire name of the status.
    pub fn status_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in progress",
            Self::Completed { .. } => "completed",
            Self::Failed => "failed",
        }
    }

    /// Result text, only for completed jobs.
    pub fn result(&self) -> Option<&str> {
        match self {
            Self::Completed { result } => Some(result),
            _ => None,
        }
    }
}

impl From<&Job> for JobStatusView {
    fn from(job: &Job) -> Self {
        match job.state {
            JobState::Pending | JobState::Running => Self::InProgress,
            JobState::Succeeded => Self::Completed {
                result: job.result.clone().unwrap_or_default(),
            },
            JobState::Failed => Self::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_are_monotonic() {
        use JobState::*;
        assert!(Pending.can_transition_to(Running));
        assert!(Running.can_transition_to(Succeeded));
        assert!(Running.can_transition_to(Failed));

        assert!(!Pending.can_transition_to(Succeeded));
        assert!(!Pending.can_transition_to(Failed));
        assert!(!Running.can_transition_to(Pending));
        for terminal in [Succeeded, Failed] {
            for next in [Pending, Running, Succeeded, Failed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn new_job_is_pending_with_fresh_id() {
        let a = Job::new("hello");
        let b = Job::new("hello");
        assert_eq!(a.state, JobState::Pending);
        assert!(!a.id.as_str().is_empty());
        assert_ne!(a.id, b.id);
        assert!(a.result.is_none());
    }

    #[test]
    fn status_view_hides_pending_vs_running() {
        let mut job = Job::new("m");
        assert_eq!(job.status_view(), JobStatusView::InProgress);
        job.state = JobState::Running;
        assert_eq!(job.status_view(), JobStatusView::InProgress);

        job.state = JobState::Succeeded;
        job.result = Some("done".into());
        assert_eq!(job.status_view().status_str(), "completed");
        assert_eq!(job.status_view().result(), Some("done"));

        job.state = JobState::Failed;
        assert_eq!(job.status_view(), JobStatusView::Failed);
        assert_eq!(job.status_view().result(), None);
    }
}
