use serde::{Deserialize, Serialize};

use crate::model::{JobId, JobStatusView};

/// Query string of `POST /notify/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyQuery {
    /// Recipient address. Missing and blank are both rejected.
    #[serde(default)]
    pub email: Option<String>,
}

/// Notify response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotifyResponse {
    /// Human-readable acknowledgement naming the recipient.
    pub message: String,
    /// Identifier to poll `/task_status/{task_id}` with.
    pub task_id: String,
}

/// Task status response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStatusResponse {
    /// Echo of the requested id.
    pub task_id: String,
    /// One of `completed`, `failed`, `in progress`.
    pub status: String,
    /// Worker confirmation, only when `completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl TaskStatusResponse {
    /// Builds the wire form of a status view.
    pub fn new(task_id: &JobId, view: &JobStatusView) -> Self {
        Self {
            task_id: task_id.to_string(),
            status: view.status_str().to_string(),
            result: view.result().map(str::to_string),
        }
    }
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// Always `OK`.
    pub message: String,
}

impl HealthResponse {
    /// The constant liveness answer.
    pub fn ok() -> Self {
        Self {
            message: "OK".to_string(),
        }
    }
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// What went wrong, without backend detail.
    pub error: String,
}
