//! Integration tests for the core crate.

use notify_core::api::{HealthResponse, NotifyQuery, TaskStatusResponse};
use notify_core::{Job, JobId, JobState, JobStatusView};

#[test]
fn test_job_state_serde() {
    let running = JobState::Running;
    let serialized = serde_json::to_string(&running).unwrap();
    assert_eq!(serialized, r#""running""#);
    let deserialized: JobState = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, running);
    assert_eq!(JobState::Succeeded.to_string(), "succeeded");
}

#[test]
fn test_job_id_is_transparent() {
    let id = JobId::from("01HZX");
    assert_eq!(serde_json::to_string(&id).unwrap(), r#""01HZX""#);
}

#[test]
fn test_status_response_omits_result_unless_completed() {
    let id = JobId::from("t1");

    let body = serde_json::to_value(TaskStatusResponse::new(&id, &JobStatusView::InProgress)).unwrap();
    assert_eq!(body, serde_json::json!({"task_id": "t1", "status": "in progress"}));

    let body = serde_json::to_value(TaskStatusResponse::new(&id, &JobStatusView::Failed)).unwrap();
    assert_eq!(body, serde_json::json!({"task_id": "t1", "status": "failed"}));

    let view = JobStatusView::Completed {
        result: "Task completed: hi".into(),
    };
    let body = serde_json::to_value(TaskStatusResponse::new(&id, &view)).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"task_id": "t1", "status": "completed", "result": "Task completed: hi"})
    );
}

#[test]
fn test_health_response_is_constant() {
    let body = serde_json::to_value(HealthResponse::ok()).unwrap();
    assert_eq!(body, serde_json::json!({"message": "OK"}));
}

#[test]
fn test_notify_query_email_is_optional() {
    let q: NotifyQuery = serde_json::from_str("{}").unwrap();
    assert!(q.email.is_none());
}

#[test]
fn test_job_serde() {
    let job = Job::new("payload");
    let serialized = serde_json::to_string(&job).unwrap();
    let deserialized: Job = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, job);
}
