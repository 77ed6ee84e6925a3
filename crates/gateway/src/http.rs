use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use notify_core::api::{HealthResponse, NotifyQuery, NotifyResponse, TaskStatusResponse};
use notify_core::JobId;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::service::NotificationService;

#[derive(Clone)]
pub struct AppState {
    svc: NotificationService,
}

pub fn router(svc: NotificationService) -> Router {
    let state = AppState { svc };
    Router::new()
        .route("/notify/", post(notify))
        .route("/task_status/{task_id}", get(task_status))
        .route("/health/", get(health).post(health))
        .layer(TraceLayer::new_for_http())
        // Any origin, method and header; credentials allowed.
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn notify(
    State(st): State<AppState>,
    Query(q): Query<NotifyQuery>,
) -> Result<Json<NotifyResponse>, ApiError> {
    let email = q
        .email
        .ok_or_else(|| ApiError::validation("missing query parameter: email"))?;
    let handle = st.svc.submit_notification(&email).await?;
    Ok(Json(NotifyResponse {
        message: handle.message,
        task_id: handle.task_id.to_string(),
    }))
}

async fn task_status(
    State(st): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatusResponse>, ApiError> {
    let view = st.svc.get_job_status(&task_id).await?;
    Ok(Json(TaskStatusResponse::new(&JobId::from(task_id), &view)))
}

async fn health(State(st): State<AppState>) -> Json<HealthResponse> {
    Json(st.svc.health())
}
