use axum::{extract::State, routing::post, Json, Router};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{auth::AuthUser, error::ApiError, state::AppState, users::dto::MessageResponse};

pub fn notification_routes() -> Router<AppState> {
    Router::new().route("/notifications", post(mark_notifications_read))
}

/// POST /notifications with a JSON array of notification ids.
#[instrument(skip(state, user, ids), fields(handle = %user.handle, count = ids.len()))]
pub async fn mark_notifications_read(
    State(state): State<AppState>,
    user: AuthUser,
    Json(ids): Json<Vec<Uuid>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .store
        .mark_notifications_read(&ids)
        .await
        .map_err(|e| {
            error!(error = %e, "marking notifications read failed");
            ApiError::error(e)
        })?;

    info!("notifications marked read");
    Ok(Json(MessageResponse {
        message: "Notification marked read",
    }))
}
