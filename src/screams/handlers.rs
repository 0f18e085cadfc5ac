use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{NewScreamRequest, ScreamResponse},
    repo::{Like, Scream},
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ProviderError},
    notifications::repo::{Notification, NotificationKind},
    state::AppState,
    validators::is_empty,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/screams", get(list_screams))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/scream", post(post_scream))
        .route("/scream/:scream_id/like", post(like_scream))
        .route("/scream/:scream_id/unlike", post(unlike_scream))
}

fn internal(e: ProviderError) -> ApiError {
    error!(error = %e, "scream operation failed");
    ApiError::error(e)
}

/// GET /screams
#[instrument(skip(state))]
pub async fn list_screams(State(state): State<AppState>) -> Result<Json<Vec<Scream>>, ApiError> {
    let screams = state.store.list_screams().await.map_err(internal)?;
    Ok(Json(screams))
}

/// POST /scream
#[instrument(skip(state, user, payload), fields(handle = %user.handle))]
pub async fn post_scream(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<NewScreamRequest>,
) -> Result<(StatusCode, Json<ScreamResponse>), ApiError> {
    if is_empty(&payload.body) {
        return Err(ApiError::field("body", "Must not be empty"));
    }

    let scream = Scream {
        id: Uuid::new_v4(),
        user_handle: user.handle,
        body: payload.body,
        user_image: user.image_url,
        like_count: 0,
        created_at: OffsetDateTime::now_utc(),
    };
    state.store.create_scream(&scream).await.map_err(internal)?;

    info!(scream_id = %scream.id, "scream created");
    Ok((StatusCode::CREATED, Json(ScreamResponse { scream })))
}

async fn load_scream(state: &AppState, scream_id: Uuid) -> Result<Scream, ApiError> {
    state
        .store
        .get_scream(scream_id)
        .await
        .map_err(internal)?
        .ok_or(ApiError::NotFound("Scream not found"))
}

/// POST /scream/:scream_id/like
#[instrument(skip(state, user), fields(handle = %user.handle))]
pub async fn like_scream(
    State(state): State<AppState>,
    user: AuthUser,
    Path(scream_id): Path<Uuid>,
) -> Result<Json<ScreamResponse>, ApiError> {
    let scream = load_scream(&state, scream_id).await?;

    if state
        .store
        .find_like(&user.handle, scream_id)
        .await
        .map_err(internal)?
        .is_some()
    {
        warn!("scream already liked");
        return Err(ApiError::BadRequest("Scream already liked"));
    }

    let like = Like {
        id: Uuid::new_v4(),
        user_handle: user.handle.clone(),
        scream_id,
    };
    let notification = (scream.user_handle != user.handle).then(|| Notification {
        id: Uuid::new_v4(),
        recipient: scream.user_handle.clone(),
        sender: user.handle.clone(),
        kind: NotificationKind::Like,
        read: false,
        scream_id,
        created_at: OffsetDateTime::now_utc(),
    });

    let scream = state
        .store
        .add_like(&like, notification.as_ref())
        .await
        .map_err(internal)?;

    info!(%scream_id, like_count = scream.like_count, "scream liked");
    Ok(Json(ScreamResponse { scream }))
}

/// POST /scream/:scream_id/unlike
#[instrument(skip(state, user), fields(handle = %user.handle))]
pub async fn unlike_scream(
    State(state): State<AppState>,
    user: AuthUser,
    Path(scream_id): Path<Uuid>,
) -> Result<Json<ScreamResponse>, ApiError> {
    load_scream(&state, scream_id).await?;

    if state
        .store
        .find_like(&user.handle, scream_id)
        .await
        .map_err(internal)?
        .is_none()
    {
        warn!("scream not liked");
        return Err(ApiError::BadRequest("Scream not liked"));
    }

    let scream = state
        .store
        .remove_like(&user.handle, scream_id)
        .await
        .map_err(internal)?;

    info!(%scream_id, like_count = scream.like_count, "scream unliked");
    Ok(Json(ScreamResponse { scream }))
}
