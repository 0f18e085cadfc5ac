use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use super::{
    dto::{
        AuthenticatedUserResponse, MessageResponse, NotificationView, UserDetailsRequest,
        UserDetailsResponse,
    },
    services::{is_allowed_image_type, replace_profile_image, ImageUpload, RECENT_NOTIFICATIONS},
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ProviderError},
    state::AppState,
    validators::reduce_user_details,
};

pub fn user_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/user", get(get_authenticated_user).post(add_user_details))
        .route("/user/:handle", get(get_user_details))
        .route(
            "/user/image",
            post(upload_image)
                .layer(DefaultBodyLimit::max(max_upload_bytes))
                .get(get_image_user_details),
        )
}

fn multipart_rejection(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %e, "image exceeds upload limit");
        return ApiError::PayloadTooLarge("file too large");
    }
    warn!(error = %e, "malformed multipart body");
    ApiError::BadRequest("malformed multipart body")
}

/// POST /user/image (multipart). The first part with a file name is the image.
#[instrument(skip(state, user, mp), fields(handle = %user.handle))]
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthUser,
    mut mp: Multipart,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut upload = None;
    while let Some(field) = mp.next_field().await.map_err(multipart_rejection)? {
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let content_type = field.content_type().unwrap_or_default().to_owned();
        if !is_allowed_image_type(&content_type) {
            warn!(%content_type, "rejected image type");
            return Err(ApiError::BadRequest("wrong file type"));
        }
        let body = field.bytes().await.map_err(multipart_rejection)?;
        upload = Some(ImageUpload {
            file_name,
            content_type,
            body,
        });
        break;
    }

    let upload = upload.ok_or(ApiError::BadRequest("no file uploaded"))?;
    replace_profile_image(&state, &user.handle, upload)
        .await
        .map_err(|e| {
            error!(error = %e, "image upload failed");
            ApiError::error(e)
        })?;

    Ok(Json(MessageResponse {
        message: "image uploaded successfully",
    }))
}

/// POST /user
#[instrument(skip(state, user, body), fields(handle = %user.handle))]
pub async fn add_user_details(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<UserDetailsRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let patch = reduce_user_details(&body);
    state
        .store
        .update_user(&user.handle, &patch)
        .await
        .map_err(|e| {
            error!(error = %e, "updating user details failed");
            ApiError::err(e)
        })?;

    info!("user details updated");
    Ok(Json(MessageResponse {
        message: "details added successfully",
    }))
}

/// GET /user
#[instrument(skip(state, user), fields(handle = %user.handle))]
pub async fn get_authenticated_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<AuthenticatedUserResponse>, ApiError> {
    let fail = |e: ProviderError| {
        error!(error = %e, "loading authenticated user failed");
        ApiError::error(e)
    };

    let credentials = state
        .store
        .get_user(&user.handle)
        .await
        .map_err(fail)?
        .ok_or(ApiError::NotFound("user not found"))?;
    let likes = state.store.likes_by_user(&user.handle).await.map_err(fail)?;
    let notifications = state
        .store
        .notifications_for(&user.handle, RECENT_NOTIFICATIONS)
        .await
        .map_err(fail)?;

    Ok(Json(AuthenticatedUserResponse {
        credentials,
        likes,
        notifications: notifications.into_iter().map(NotificationView::from).collect(),
    }))
}

/// GET /user/:handle
#[instrument(skip(state))]
pub async fn get_user_details(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<UserDetailsResponse>, ApiError> {
    let fail = |e: ProviderError| {
        error!(error = %e, "loading user details failed");
        ApiError::error(e)
    };

    let user = match state.store.get_user(&handle).await.map_err(fail)? {
        Some(u) => u,
        None => return Err(ApiError::NotFound("user not found")),
    };
    let screams = state.store.screams_by_user(&handle).await.map_err(fail)?;

    Ok(Json(UserDetailsResponse { user, screams }))
}

/// GET /user/image shares its path with the upload route; it is still the profile of `image`.
pub async fn get_image_user_details(
    state: State<AppState>,
) -> Result<Json<UserDetailsResponse>, ApiError> {
    get_user_details(state, Path("image".to_owned())).await
}
