use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, SignupRequest, TokenResponse},
        jwt::JwtKeys,
    },
    error::{ApiError, ProviderError},
    state::AppState,
    users::{repo::UserDoc, services::BLANK_IMAGE},
    validators::{validate_login, validate_signup},
};

const GENERIC_FAILURE: &str = "Something went wrong, please try again";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let errors = validate_signup(&payload);
    if !errors.is_empty() {
        warn!(?errors, "signup rejected");
        return Err(ApiError::Fields(errors));
    }
    let handle = payload.handle.trim().to_string();

    let internal = |e: ProviderError| {
        error!(error = %e, code = e.code(), "signup failed");
        ApiError::General(GENERIC_FAILURE)
    };

    if state.store.get_user(&handle).await.map_err(internal)?.is_some() {
        warn!("handle already taken");
        return Err(ApiError::field("handle", "This handle is already taken"));
    }

    let account_id = match state.auth.create_account(&payload.email, &payload.password).await {
        Ok(id) => id,
        Err(ProviderError::EmailAlreadyInUse) => {
            warn!("email already registered");
            return Err(ApiError::field("email", "Email is already in use"));
        }
        Err(e) => return Err(internal(e)),
    };

    let registered = async {
        let token = JwtKeys::from_ref(&state).sign(account_id)?;
        let user = UserDoc {
            handle: handle.clone(),
            user_id: account_id,
            email: payload.email.trim().to_string(),
            created_at: OffsetDateTime::now_utc(),
            image_url: state.config.storage.public_url(BLANK_IMAGE),
            bio: None,
            website: None,
            location: None,
        };
        // A concurrent signup may have claimed the handle since the pre-check.
        let created = state.store.create_user(&user).await?;
        Ok::<_, ProviderError>(created.then_some(token))
    }
    .await;

    match registered {
        Ok(Some(token)) => {
            info!(%account_id, "user registered");
            Ok((StatusCode::CREATED, Json(TokenResponse { token })))
        }
        Ok(None) => {
            warn!("handle claimed concurrently");
            discard_account(&state, account_id).await;
            Err(ApiError::field("handle", "This handle is already taken"))
        }
        Err(e) => {
            discard_account(&state, account_id).await;
            Err(internal(e))
        }
    }
}

async fn discard_account(state: &AppState, account_id: Uuid) {
    if let Err(e) = state.auth.delete_account(account_id).await {
        error!(error = %e, %account_id, "orphaned account cleanup failed");
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let errors = validate_login(&payload);
    if !errors.is_empty() {
        return Err(ApiError::Fields(errors));
    }

    let account_id = match state.auth.sign_in(&payload.email, &payload.password).await {
        Ok(id) => id,
        Err(ProviderError::WrongPassword) => {
            warn!("login with wrong password");
            return Err(ApiError::Forbidden("Wrong credentials, please try again"));
        }
        Err(e) => {
            error!(error = %e, code = e.code(), "sign in failed");
            return Err(ApiError::Raw(e));
        }
    };

    let token = JwtKeys::from_ref(&state).sign(account_id).map_err(|e| {
        error!(error = %e, "identity token signing failed");
        ApiError::Raw(e)
    })?;

    info!(%account_id, "user logged in");
    Ok(Json(TokenResponse { token }))
}
