use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Errors reported by the auth provider, the document store and object storage.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("the email address is already in use by another account")]
    EmailAlreadyInUse,
    #[error("the password is invalid")]
    WrongPassword,
    #[error("there is no account for this email")]
    UserNotFound,
    #[error("password should be at least 6 characters")]
    WeakPassword,
    #[error("invalid identity token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("no document to update: {0}")]
    DocumentNotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("storage error: {0}")]
    Storage(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ProviderError {
    /// Stable machine-readable code echoed to clients in 500 responses.
    pub fn code(&self) -> &'static str {
        match self {
            ProviderError::EmailAlreadyInUse => "auth/email-already-in-use",
            ProviderError::WrongPassword => "auth/wrong-password",
            ProviderError::UserNotFound => "auth/user-not-found",
            ProviderError::WeakPassword => "auth/weak-password",
            ProviderError::Token(_) => "auth/invalid-token",
            ProviderError::DocumentNotFound(_) => "not-found",
            ProviderError::Database(_) => "database/error",
            ProviderError::Storage(_) => "storage/error",
            ProviderError::Internal(_) => "internal",
        }
    }
}

pub type FieldErrors = BTreeMap<&'static str, &'static str>;

/// Handler-level failure, rendered with the response shapes clients already depend on.
#[derive(Debug)]
pub enum ApiError {
    /// 400 with a field-keyed message map.
    Fields(FieldErrors),
    /// 400 `{error}`.
    BadRequest(&'static str),
    /// 403 `{general}`.
    Forbidden(&'static str),
    /// 403 `{error: "Unauthorized"}` from the auth gate.
    Unauthorized,
    /// 404 `{error}`.
    NotFound(&'static str),
    /// 413 `{error}`.
    PayloadTooLarge(&'static str),
    /// 500 `{<key>: <code>}`.
    Provider {
        key: &'static str,
        source: ProviderError,
    },
    /// 500 `{general}` without the underlying code.
    General(&'static str),
    /// 500 `{err: {code, message}}`.
    Raw(ProviderError),
}

impl ApiError {
    pub fn field(field: &'static str, message: &'static str) -> Self {
        ApiError::Fields(BTreeMap::from([(field, message)]))
    }

    /// 500 `{error: code}`.
    pub fn error(source: ProviderError) -> Self {
        ApiError::Provider {
            key: "error",
            source,
        }
    }

    /// 500 `{err: code}`.
    pub fn err(source: ProviderError) -> Self {
        ApiError::Provider { key: "err", source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body): (StatusCode, Value) = match self {
            ApiError::Fields(errors) => (StatusCode::BAD_REQUEST, json!(errors)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "general": msg })),
            ApiError::Unauthorized => (StatusCode::FORBIDDEN, json!({ "error": "Unauthorized" })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, json!({ "error": msg }))
            }
            ApiError::Provider { key, source } => {
                let mut body = serde_json::Map::new();
                body.insert(key.to_string(), Value::from(source.code()));
                (StatusCode::INTERNAL_SERVER_ERROR, Value::Object(body))
            }
            ApiError::General(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "general": msg }),
            ),
            ApiError::Raw(source) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "err": { "code": source.code(), "message": source.to_string() } }),
            ),
        };
        (status, Json(body)).into_response()
    }
}
