use crate::state::AppState;
use axum::Router;

mod claims;
pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
mod password;
pub mod provider;
mod repo;

pub use extractors::AuthUser;
pub use provider::{AuthProvider, PgAuthProvider};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
