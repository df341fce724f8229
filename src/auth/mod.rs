use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod extractor;
pub mod google;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod session;
pub mod tokens;

pub use extractor::{AuthUser, BearerToken};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
