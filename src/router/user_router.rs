use axum::{routing::post, Router};
use std::sync::Arc;

use crate::handler::user_handler::{login_handler, refresh_token_handler, register_handler};
use crate::service::user_service::UserService;

pub fn user_router(service: Arc<dyn UserService>) -> Router {
    Router::new()
        .route("/users/register", post(register_handler))
        .route("/users/login", post(login_handler))
        .route("/users/refresh-token", post(refresh_token_handler))
        .with_state(service)
}
