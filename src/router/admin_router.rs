use axum::{middleware, routing::{get, put}, Router};
use std::sync::Arc;

use crate::handler::admin_handler::{
    dashboard_handler, delete_user_handler, list_requests_handler, list_users_handler,
    snapshot_handler, update_request_status_handler, update_user_role_handler,
};
use crate::middlewares::admin_middleware::admin_auth;
use crate::middlewares::AuthState;
use crate::service::admin_service::AdminService;

pub fn admin_router(service: Arc<dyn AdminService>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/admin/users", get(list_users_handler))
        .route("/admin/users/{id}", put(update_user_role_handler).delete(delete_user_handler))
        .route("/admin/requests", get(list_requests_handler))
        .route("/admin/requests/{id}", put(update_request_status_handler))
        .route("/admin/dashboard", get(dashboard_handler))
        .route("/admin/snapshot", get(snapshot_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, admin_auth))
        .with_state(service)
}
