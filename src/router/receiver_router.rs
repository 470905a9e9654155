use axum::{middleware, routing::{get, post}, Router};
use std::sync::Arc;

use crate::handler::receiver_handler::{
    delete_request_handler, donors_handler, quote_handler, requests_by_email_handler,
    submit_request_handler, update_request_handler,
};
use crate::middlewares::session_middleware::resolve_session;
use crate::middlewares::AuthState;
use crate::service::receiver_service::ReceiverService;

pub fn receiver_router(service: Arc<dyn ReceiverService>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/receiver/requests/quote", post(quote_handler))
        .route("/receiver/requests", post(submit_request_handler))
        .route(
            "/receiver/requests/{key}",
            get(requests_by_email_handler).put(update_request_handler).delete(delete_request_handler),
        )
        .route("/receiver/donors", get(donors_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, resolve_session))
        .with_state(service)
}
