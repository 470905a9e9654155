use axum::{body::Body, extract::State, http::{header, Request}, middleware::Next, response::Response};
use std::sync::Arc;

use crate::middlewares::AuthState;
use crate::util::session::Session;

/// Resolves the caller's `Session` and attaches it to the request. Never
/// rejects; workflows decide what an unauthenticated caller may do.
pub async fn resolve_session(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    let session = Session::from_authorization(state.jwt_utils.as_ref(), auth_header);
    req.extensions_mut().insert(session);
    next.run(req).await
}
