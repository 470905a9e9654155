use axum::{body::Body, extract::State, http::{header, Request, StatusCode}, middleware::Next, response::Response};
use std::sync::Arc;
use tracing::warn;

use crate::middlewares::AuthState;
use crate::util::session::Session;

/// Lets only admin sessions through; the resolved `Session` is attached to
/// the request for the handlers.
pub async fn admin_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    let session = Session::from_authorization(state.jwt_utils.as_ref(), auth_header);

    match &session {
        Session::Unauthenticated => return Err(StatusCode::UNAUTHORIZED),
        Session::Authenticated(user) if !session.is_admin() => {
            warn!(email = %user.email, role = %user.role, "Non-admin tried to reach admin route");
            return Err(StatusCode::FORBIDDEN);
        }
        Session::Authenticated(_) => {}
    }

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
