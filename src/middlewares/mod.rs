use std::sync::Arc;

use crate::util::jwt::JwtTokenUtilsImpl;

pub mod admin_middleware;
pub mod session_middleware;

/// Shared by the admin gate and the session resolver.
pub struct AuthState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}
