use serde::Serialize;
use tracing::debug;

use crate::model::user::Role;
use crate::util::jwt::{Claims, JwtTokenUtils};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

/// Who is calling. Built once per request from the bearer token and passed
/// explicitly into the workflows that need an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Session {
    Authenticated(AuthenticatedUser),
    Unauthenticated,
}

impl Session {
    pub fn authenticated(user_id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Session::Authenticated(AuthenticatedUser {
            user_id: user_id.into(),
            email: email.into(),
            role,
        })
    }

    /// Any missing, malformed or expired token yields `Unauthenticated`.
    pub fn from_authorization<J: JwtTokenUtils>(jwt_utils: &J, auth_header: Option<&str>) -> Self {
        let Some(header) = auth_header else {
            return Session::Unauthenticated;
        };
        let claims = jwt_utils
            .extract_token_from_header(header)
            .and_then(|token| jwt_utils.validate_access_token(&token));
        match claims {
            Ok(claims) => Session::from(claims),
            Err(e) => {
                debug!("Treating request as unauthenticated: {e}");
                Session::Unauthenticated
            }
        }
    }

    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Session::Authenticated(user) => Some(user),
            Session::Unauthenticated => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.user().map(|u| u.email.as_str())
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.user(), Some(user) if user.role == Role::Admin)
    }
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Session::authenticated(claims.sub, claims.email, claims.role)
    }
}
