use tracing::{error, info, instrument, warn};
use std::sync::Arc;
use async_trait::async_trait;

use crate::config::admin_user_conf::AdminUserConfig;
use crate::dto::user_dto::{AuthTokens, RegisterRequest, UserAuthResponse, UserView};
use crate::model::blood_request::BloodGroup;
use crate::model::user::{Role, User};
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl, TokenPair};
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};

#[async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<UserAuthResponse, ServiceError>;
    async fn login(&self, email: String, password: String) -> Result<UserAuthResponse, ServiceError>;
    async fn refresh_token(&self, refresh_token: String) -> Result<AuthTokens, ServiceError>;
    /// Creates the configured admin account unless that email already exists.
    /// Returns whether an account was created.
    async fn seed_admin(&self, config: &AdminUserConfig) -> Result<bool, ServiceError>;
}

pub struct UserServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
}

impl UserServiceImpl {
    pub fn new(user_repo: Arc<dyn UserRepository>, jwt_utils: Arc<JwtTokenUtilsImpl>) -> Self {
        Self { user_repo, jwt_utils }
    }

    fn issue_tokens(&self, user: &User) -> Result<AuthTokens, ServiceError> {
        let user_id = user.id.map(|id| id.to_hex()).unwrap_or_default();
        let pair = self
            .jwt_utils
            .generate_token_pair(&user_id, &user.email, user.role)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;
        Ok(to_auth_tokens(pair))
    }

    fn hash(password: &str) -> Result<String, ServiceError> {
        PasswordUtilsImpl::hash_password(password)
            .map_err(|e| ServiceError::InternalError(format!("Password hash error: {}", e)))
    }
}

fn to_auth_tokens(pair: TokenPair) -> AuthTokens {
    AuthTokens {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_in: pair.expires_in,
        token_type: pair.token_type,
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    async fn register(&self, request: RegisterRequest) -> Result<UserAuthResponse, ServiceError> {
        info!("Registering new user");
        let role = request.role.parse::<Role>()?;
        if role == Role::Admin {
            warn!("Rejected admin self-registration");
            return Err(ServiceError::InvalidInput("Only donor or receiver accounts can register".to_string()));
        }
        let blood_group = request
            .blood_group
            .as_deref()
            .filter(|bg| !bg.trim().is_empty())
            .map(str::parse::<BloodGroup>)
            .transpose()?;
        if role == Role::Donor && blood_group.is_none() {
            return Err(ServiceError::InvalidInput("Donors must provide a blood group".to_string()));
        }
        PasswordUtilsImpl::validate_password_strength(&request.password)
            .map_err(|errors| ServiceError::InvalidInput(errors.join("; ")))?;

        let email = request.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }

        let user = User {
            id: None,
            name: request.name.trim().to_string(),
            email,
            password_hash: Self::hash(&request.password)?,
            role,
            blood_group,
            created_at: None,
            updated_at: None,
        };
        let inserted = self.user_repo.insert(user).await.map_err(|e| {
            error!("Failed to insert user: {e}");
            ServiceError::from(e)
        })?;
        let tokens = self.issue_tokens(&inserted)?;
        info!("User registered");
        Ok(UserAuthResponse { user: UserView::from(inserted), tokens })
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn login(&self, email: String, password: String) -> Result<UserAuthResponse, ServiceError> {
        info!("User login attempt");
        let email = email.trim().to_lowercase();
        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            warn!("Login for unknown email");
            return Err(ServiceError::Unauthenticated("Invalid credentials".to_string()));
        };
        let valid = PasswordUtilsImpl::verify_password(&password, &user.password_hash)
            .map_err(|e| ServiceError::InternalError(format!("Password verify error: {}", e)))?;
        if !valid {
            warn!("Invalid credentials");
            return Err(ServiceError::Unauthenticated("Invalid credentials".to_string()));
        }
        let tokens = self.issue_tokens(&user)?;
        info!("User logged in successfully");
        Ok(UserAuthResponse { user: UserView::from(user), tokens })
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh_token(&self, refresh_token: String) -> Result<AuthTokens, ServiceError> {
        let claims = self
            .jwt_utils
            .validate_refresh_token(&refresh_token)
            .map_err(|e| ServiceError::Unauthenticated(format!("Invalid refresh token: {}", e)))?;
        let pair = self
            .jwt_utils
            .generate_token_pair(&claims.sub, &claims.email, claims.role)
            .map_err(|e| ServiceError::InternalError(format!("JWT error: {}", e)))?;
        info!("Token refreshed successfully");
        Ok(to_auth_tokens(pair))
    }

    #[instrument(skip(self, config), fields(email = %config.email))]
    async fn seed_admin(&self, config: &AdminUserConfig) -> Result<bool, ServiceError> {
        let email = config.email.trim().to_lowercase();
        if self.user_repo.find_by_email(&email).await?.is_some() {
            info!("Admin account already present");
            return Ok(false);
        }
        let admin = User {
            id: None,
            name: config.name.clone(),
            email,
            password_hash: Self::hash(&config.password)?,
            role: Role::Admin,
            blood_group: None,
            created_at: None,
            updated_at: None,
        };
        self.user_repo.insert(admin).await?;
        info!("Admin account created");
        Ok(true)
    }
}
