use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::admin_user_conf::AdminUserConfig;
use crate::config::app_conf::AppConfig;
use crate::config::{EmailConfig, JwtConfig, MongoConfig, NotificationConfig, PaymentConfig};
use crate::middlewares::AuthState;
use crate::repository::blood_request_repo::{BloodRequestRepository, MongoBloodRequestRepository};
use crate::repository::user_repo::{MongoUserRepository, UserRepository};
use crate::router::admin_router::admin_router;
use crate::router::contact_router::contact_router;
use crate::router::receiver_router::receiver_router;
use crate::router::user_router::user_router;
use crate::service::admin_service::{AdminService, AdminServiceImpl};
use crate::service::contact_service::{ContactService, ContactServiceImpl};
use crate::service::receiver_service::{ReceiverService, ReceiverServiceImpl};
use crate::service::user_service::{UserService, UserServiceImpl};
use crate::util::email::{Mailer, SmtpEmailService};
use crate::util::jwt::JwtTokenUtilsImpl;
use crate::util::notifier::{EmailRequestNotifier, RequestNotifier};
use crate::util::payment::{PaymentGateway, SimulatedPaymentGateway};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The services behind the HTTP surface.
#[derive(Clone)]
pub struct AppServices {
    pub user: Arc<dyn UserService>,
    pub admin: Arc<dyn AdminService>,
    pub receiver: Arc<dyn ReceiverService>,
    pub contact: Arc<dyn ContactService>,
}

/// All routes, without the CORS and tracing layers.
pub fn build_router(services: &AppServices, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .merge(user_router(services.user.clone()))
        .merge(admin_router(services.admin.clone(), auth_state.clone()))
        .merge(receiver_router(services.receiver.clone(), auth_state))
        .merge(contact_router(services.contact.clone()))
        .route("/health", get(|| async { "OK" }))
}

pub struct App {
    config: AppConfig,
    router: Router,
    pub services: AppServices,
}

impl App {
    pub async fn new(config: AppConfig) -> Result<Self, BoxError> {
        let jwt_config = JwtConfig::from_env()?;
        let mongo_config = MongoConfig::from_env()?;
        let email_config = EmailConfig::from_env()?;
        let notification_config = NotificationConfig::from_env()?;
        let payment_config = PaymentConfig::from_env()?;

        let db = mongo_config.connect().await?;
        info!(database = %mongo_config.database, "Connected to MongoDB");
        let user_repo: Arc<dyn UserRepository> = Arc::new(MongoUserRepository::new(&db, &mongo_config));
        let request_repo: Arc<dyn BloodRequestRepository> =
            Arc::new(MongoBloodRequestRepository::new(&db, &mongo_config));

        let jwt_utils = Arc::new(JwtTokenUtilsImpl::new(jwt_config));
        let mailer: Arc<dyn Mailer> = Arc::new(SmtpEmailService::new(email_config)?);
        let notifier: Arc<dyn RequestNotifier> =
            Arc::new(EmailRequestNotifier::new(mailer.clone(), &notification_config));
        let gateway: Arc<dyn PaymentGateway> = Arc::new(SimulatedPaymentGateway::new(&payment_config));

        let services = AppServices {
            user: Arc::new(UserServiceImpl::new(user_repo.clone(), jwt_utils.clone())),
            admin: Arc::new(AdminServiceImpl::new(
                user_repo.clone(),
                request_repo.clone(),
                notifier,
                notification_config.coordination_phone.clone(),
            )),
            receiver: Arc::new(ReceiverServiceImpl::new(
                request_repo,
                user_repo,
                gateway,
                payment_config.currency.clone(),
            )),
            contact: Arc::new(ContactServiceImpl::new(mailer, &notification_config)),
        };

        let auth_state = Arc::new(AuthState { jwt_utils });
        let router = build_router(&services, auth_state)
            .layer(Self::cors_layer(&config.cors_allowed_origin)?)
            .layer(TraceLayer::new_for_http());

        let app = App { config, router, services };
        app.create_first_admin_user().await;
        Ok(app)
    }

    fn cors_layer(origin: &str) -> Result<CorsLayer, BoxError> {
        Ok(CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
    }

    pub async fn start(self) -> Result<(), BoxError> {
        let addr = SocketAddr::new(self.config.host.parse()?, self.config.port);
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;
        Ok(())
    }

    async fn create_first_admin_user(&self) {
        let admin_conf = match AdminUserConfig::from_env() {
            Ok(c) => c,
            Err(e) => {
                warn!("Admin user config not loaded: {e}");
                return;
            }
        };
        match self.services.user.seed_admin(&admin_conf).await {
            Ok(true) => info!("First admin user created."),
            Ok(false) => info!("Admin user already exists, skipping creation."),
            Err(e) => error!("Failed to create admin user: {e}"),
        }
    }
}
