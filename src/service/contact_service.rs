use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use crate::config::NotificationConfig;
use crate::dto::contact_dto::{ContactMessage, ContactResponse};
use crate::util::email::{EmailMessage, Mailer};
use crate::util::error::ServiceError;

pub const MISSING_FIELDS: &str = "Please fill out all fields.";
pub const INVALID_EMAIL: &str = "Please enter a valid email address.";
pub const SEND_FAILED: &str = "Failed to send message. Try again later.";
pub const THANK_YOU: &str = "Thank you for your feedback!";

#[async_trait]
pub trait ContactService: Send + Sync {
    async fn send(&self, message: ContactMessage) -> Result<ContactResponse, ServiceError>;
}

/// Forwards contact form submissions to the support inbox.
pub struct ContactServiceImpl {
    mailer: Arc<dyn Mailer>,
    inbox: String,
    app_name: String,
}

impl ContactServiceImpl {
    pub fn new(mailer: Arc<dyn Mailer>, config: &NotificationConfig) -> Self {
        Self {
            mailer,
            inbox: config.contact_inbox.clone(),
            app_name: config.app_display_name.clone(),
        }
    }

    fn compose(&self, message: &ContactMessage, time: &str) -> EmailMessage {
        use html_escape::encode_text;

        let text = format!(
            "Name: {}\nRole: {}\nEmail: {}\nTime: {}\n\n{}",
            message.name, message.role, message.email, time, message.message
        );
        let html = format!(
            "<h3>New message via {app}</h3>\
             <p><strong>Name:</strong> {name}<br><strong>Role:</strong> {role}<br>\
             <strong>Email:</strong> {email}<br><strong>Time:</strong> {time}</p>\
             <p>{body}</p>",
            app = encode_text(&self.app_name),
            name = encode_text(&message.name),
            role = encode_text(&message.role),
            email = encode_text(&message.email),
            time = encode_text(time),
            body = encode_text(&message.message),
        );
        EmailMessage::new(
            self.inbox.clone(),
            format!("{}: new message from {} ({})", self.app_name, message.name, message.role),
        )
        .with_reply_to(message.email.clone())
        .with_text_body(text)
        .with_html_body(html)
    }
}

#[async_trait]
impl ContactService for ContactServiceImpl {
    #[instrument(skip(self, message), fields(role = %message.role))]
    async fn send(&self, message: ContactMessage) -> Result<ContactResponse, ServiceError> {
        let message = ContactMessage {
            name: message.name.trim().to_string(),
            email: message.email.trim().to_string(),
            role: match message.role.trim() {
                "" => "Donor".to_string(),
                role => role.to_string(),
            },
            message: message.message.trim().to_string(),
        };
        if message.name.is_empty() || message.email.is_empty() || message.message.is_empty() {
            warn!("Contact form submitted with missing fields");
            return Err(ServiceError::InvalidInput(MISSING_FIELDS.to_string()));
        }
        message
            .validate()
            .map_err(|_| ServiceError::InvalidInput(INVALID_EMAIL.to_string()))?;

        let time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.mailer.send_email(self.compose(&message, &time)).await.map_err(|e| {
            error!("Failed to forward contact message: {e}");
            ServiceError::InternalError(SEND_FAILED.to_string())
        })?;

        info!("Contact message forwarded");
        Ok(ContactResponse { message: THANK_YOU.to_string() })
    }
}
