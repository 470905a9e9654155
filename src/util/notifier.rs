//! Requester notifications for finished blood requests.
//!
//! A status change to `fulfilled` or `cancelled` produces a
//! [`StatusNotification`], a flat set of template fields that is rendered to
//! a plain-text and an HTML body and handed to a [`Mailer`].

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::NotificationConfig;
use crate::model::blood_request::{BloodRequest, RequestStatus};
use crate::util::email::{EmailError, EmailMessage, Mailer};

/// Template fields for a status notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusNotification {
    pub to_email: String,
    pub name: String,
    pub blood_group: String,
    pub hospital: String,
    pub contact: String,
    pub time: String,
    pub status: RequestStatus,
    pub status_message: String,
    pub emoji: String,
    pub bg_color: String,
    pub extra_message: String,
}

impl StatusNotification {
    /// Returns `None` when the status is not terminal or no address is on file.
    pub fn for_request(
        request: &BloodRequest,
        status: RequestStatus,
        coordination_phone: &str,
    ) -> Option<Self> {
        let to_email = request.notification_address()?.to_string();
        let fulfilled = match status {
            RequestStatus::Fulfilled => true,
            RequestStatus::Cancelled => false,
            RequestStatus::Pending => return None,
        };

        let name = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| {
                to_email
                    .split('@')
                    .next()
                    .filter(|local| !local.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "User".to_string());

        let blood_group = request.blood_group.to_string();
        let hospital = non_blank_or(&request.hospital, "Not specified");
        let contact = non_blank_or(&request.contact, "Not provided");

        let (status_message, emoji, bg_color, extra_message) = if fulfilled {
            (
                format!("Good news! Your blood request for {blood_group} at {hospital} has been FULFILLED."),
                "✅",
                "#e6f4ea",
                format!("Please contact {coordination_phone} for further coordination."),
            )
        } else {
            (
                format!("We regret to inform you that your blood request for {blood_group} at {hospital} has been CANCELLED."),
                "❌",
                "#ffe6e6",
                "If this was unexpected, please contact support or try again later.".to_string(),
            )
        };

        Some(StatusNotification {
            to_email,
            name,
            blood_group,
            hospital,
            contact,
            time: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            status,
            status_message,
            emoji: emoji.to_string(),
            bg_color: bg_color.to_string(),
            extra_message,
        })
    }

    pub fn is_success(&self) -> bool {
        self.status == RequestStatus::Fulfilled
    }

    pub fn subject(&self, app_name: &str) -> String {
        if self.is_success() {
            format!("{} {app_name}: your blood request was fulfilled", self.emoji)
        } else {
            format!("{} {app_name}: your blood request was cancelled", self.emoji)
        }
    }

    pub fn render_text(&self, app_name: &str) -> String {
        format!(
            "Hello {name},\n\n{status_message}\n\nBlood group: {blood_group}\nHospital: {hospital}\nContact: {contact}\nTime: {time}\n\n{extra_message}\n\nThe {app_name} Team",
            name = self.name,
            status_message = self.status_message,
            blood_group = self.blood_group,
            hospital = self.hospital,
            contact = self.contact,
            time = self.time,
            extra_message = self.extra_message,
        )
    }

    pub fn render_html(&self, app_name: &str) -> String {
        use html_escape::encode_text;
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
    <div style="background-color: {bg_color}; padding: 20px; border-radius: 8px;">
        <h2>{emoji} {status_message}</h2>
        <p>Hello {name},</p>
        <table>
            <tr><td><strong>Blood group</strong></td><td>{blood_group}</td></tr>
            <tr><td><strong>Hospital</strong></td><td>{hospital}</td></tr>
            <tr><td><strong>Contact</strong></td><td>{contact}</td></tr>
            <tr><td><strong>Time</strong></td><td>{time}</td></tr>
        </table>
        <p>{extra_message}</p>
        <p>The {app_name} Team</p>
    </div>
</body>
</html>"#,
            bg_color = self.bg_color,
            emoji = self.emoji,
            status_message = encode_text(&self.status_message),
            name = encode_text(&self.name),
            blood_group = encode_text(&self.blood_group),
            hospital = encode_text(&self.hospital),
            contact = encode_text(&self.contact),
            time = encode_text(&self.time),
            extra_message = encode_text(&self.extra_message),
            app_name = encode_text(app_name),
        )
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() { fallback.to_string() } else { trimmed.to_string() }
}

#[async_trait]
pub trait RequestNotifier: Send + Sync {
    async fn notify_status(&self, notification: StatusNotification) -> Result<(), EmailError>;
}

/// Delivers status notifications through a [`Mailer`].
pub struct EmailRequestNotifier {
    mailer: Arc<dyn Mailer>,
    app_name: String,
}

impl EmailRequestNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, config: &NotificationConfig) -> Self {
        Self { mailer, app_name: config.app_display_name.clone() }
    }
}

#[async_trait]
impl RequestNotifier for EmailRequestNotifier {
    #[instrument(skip(self, notification), fields(to = %notification.to_email, status = %notification.status))]
    async fn notify_status(&self, notification: StatusNotification) -> Result<(), EmailError> {
        let message = EmailMessage::new(notification.to_email.clone(), notification.subject(&self.app_name))
            .with_text_body(notification.render_text(&self.app_name))
            .with_html_body(notification.render_html(&self.app_name));
        self.mailer.send_email(message).await?;
        info!("Status notification delivered");
        Ok(())
    }
}
