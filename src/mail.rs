//! Outbound mail.
//!
//! Handlers depend on the `Mailer` trait, registered as `web::Data<dyn
//! Mailer>`, so integration tests can swap in a recording stub. The real
//! implementation drives an SMTP relay through `lettre`. Sending is
//! synchronous; callers run it on the blocking pool via `web::block`.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::MailConfig;
use crate::error::AppError;

pub trait Mailer: Send + Sync {
    fn send_mail(&self, to: &str, subject: &str, html: &str) -> Result<(), AppError>;
}

pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, AppError> {
        let transport = SmtpTransport::relay(&config.smtp_host)
            .map_err(|e| {
                AppError::InternalServerError(format!("Failed to create SMTP transport: {}", e))
            })?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .port(config.smtp_port)
            .build();

        let from = config
            .from
            .parse()
            .map_err(|e| AppError::InternalServerError(format!("Invalid from address: {}", e)))?;

        Ok(Self { transport, from })
    }
}

impl Mailer for SmtpMailer {
    fn send_mail(&self, to: &str, subject: &str, html: &str) -> Result<(), AppError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|e| AppError::BadRequest(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| AppError::InternalServerError(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(&email)
            .map_err(|e| AppError::InternalServerError(format!("Failed to send email: {}", e)))?;

        log::info!("reset email sent to {}", to);
        Ok(())
    }
}

/// Body of the password-reset email.
pub fn reset_email_html(reset_link: &str) -> String {
    format!(
        "<p>Hi there,</p>\
         <p>Click on the link below to reset your password.</p>\
         <p><a href=\"{link}\">{link}</a></p>\
         <p>This link will expire in 30 minutes. If you did not request for password reset,<br />\
         you can safely ignore this email.</p>\
         <p>Best Regards,</p>\
         <p>Taskoo Team</p>",
        link = reset_link
    )
}
