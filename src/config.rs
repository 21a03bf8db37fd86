//! Application configuration.
//!
//! All runtime knobs are collected once at startup into a `Config` value and
//! handed to the app as `web::Data<Config>`. Components never read the
//! environment themselves; the signing secret, cookie domain, and mail
//! identity all flow in from here.

use std::env;

/// SMTP relay settings for the outbound mail sender.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    /// From-address on reset emails, e.g. `Taskoo <no-reply@taskoo.app>`.
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Symmetric secret for signing session tokens.
    pub jwt_secret: String,
    /// Frontend origin; used for the CORS allow-list and reset links.
    pub domain_url: String,
    pub mail: MailConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            domain_url: env::var("DOMAIN_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            mail: MailConfig {
                smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
                smtp_port: env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse()
                    .expect("SMTP_PORT must be a number"),
                username: env::var("MAIL_USERNAME").unwrap_or_default(),
                password: env::var("MAIL_PASSWORD").unwrap_or_default(),
                from: env::var("MAIL_FROM")
                    .unwrap_or_else(|_| "Taskoo <no-reply@taskoo.app>".to_string()),
            },
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
