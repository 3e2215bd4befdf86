//! Outbound email.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;
use crate::error::{AppError, Result};

/// SMTP client for transactional mail. Without an SMTP host configured it
/// degrades to logging the message, which keeps development and tests free of
/// a mail relay.
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = match &config.smtp_host {
            Some(host) => {
                let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                    .map_err(|e| AppError::Config(format!("SMTP relay: {}", e)))?;

                if let (Some(user), Some(pass)) = (&config.smtp_username, &config.smtp_password) {
                    builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
                }

                Some(builder.build())
            }
            None => None,
        };

        Ok(Self {
            transport,
            from: config.email_from.clone(),
        })
    }

    pub async fn send_verification_code(&self, to: &str, code: &str) -> Result<()> {
        self.send(
            to,
            "Email Verification Code",
            &format!("Your verification code is: {}", code),
        )
        .await
    }

    pub async fn send_reset_code(&self, to: &str, code: &str) -> Result<()> {
        self.send(
            to,
            "Password Reset Verification",
            &format!("Your verification code is: {}", code),
        )
        .await
    }

    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let Some(transport) = &self.transport else {
            tracing::info!(to, subject, "SMTP not configured, skipping email");
            return Ok(());
        };

        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| AppError::Config(format!("EMAIL_FROM: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|_| AppError::Validation("Invalid email address".into()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Mail(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(e.to_string()))?;

        Ok(())
    }
}
