/**
 * Email Delivery
 *
 * Outbound mail over async SMTP: the welcome message on signup and the
 * password-reset message carrying the one-time reset URL.
 *
 * # Configuration
 *
 * SMTP is optional at startup so the API can run without a mail relay in
 * development. An unconfigured mailer fails every send with a delivery
 * error; for the reset flow the caller rolls the stored token back, so a
 * reset token never exists that nobody received.
 */

use lettre::{
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::error::ApiError;
use crate::server::config::{Config, SmtpConfig};

/// Async SMTP mailer shared through the application state
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl Mailer {
    /// Build the mailer from configuration
    ///
    /// Returns a disabled mailer (every send fails with DeliveryFailed)
    /// when SMTP settings are absent.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let from: Mailbox = config.email_from.parse().map_err(|e| {
            ApiError::internal(format!("Invalid EMAIL_FROM address: {e}"))
        })?;

        let transport = match &config.smtp {
            Some(smtp) => Some(Self::build_transport(smtp)?),
            None => {
                tracing::warn!("SMTP not configured; outbound email is disabled");
                None
            }
        };

        Ok(Self { transport, from })
    }

    fn build_transport(
        smtp: &SmtpConfig,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, ApiError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
            .map_err(|e| ApiError::internal(format!("Invalid SMTP configuration: {e}")))?
            .port(smtp.port);

        if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(builder.build())
    }

    /// Send the post-signup welcome message (best-effort at the call site)
    pub async fn send_welcome(&self, name: &str, email: &str) -> Result<(), ApiError> {
        let body = format!(
            "Hi {name},\n\n\
             Welcome to Trailhead! We're glad to have you on board.\n\
             Browse the tours and book your next adventure.\n\n\
             The Trailhead Team"
        );
        self.send(name, email, "Welcome to Trailhead!", body).await
    }

    /// Send the password-reset message with the one-time URL
    ///
    /// The plaintext token only ever travels in this message; the API
    /// response never contains it.
    pub async fn send_password_reset(
        &self,
        name: &str,
        email: &str,
        reset_url: &str,
    ) -> Result<(), ApiError> {
        let body = format!(
            "Hi {name},\n\n\
             Forgot your password? Submit a PATCH request with your new password\n\
             and password confirmation to:\n\n{reset_url}\n\n\
             The link is valid for 10 minutes. If you didn't forget your\n\
             password, please ignore this email.\n\n\
             The Trailhead Team"
        );
        self.send(
            name,
            email,
            "Your password reset token (valid for 10 minutes)",
            body,
        )
        .await
    }

    async fn send(
        &self,
        name: &str,
        email: &str,
        subject: &str,
        body: String,
    ) -> Result<(), ApiError> {
        let to: Mailbox = format!("{name} <{email}>").parse().map_err(|e| {
            ApiError::validation(format!("Invalid recipient address: {e}"))
        })?;

        let transport = self.transport.as_ref().ok_or_else(|| {
            ApiError::delivery_failed("Email delivery is not configured")
        })?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body)
            .map_err(|e| {
                tracing::error!("Failed to build email: {:?}", e);
                ApiError::internal("Failed to build email")
            })?;

        transport.send(message).await.map_err(|e| {
            tracing::error!("SMTP send failed: {:?}", e);
            ApiError::delivery_failed("There was an error sending the email. Try again later!")
        })?;

        tracing::debug!("Sent '{}' to {}", subject, email);
        Ok(())
    }

    /// A mailer with no transport, for tests and mail-less deployments
    pub fn disabled(from: &str) -> Self {
        Self {
            transport: None,
            from: from.parse().expect("invalid from address"),
        }
    }
}
