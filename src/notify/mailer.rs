use std::path::PathBuf;

use async_trait::async_trait;
use lettre::message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::notify::NotifyError;

pub const ATTACHMENT_NAME: &str = "BookingConfirmation.pdf";

/// Everything needed to mail a booking confirmation. `attachment` is the
/// rendered PDF on disk; the caller owns and removes it.
#[derive(Debug, Clone)]
pub struct ConfirmationEmail {
    pub to: String,
    pub passenger_name: String,
    pub booking_reference: String,
    pub transaction_id: String,
    pub attachment: PathBuf,
}

impl ConfirmationEmail {
    pub fn body(&self) -> String {
        format!(
            "Dear {},\nBooking Ref: {}\nTransaction ID: {}",
            self.passenger_name, self.booking_reference, self.transaction_id
        )
    }
}

#[async_trait]
pub trait ConfirmationMailer: Send + Sync {
    async fn send_confirmation(&self, email: &ConfirmationEmail) -> Result<(), NotifyError>;
}

/// SMTP delivery through lettre's async transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::Mail(format!("Invalid from address: {e}")))?;

        // 465 is implicit TLS, anything else upgrades with STARTTLS
        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| NotifyError::Mail(format!("SMTP relay error: {e}")))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl ConfirmationMailer for SmtpMailer {
    async fn send_confirmation(&self, email: &ConfirmationEmail) -> Result<(), NotifyError> {
        let pdf = tokio::fs::read(&email.attachment).await?;

        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| NotifyError::Mail(format!("Invalid to address: {e}")))?;
        let content_type = ContentType::parse("application/pdf")
            .map_err(|e| NotifyError::Mail(format!("Invalid content type: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Booking Confirmation")
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(email.body()))
                    .singlepart(Attachment::new(ATTACHMENT_NAME.to_string()).body(pdf, content_type)),
            )
            .map_err(|e| NotifyError::Mail(format!("Failed to build email: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Mail(format!("Failed to send email: {e}")))?;

        Ok(())
    }
}

/// Used when no SMTP server is configured. Every delivery fails, which the
/// payment flow reports as "email failed".
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMailer;

#[async_trait]
impl ConfirmationMailer for DisabledMailer {
    async fn send_confirmation(&self, email: &ConfirmationEmail) -> Result<(), NotifyError> {
        tracing::debug!(
            reference = %email.booking_reference,
            "Mail delivery is not configured"
        );
        Err(NotifyError::NotConfigured)
    }
}
