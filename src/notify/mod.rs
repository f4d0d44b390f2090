//! Post-payment confirmation: render a PDF, stage it as a temporary file, mail
//! it, then remove the file. Runs after the payment has committed and never
//! fails the request; the outcome is reported as a [`DeliveryStatus`].

pub mod mailer;
pub mod pdf;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::config::Config;
use crate::services::payment::PaymentConfirmation;
use mailer::{ConfirmationEmail, ConfirmationMailer, DisabledMailer, SmtpMailer};
use pdf::{render_confirmation, ConfirmationDocument};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Mail delivery timed out after {0:?}")]
    Timeout(Duration),

    #[error("Mail delivery is not configured")]
    NotConfigured,

    #[error("Background task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn message(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "Payment successful and email sent",
            DeliveryStatus::Failed => "Payment successful (email failed)",
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryStatus::Sent)
    }
}

impl From<&PaymentConfirmation> for ConfirmationDocument {
    fn from(c: &PaymentConfirmation) -> Self {
        let time_format = "%Y-%m-%d %H:%M %:z";
        ConfirmationDocument {
            title: "Flight Booking Confirmation".to_string(),
            lines: vec![
                format!("Booking Ref: {}", c.booking.booking_reference),
                format!("Passenger: {}", c.booking.passenger_name),
                format!("Flight: {} ({})", c.flight.flight_number, c.flight.airline),
                format!("From: {}", c.flight.departure_city),
                format!("To: {}", c.flight.arrival_city),
                format!("Departure: {}", c.flight.departure_time.format(time_format)),
                format!("Arrival: {}", c.flight.arrival_time.format(time_format)),
                format!("Amount: INR {:.2}", c.payment.amount),
                format!("Payment Method: {}", c.payment.payment_method),
                format!("Transaction: {}", c.payment.transaction_id),
            ],
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn ConfirmationMailer>,
    artifact_dir: PathBuf,
    timeout: Duration,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn ConfirmationMailer>, artifact_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            mailer,
            artifact_dir,
            timeout,
        }
    }

    /// SMTP delivery when configured, otherwise a mailer that always fails.
    pub fn from_config(config: &Config) -> Self {
        let mailer: Arc<dyn ConfirmationMailer> = match &config.smtp {
            Some(smtp) => match SmtpMailer::new(smtp) {
                Ok(mailer) => Arc::new(mailer),
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid SMTP settings, confirmation emails disabled");
                    Arc::new(DisabledMailer)
                }
            },
            None => {
                tracing::warn!("SMTP_HOST/EMAIL_USER not set, confirmation emails disabled");
                Arc::new(DisabledMailer)
            }
        };

        Self::new(mailer, config.confirmation_dir.clone(), config.email_timeout())
    }

    pub async fn send_confirmation(&self, confirmation: &PaymentConfirmation) -> DeliveryStatus {
        match self.deliver(confirmation).await {
            Ok(()) => {
                tracing::info!(
                    reference = %confirmation.booking.booking_reference,
                    to = %confirmation.booking.passenger_email,
                    "Confirmation email sent"
                );
                DeliveryStatus::Sent
            }
            Err(e) => {
                tracing::warn!(
                    reference = %confirmation.booking.booking_reference,
                    error = %e,
                    "Confirmation email failed"
                );
                DeliveryStatus::Failed
            }
        }
    }

    async fn deliver(&self, confirmation: &PaymentConfirmation) -> Result<(), NotifyError> {
        let artifact = self.stage(confirmation).await?;

        let email = ConfirmationEmail {
            to: confirmation.booking.passenger_email.clone(),
            passenger_name: confirmation.booking.passenger_name.clone(),
            booking_reference: confirmation.booking.booking_reference.clone(),
            transaction_id: confirmation.payment.transaction_id.clone(),
            attachment: artifact.path().to_path_buf(),
        };

        let sent = match tokio::time::timeout(self.timeout, self.mailer.send_confirmation(&email)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout(self.timeout)),
        };

        cleanup(artifact);
        sent
    }

    /// Render the PDF and write it to a temporary file in the artifact directory.
    async fn stage(&self, confirmation: &PaymentConfirmation) -> Result<NamedTempFile, NotifyError> {
        let document = ConfirmationDocument::from(confirmation);
        let dir = self.artifact_dir.clone();
        let prefix = format!("booking_{}_", confirmation.booking.booking_reference);

        tokio::task::spawn_blocking(move || -> Result<NamedTempFile, NotifyError> {
            std::fs::create_dir_all(&dir)?;
            let bytes = render_confirmation(&document);
            let mut file = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(".pdf")
                .tempfile_in(&dir)?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(|e| NotifyError::Task(e.to_string()))?
    }
}

fn cleanup(artifact: NamedTempFile) {
    let path = artifact.path().to_path_buf();
    if let Err(e) = artifact.close() {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove confirmation file");
    }
}
