//! Email delivery collaborator
//!
//! Composes the fixed plain-text report template and relays it over SMTP.
//! Success/failure only; nothing is persisted.

use crate::config::EmailConfig;
use anyhow::{Context, Result};
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid email address: {0}")]
    Address(String),

    #[error("Failed to send email: {0}")]
    Send(String),
}

const REPORT_SUBJECT: &str = "Your Transcription, Summary, and Sentiment Analysis";

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let credentials = Credentials::new(config.address.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
            .context("Failed to configure SMTP relay")?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        let from: Mailbox = config
            .address
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid sender address: {}", config.address))?;

        Ok(Self { transport, from })
    }

    /// Send the transcript report to one recipient.
    pub async fn send_report(
        &self,
        to: &str,
        transcript: &str,
        summary: &str,
        insights: &str,
    ) -> Result<(), MailError> {
        let to: Mailbox = to.parse().map_err(|_| MailError::Address(to.to_string()))?;

        let body = format!(
            "Transcript:\n{}\n\nSummary:\n{}\n\nInsights:\n{}\n",
            transcript, summary, insights
        );

        let message = Message::builder()
            .from(self.from.clone())
            .to(to.clone())
            .subject(REPORT_SUBJECT)
            .body(body)
            .map_err(|e| MailError::Send(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;

        info!("Report emailed to {}", to);

        Ok(())
    }
}
