//! SMTP delivery with STARTTLS.

use async_trait::async_trait;
use chrono::Local;
use digest_core::{SmtpSettings, Transport, TransportError};
use digest_models::{Channel, Progress, SummaryItem};
use lettre::message::{header::ContentType, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::error::{EmailError, Result};
use crate::render::render_email;

/// Sends summaries as multipart (plain + HTML) email.
pub struct EmailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailTransport {
    /// Validates the addresses and prepares the SMTP client.
    ///
    /// No connection is made until the first send.
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let from = parse_mailbox(&settings.username)?;
        let to = parse_mailbox(&settings.recipient)?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        debug!(host = %settings.host, port = settings.port, "SMTP transport ready");
        Ok(Self { mailer, from, to })
    }

    /// Sends a short plain-text message to check the SMTP settings.
    pub async fn send_test_email(&self) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject("stardigest test email")
            .header(ContentType::TEXT_PLAIN)
            .body(String::from(
                "This is a test message from stardigest. SMTP delivery works.\n",
            ))?;

        self.mailer.send(message).await?;
        info!(to = %self.to, "Test email sent");
        Ok(())
    }

    fn build_message(&self, item: &SummaryItem, progress: Progress) -> Result<Message> {
        let rendered = render_email(item, progress, Local::now().date_naive());
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(rendered.subject)
            .multipart(MultiPart::alternative_plain_html(rendered.plain, rendered.html))?;
        Ok(message)
    }
}

#[async_trait]
impl Transport for EmailTransport {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn deliver(
        &self,
        item: &SummaryItem,
        progress: Progress,
    ) -> std::result::Result<(), TransportError> {
        let message = self
            .build_message(item, progress)
            .map_err(|e| TransportError::Render(e.to_string()))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;

        info!(key = %item.key, to = %self.to, "Email sent");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e: lettre::address::AddressError| EmailError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}
