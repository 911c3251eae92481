//! SMTP email channel.
//!
//! Sends a plain-text alert with the annotated image attached, over a
//! STARTTLS connection authenticated with the sender's credentials.

use anyhow::{anyhow, Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;

use super::message::{email_body, email_subject, ATTACHMENT_NAME};
use super::{Channel, DetectionEvent};
use crate::config::EmailSettings;

pub struct EmailChannel {
    settings: EmailSettings,
    timeout: Duration,
}

impl EmailChannel {
    pub fn new(settings: EmailSettings, timeout: Duration) -> Self {
        Self { settings, timeout }
    }

    /// Build the MIME message for `event`. A missing image file is not an
    /// error: the alert goes out without the attachment.
    pub fn compose(&self, event: &DetectionEvent) -> Result<Message> {
        let from: Mailbox = self
            .settings
            .sender_email
            .parse()
            .with_context(|| format!("invalid sender_email '{}'", self.settings.sender_email))?;
        let to: Mailbox = self.settings.recipient_email.parse().with_context(|| {
            format!(
                "invalid recipient_email '{}'",
                self.settings.recipient_email
            )
        })?;

        let mut body = MultiPart::mixed().singlepart(SinglePart::plain(email_body(event)));
        if let Some(path) = event.image.as_ref().filter(|path| path.exists()) {
            let bytes = std::fs::read(path)
                .with_context(|| format!("read detection image {}", path.display()))?;
            let content_type = ContentType::parse("image/jpeg")
                .map_err(|e| anyhow!("invalid attachment content type: {}", e))?;
            let attachment = Attachment::new(ATTACHMENT_NAME.to_string()).body(bytes, content_type);
            body = body.singlepart(attachment);
        } else if let Some(path) = &event.image {
            log::warn!(
                "detection image {} missing; emailing without attachment",
                path.display()
            );
        }

        Message::builder()
            .from(from)
            .to(to)
            .subject(email_subject(event))
            .multipart(body)
            .context("build alert email")
    }
}

impl Channel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn send(&self, event: &DetectionEvent) -> Result<()> {
        let message = self.compose(event)?;
        let credentials = Credentials::new(
            self.settings.sender_email.clone(),
            self.settings.sender_password.clone(),
        );
        let mailer = SmtpTransport::starttls_relay(&self.settings.smtp_server)
            .with_context(|| format!("configure smtp relay {}", self.settings.smtp_server))?
            .port(self.settings.smtp_port)
            .credentials(credentials)
            .timeout(Some(self.timeout))
            .build();
        mailer
            .send(&message)
            .with_context(|| format!("send email via {}", self.settings.smtp_server))?;
        Ok(())
    }
}
