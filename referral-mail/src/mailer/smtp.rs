//! SMTP relay dispatch
//!
//! Connects to the configured relay with implicit TLS (`secure`) or STARTTLS,
//! authenticates with the configured credentials and submits one message per
//! call. Without credentials the mailer still builds, but every send fails.

use crate::config::SmtpConfig;
use crate::error::{ReferralError, Result, ValidationError};
use crate::mailer::{Mailer, OutboundEmail, DEFAULT_CONTENT_TYPE};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MailAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, warn};

pub struct SmtpMailer {
    /// Ready transport, or why there is none
    transport: std::result::Result<AsyncSmtpTransport<Tokio1Executor>, String>,
    sender: Option<String>,
    relay: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Self {
        let transport = Self::build_transport(config);
        let relay = format!("{}:{}", config.host, config.port);

        match &transport {
            Ok(_) => info!(relay = %relay, secure = config.secure, "SMTP mailer configured"),
            Err(reason) => warn!(relay = %relay, reason = %reason, "SMTP mailer disabled, sends will fail"),
        }

        Self {
            transport,
            sender: config.sender().map(str::to_string),
            relay,
        }
    }

    fn build_transport(
        config: &SmtpConfig,
    ) -> std::result::Result<AsyncSmtpTransport<Tokio1Executor>, String> {
        let (user, password) = match (&config.user, &config.password) {
            (Some(user), Some(password)) if config.has_credentials() => {
                (user.clone(), password.clone())
            }
            _ => return Err("SMTP credentials are not configured".to_string()),
        };

        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| format!("Invalid SMTP relay {}: {}", config.host, e))?;

        Ok(builder
            .port(config.port)
            .credentials(Credentials::new(user, password))
            .build())
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_ok()
    }
}

pub(crate) fn parse_recipient(recipient: &str) -> Result<Mailbox> {
    let recipient = recipient.trim();
    if recipient.is_empty() {
        return Err(ValidationError::MissingRecipient.into());
    }

    recipient
        .parse()
        .map_err(|_| ValidationError::InvalidRecipient(recipient.to_string()).into())
}

/// HTML message, `multipart/mixed` when an attachment is present
pub(crate) fn build_message(from: Mailbox, to: Mailbox, email: &OutboundEmail) -> Result<Message> {
    let builder = Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone());

    let html = SinglePart::html(email.body_html.clone());

    let message = match &email.attachment {
        Some(attachment) => {
            let content_type = ContentType::parse(attachment.content_type_or_default())
                .or_else(|_| ContentType::parse(DEFAULT_CONTENT_TYPE))
                .map_err(|e| ReferralError::Dispatch(format!("Invalid content type: {}", e)))?;

            let part = MailAttachment::new(attachment.filename.clone())
                .body(attachment.data.clone(), content_type);

            builder.multipart(MultiPart::mixed().singlepart(html).singlepart(part))
        }
        None => builder.singlepart(html),
    };

    message.map_err(|e| ReferralError::Dispatch(format!("Failed to build message: {}", e)))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        let to = parse_recipient(&email.recipient)?;

        let transport = self
            .transport
            .as_ref()
            .map_err(|reason| ReferralError::Dispatch(reason.clone()))?;

        let sender = self
            .sender
            .as_deref()
            .ok_or_else(|| ReferralError::Dispatch("No sender address configured".to_string()))?;
        let from: Mailbox = sender
            .parse()
            .map_err(|e| ReferralError::Dispatch(format!("Invalid sender {}: {}", sender, e)))?;

        let message = build_message(from, to, email)?;

        debug!(
            relay = %self.relay,
            recipient = %email.recipient,
            has_attachment = email.attachment.is_some(),
            "Submitting message"
        );

        match transport.send(message).await {
            Ok(response) => {
                info!(
                    recipient = %email.recipient,
                    code = %response.code(),
                    "Email sent"
                );
                Ok(())
            }
            Err(e) => {
                warn!(relay = %self.relay, recipient = %email.recipient, error = %e, "Email dispatch failed");
                Err(ReferralError::Dispatch(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::mailer::Attachment;

    fn email(attachment: Option<Attachment>) -> OutboundEmail {
        OutboundEmail {
            recipient: "hr@acme.test".to_string(),
            subject: "Referral for Engineer".to_string(),
            body_html: "<p>Hi Dana</p>".to_string(),
            attachment,
        }
    }

    fn mailbox(addr: &str) -> Mailbox {
        addr.parse().unwrap()
    }

    #[test]
    fn test_html_only_message() {
        let message = build_message(mailbox("me@example.com"), mailbox("hr@acme.test"), &email(None))
            .unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("Subject: Referral for Engineer"));
        assert!(raw.contains("text/html"));
        assert!(!raw.contains("multipart/mixed"));
    }

    #[test]
    fn test_attachment_keeps_original_filename() {
        let attachment = Attachment::new(
            "Dana Resume.pdf",
            Some("application/pdf".to_string()),
            b"%PDF-1.4".to_vec(),
        );
        let message = build_message(
            mailbox("me@example.com"),
            mailbox("hr@acme.test"),
            &email(Some(attachment)),
        )
        .unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("Dana Resume.pdf"));
        assert!(raw.contains("application/pdf"));
    }

    #[test]
    fn test_bogus_content_type_falls_back() {
        let attachment = Attachment::new("blob", Some("not a type".to_string()), vec![0]);
        let message = build_message(
            mailbox("me@example.com"),
            mailbox("hr@acme.test"),
            &email(Some(attachment)),
        )
        .unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("application/octet-stream"));
    }

    #[test]
    fn test_parse_recipient() {
        assert!(parse_recipient(" hr@acme.test ").is_ok());
        assert!(matches!(
            parse_recipient(""),
            Err(ReferralError::Validation(ValidationError::MissingRecipient))
        ));
        assert!(matches!(
            parse_recipient("not-an-address"),
            Err(ReferralError::Validation(ValidationError::InvalidRecipient(_)))
        ));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_every_send() {
        let mailer = SmtpMailer::new(&Config::default().smtp);
        assert!(!mailer.is_configured());

        let result = mailer.send(&email(None)).await;
        assert!(matches!(result, Err(ReferralError::Dispatch(_))));
    }

    #[tokio::test]
    async fn test_invalid_recipient_checked_before_transport() {
        let mailer = SmtpMailer::new(&Config::default().smtp);
        let mut message = email(None);
        message.recipient = "nobody".to_string();

        let result = mailer.send(&message).await;
        assert!(matches!(
            result,
            Err(ReferralError::Validation(ValidationError::InvalidRecipient(_)))
        ));
    }
}
