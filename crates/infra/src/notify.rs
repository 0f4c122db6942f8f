//! Outbound transactional email.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Sends one email. Implementations must not retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), NotifyError>;
}

/// Connection settings for [`SmtpNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

/// SMTP relay over STARTTLS with username/password auth.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpNotifier {
    pub fn new(settings: SmtpSettings) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| NotifyError::Transport(e.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(settings.username, settings.password))
            .build();
        Ok(Self {
            transport,
            from: settings.from,
        })
    }
}

fn build_message(from: &str, email: OutgoingEmail) -> Result<Message, NotifyError> {
    let parse = |address: &str| -> Result<Mailbox, NotifyError> {
        address.parse().map_err(|e: lettre::address::AddressError| NotifyError::Address {
            address: address.to_string(),
            reason: e.to_string(),
        })
    };
    Message::builder()
        .from(parse(from)?)
        .to(parse(&email.to)?)
        .subject(email.subject)
        .header(ContentType::TEXT_HTML)
        .body(email.html)
        .map_err(|e| NotifyError::Build(e.to_string()))
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, email: OutgoingEmail) -> Result<(), NotifyError> {
        let to = email.to.clone();
        let message = build_message(&self.from, email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        tracing::debug!(%to, "email sent");
        Ok(())
    }
}

impl std::fmt::Debug for SmtpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpNotifier").field("from", &self.from).finish_non_exhaustive()
    }
}

/// Logs the envelope and sends nothing. Used when SMTP is not configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, email: OutgoingEmail) -> Result<(), NotifyError> {
        tracing::info!(to = %email.to, subject = %email.subject, "smtp not configured; email not sent");
        Ok(())
    }
}
