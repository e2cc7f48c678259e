/// Mail transports
///
/// [`Mailer`] is the seam between notification logic and delivery. The server
/// picks one implementation at startup:
///
/// - [`SmtpMailer`]: STARTTLS SMTP relay via lettre's async tokio transport
/// - [`LogMailer`]: logs each message instead of sending it (no SMTP configured)
/// - [`MemoryMailer`]: keeps messages in memory for inspection
///
/// # Example
///
/// ```
/// use pmboard_shared::notify::mailer::{Mailer, MemoryMailer, OutgoingEmail};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mailer = MemoryMailer::new();
/// mailer.send(OutgoingEmail {
///     to: "developer1@example.com".to_string(),
///     subject: "Task Updated: Setup".to_string(),
///     html_body: "<p>hi</p>".to_string(),
/// }).await?;
///
/// assert_eq!(mailer.sent().await.len(), 1);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Errors produced by mail transports
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Sender or recipient address did not parse
    #[error("Invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Transport could not be configured
    #[error("Mail transport configuration error: {0}")]
    Config(String),

    /// Message could not be assembled
    #[error("Failed to build email: {0}")]
    Build(String),

    /// The transport accepted the call but delivery failed
    #[error("Email delivery failed: {0}")]
    DeliveryFailed(String),
}

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Delivers rendered emails
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Transport name for logs
    fn name(&self) -> &'static str;

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

/// SMTP connection settings
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,

    /// Sender address, e.g. `Project Dashboard <noreply@example.com>`
    pub from: String,
}

/// STARTTLS SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let from = parse_mailbox(&config.from)?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailError::Config(e.to_string()))?
            .port(config.port);

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        info!(host = %config.host, port = config.port, "SMTP mailer configured");

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html_body)
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::DeliveryFailed(e.to_string()))?;

        debug!(to = %email.to, "Email handed to SMTP relay");
        Ok(())
    }
}

/// Logs messages instead of delivering them
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        parse_mailbox(&email.to)?;
        info!(
            to = %email.to,
            subject = %email.subject,
            "SMTP not configured; email not sent"
        );
        Ok(())
    }
}

/// Collects messages in memory
#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<OutgoingEmail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, oldest first
    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        parse_mailbox(&email.to)?;
        self.outbox.lock().await.push(email);
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            to: to.to_string(),
            subject: "Task Completed: Setup React Native Environment".to_string(),
            html_body: "<p>done</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_mailer_records() {
        let mailer = MemoryMailer::new();
        mailer.send(email("testuser@example.com")).await.unwrap();
        mailer.send(email("manager1@example.com")).await.unwrap();

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].to, "manager1@example.com");
    }

    #[tokio::test]
    async fn test_invalid_recipient_rejected() {
        let mailer = MemoryMailer::new();
        let result = mailer.send(email("not-an-address")).await;

        assert!(matches!(result, Err(MailError::InvalidAddress { .. })));
        assert!(mailer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_valid_address() {
        assert!(LogMailer.send(email("developer1@example.com")).await.is_ok());
        assert!(LogMailer.send(email("")).await.is_err());
    }

    #[test]
    fn test_smtp_mailer_rejects_bad_sender() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: None,
            password: None,
            from: "no at sign".to_string(),
        };

        assert!(matches!(
            SmtpMailer::new(&config),
            Err(MailError::InvalidAddress { .. })
        ));
    }
}
