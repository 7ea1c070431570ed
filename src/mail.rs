// Email delivery of template documents
//
// Messages are built with lettre (plain-text body plus the PDF as an
// attachment) and handed to a MailTransport. The default transport logs in to
// an SMTP relay over STARTTLS; a sendmail-compatible command can be
// configured instead.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub use lettre::address::Envelope;

use crate::config::constants::{MAIL_BODY, MAIL_SUBJECT};
use crate::config::MailConfig;
use crate::errors::{AssistantError, AssistantResult};

const MISSING_INPUT: &str = "Please enter an email and select a document.";

/// Delivers a fully rendered RFC 5322 message to the envelope recipients
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, envelope: &Envelope, message: &[u8]) -> Result<()>;
}

/// Authenticated SMTP submission (STARTTLS)
pub struct SmtpMailTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    pub fn new(host: &str, port: u16, username: String, password: String) -> Result<Self> {
        let inner = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .with_context(|| format!("Invalid SMTP relay '{}'", host))?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();
        Ok(Self { inner })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn deliver(&self, envelope: &Envelope, message: &[u8]) -> Result<()> {
        self.inner
            .send_raw(envelope, message)
            .await
            .context("SMTP delivery failed")?;
        Ok(())
    }
}

/// Pipes the message into a sendmail-compatible command.
///
/// Recipients come from the envelope and are passed as arguments, never read
/// back out of the message headers.
pub struct SendmailTransport {
    command: Vec<String>,
}

impl SendmailTransport {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl MailTransport for SendmailTransport {
    async fn deliver(&self, envelope: &Envelope, message: &[u8]) -> Result<()> {
        let (program, args) = self
            .command
            .split_first()
            .context("mail command is empty")?;
        let recipients: Vec<String> = envelope.to().iter().map(|a| a.to_string()).collect();

        let mut child = Command::new(program)
            .args(args)
            .arg("--")
            .args(&recipients)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start mail command '{}'", program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(message)
                .await
                .context("Failed to write message to mail command")?;
        }

        let output = child
            .wait_with_output()
            .await
            .context("Mail command did not finish")?;

        if !output.status.success() {
            bail!(
                "mail command exited with {} while sending to {}: {}",
                output.status,
                recipients.join(", "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

/// Document attached to an outgoing message
pub struct DocumentAttachment<'a> {
    pub file_name: &'a str,
    pub content: &'a [u8],
}

fn reject_line_breaks(field: &str, value: &str) -> Result<()> {
    if value.contains(['\r', '\n']) {
        bail!("{} must not contain line breaks", field);
    }
    Ok(())
}

/// Build a multipart/mixed message with an optional PDF attachment
pub fn build_message(
    from: &Address,
    to: &Address,
    subject: &str,
    body: &str,
    attachment: Option<DocumentAttachment<'_>>,
) -> Result<Message> {
    reject_line_breaks("subject", subject)?;

    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(body.to_string()));
    if let Some(attachment) = attachment {
        reject_line_breaks("attachment name", attachment.file_name)?;
        let pdf = ContentType::parse("application/pdf")
            .map_err(|e| anyhow!("invalid content type: {}", e))?;
        parts = parts.singlepart(
            Attachment::new(attachment.file_name.to_string()).body(attachment.content.to_vec(), pdf),
        );
    }

    Message::builder()
        .from(Mailbox::new(None, from.clone()))
        .to(Mailbox::new(None, to.clone()))
        .subject(subject)
        .multipart(parts)
        .context("Failed to build message")
}

/// A single bare `local@domain` address
fn parse_recipient(to: &str) -> AssistantResult<Address> {
    let to = to.trim();
    if to.is_empty() {
        return Err(AssistantError::InvalidRequest(MISSING_INPUT.to_string()));
    }

    let invalid = || AssistantError::InvalidRequest(format!("Invalid email address '{}'", to.escape_debug()));
    if to.contains(['\r', '\n', ',', ';']) {
        return Err(invalid());
    }
    to.parse::<Address>().map_err(|_| invalid())
}

pub struct Mailer {
    config: MailConfig,
    transport: Option<Arc<dyn MailTransport>>,
}

impl Mailer {
    /// Mailer using SMTP, or the configured sendmail command
    pub fn new(config: MailConfig) -> Self {
        let transport = match (&config.username, &config.password) {
            (Some(user), Some(pass)) if config.has_credentials() => {
                if config.uses_sendmail() {
                    let transport: Arc<dyn MailTransport> =
                        Arc::new(SendmailTransport::new(config.command.clone()));
                    Some(transport)
                } else {
                    match SmtpMailTransport::new(
                        &config.smtp_host,
                        config.smtp_port,
                        user.clone(),
                        pass.clone(),
                    ) {
                        Ok(smtp) => Some(Arc::new(smtp) as Arc<dyn MailTransport>),
                        Err(e) => {
                            tracing::warn!("mail disabled: {:#}", e);
                            None
                        }
                    }
                }
            }
            _ => None,
        };
        Self { config, transport }
    }

    pub fn with_transport(config: MailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            config,
            transport: Some(transport),
        }
    }

    /// Credentials are present and a transport exists; delivery may still fail
    pub fn is_configured(&self) -> bool {
        self.config.has_credentials() && self.transport.is_some()
    }

    /// Email `document` to `to` with the fixed subject and body
    pub async fn send_document(&self, to: &str, document: &Path) -> AssistantResult<()> {
        if !self.is_configured() {
            return Err(AssistantError::MailNotConfigured);
        }
        let (Some(username), Some(transport)) = (self.config.username.as_deref(), &self.transport)
        else {
            return Err(AssistantError::MailNotConfigured);
        };

        let recipient = parse_recipient(to)?;
        let from = username.trim().parse::<Address>().map_err(|e| {
            AssistantError::MailDelivery(format!("SMTP_USERNAME is not an email address: {}", e))
        })?;

        let file_name = document
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AssistantError::InvalidRequest(MISSING_INPUT.to_string()))?;

        let content = tokio::fs::read(document).await.map_err(|e| {
            AssistantError::MailDelivery(format!("cannot read {}: {}", document.display(), e))
        })?;

        let message = build_message(
            &from,
            &recipient,
            MAIL_SUBJECT,
            MAIL_BODY,
            Some(DocumentAttachment {
                file_name,
                content: &content,
            }),
        )
        .map_err(|e| AssistantError::InvalidRequest(format!("{:#}", e)))?;

        let to = recipient.to_string();
        match transport.deliver(message.envelope(), &message.formatted()).await {
            Ok(()) => {
                tracing::info!(to = %to, document = file_name, "document sent");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(to = %to, "mail delivery failed: {:#}", e);
                Err(AssistantError::MailDelivery(format!("{:#}", e)))
            }
        }
    }
}
