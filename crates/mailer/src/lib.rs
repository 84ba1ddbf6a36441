//! SMTP implementation of the relay's mail transport, built on lettre.
//!
//! One authenticated STARTTLS session per delivery, exactly one attempt per
//! envelope; retrying is the sender's decision, not ours.

use {
    async_trait::async_trait,
    lettre::{
        AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
        transport::smtp::authentication::Credentials,
    },
    secrecy::ExposeSecret,
    thiserror::Error,
    tracing::debug,
};

use {
    mailferry_config::SmtpConfig,
    mailferry_relay::{MailEnvelope, MailTransport, TransportError},
};

/// Startup-time construction failures. Anything that can be caught before
/// the event source starts polling belongs here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid mailbox address {address:?}: {source}")]
    Mailbox {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("could not configure smtp relay {server:?}: {source}")]
    Relay {
        server: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },
}

/// Sends envelopes through an authenticated STARTTLS SMTP session.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport and validate the configured addresses, so a bad
    /// deployment fails at startup instead of on the first attachment.
    pub fn new(config: &SmtpConfig) -> Result<Self, Error> {
        parse_mailbox(&config.from)?;
        parse_mailbox(&config.to)?;

        let credentials = Credentials::new(
            config.from.clone(),
            config.password.expose_secret().clone(),
        );
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
            .map_err(|source| Error::Relay {
                server: config.server.clone(),
                source,
            })?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, envelope: MailEnvelope) -> Result<(), TransportError> {
        let attachment_name = envelope.attachment_name.clone();
        let message = assemble(envelope)?;

        match self.transport.send(message).await {
            Ok(response) => {
                debug!(
                    attachment = %attachment_name,
                    code = %response.code(),
                    "smtp delivery accepted"
                );
                Ok(())
            },
            Err(source) => Err(TransportError::Delivery {
                source: Box::new(source),
            }),
        }
    }
}

/// Turn an envelope into a multipart/mixed wire message: one plain-text
/// part plus the single binary attachment.
fn assemble(envelope: MailEnvelope) -> Result<Message, TransportError> {
    let from = parse_envelope_mailbox(&envelope.from)?;
    let to = parse_envelope_mailbox(&envelope.to)?;

    let attachment = Attachment::new(envelope.attachment_name.clone()).body(
        envelope.attachment_bytes,
        attachment_content_type(&envelope.attachment_name),
    );

    Message::builder()
        .from(from)
        .to(to)
        .subject(envelope.subject)
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(envelope.body_text))
                .singlepart(attachment),
        )
        .map_err(|source| TransportError::Message {
            reason: source.to_string(),
        })
}

fn parse_mailbox(address: &str) -> Result<Mailbox, Error> {
    address.parse().map_err(|source| Error::Mailbox {
        address: address.to_owned(),
        source,
    })
}

fn parse_envelope_mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address.parse().map_err(|source| TransportError::Message {
        reason: format!("invalid mailbox address {address:?}: {source}"),
    })
}

/// Content type for the attachment part, guessed from the file name with an
/// octet-stream fallback.
fn attachment_content_type(file_name: &str) -> ContentType {
    let mime = mime_guess::from_path(file_name).first_or_octet_stream();
    ContentType::parse(mime.essence_str()).unwrap_or(ContentType::TEXT_PLAIN)
}
