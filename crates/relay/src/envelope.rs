//! Mail envelope construction.

use crate::{error::ComposeError, spool::MaterializedFile};

/// Shown in the mail body when the sender has no public handle.
pub const NO_HANDLE_PLACEHOLDER: &str = "no username";

/// Who sent the attachment, as reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderInfo {
    pub display_name: String,
    pub handle: Option<String>,
}

/// A fully composed mail message. Built once per relay operation and
/// consumed exactly once by the transport.
#[derive(Debug, Clone)]
pub struct MailEnvelope {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body_text: String,
    pub attachment_bytes: Vec<u8>,
    pub attachment_name: String,
}

/// Read the spooled bytes back and build the envelope around them.
pub async fn compose(
    file: &MaterializedFile,
    sender: &SenderInfo,
    from: &str,
    to: &str,
) -> Result<MailEnvelope, ComposeError> {
    let attachment_bytes =
        tokio::fs::read(file.path())
            .await
            .map_err(|source| ComposeError::Read {
                name: file.declared_name().to_owned(),
                source,
            })?;

    let name = file.declared_name();
    let handle = sender.handle.as_deref().unwrap_or(NO_HANDLE_PLACEHOLDER);
    let body_text = format!(
        "New file received from the Telegram bot.\n\n\
         File: {name}\n\
         From: {display} (@{handle})\n\n\
         ---\n\
         Sent automatically by mailferry",
        display = sender.display_name,
    );

    Ok(MailEnvelope {
        from: from.to_owned(),
        to: to.to_owned(),
        subject: format!("\u{1f4ce} File from Telegram: {name}"),
        body_text,
        attachment_bytes,
        attachment_name: name.to_owned(),
    })
}
