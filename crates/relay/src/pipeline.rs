//! The relay orchestrator: drives one inbound attachment from validation to
//! terminal status, guaranteeing the spooled file is reclaimed.

use std::sync::Arc;

use {
    async_trait::async_trait,
    tracing::{info, warn},
};

use crate::{
    envelope::{self, MailEnvelope, SenderInfo},
    error::{FetchError, TransportError},
    outcome::{FailureStage, RelayOutcome},
    policy,
    spool::MaterializedFile,
};

/// One inbound attachment event from the chat platform. Immutable; lives
/// for exactly one relay operation.
#[derive(Debug, Clone)]
pub struct InboundAttachment {
    /// Opaque handle the fetcher understands (Telegram file id).
    pub reference: String,
    /// File name as declared by the sender or synthesized by the handler.
    pub declared_name: String,
    pub sender: SenderInfo,
}

/// Materializes an attachment reference into spooled bytes. Ownership of
/// the spooled file transfers to the caller.
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    async fn fetch(&self, attachment: &InboundAttachment)
    -> Result<MaterializedFile, FetchError>;
}

/// Delivers a composed envelope to the mail server. One call, one delivery
/// attempt; no internal retry.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, envelope: MailEnvelope) -> Result<(), TransportError>;
}

/// The single evolving status line shown to the sender. Updates are best
/// effort: a failed update never changes the relay outcome.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn update(&self, text: &str);
}

pub const RECEIVING_NOTICE: &str = "\u{23f3} Receiving file...";
pub const SENDING_NOTICE: &str = "\u{1f4e7} Sending to email...";
pub const FAILURE_NOTICE: &str = "\u{274c} Could not deliver the file. Please try again.";

/// Terminal notice for an attachment that failed the extension whitelist.
pub fn rejection_notice() -> String {
    format!(
        "\u{274c} Unsupported file format.\nSupported formats: {}",
        policy::SUPPORTED_FORMATS_LABEL
    )
}

/// Terminal notice for a delivered attachment, naming the destination.
pub fn success_notice(file_name: &str, recipient: &str) -> String {
    format!("\u{2705} File '{file_name}' delivered to {recipient}")
}

/// Top-level sequencing component. One instance serves all concurrent
/// operations; it holds no per-operation state.
pub struct Relay {
    fetcher: Arc<dyn AttachmentFetcher>,
    transport: Arc<dyn MailTransport>,
    from: String,
    to: String,
}

impl Relay {
    pub fn new(
        fetcher: Arc<dyn AttachmentFetcher>,
        transport: Arc<dyn MailTransport>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            transport,
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn recipient(&self) -> &str {
        &self.to
    }

    /// Consume one inbound attachment end to end.
    ///
    /// Validate, fetch, compose, send, then report — with the spooled file
    /// discarded before the terminal report on every path past a successful
    /// fetch. All failures terminate here as a [`RelayOutcome`]; none
    /// propagate to the caller.
    pub async fn relay(&self, attachment: InboundAttachment, status: &dyn StatusSink) -> RelayOutcome {
        let name = attachment.declared_name.clone();

        // Gate on the declared name before the expensive fetch.
        if !policy::is_supported(&name) {
            let extension = policy::extension_of(&name).map(str::to_owned);
            status.update(&rejection_notice()).await;
            info!(file = %name, extension = ?extension, "attachment rejected");
            return RelayOutcome::Rejected { extension };
        }

        status.update(RECEIVING_NOTICE).await;
        let file = match self.fetcher.fetch(&attachment).await {
            Ok(file) => file,
            Err(e) => {
                // Nothing was spooled; there is nothing to clean up.
                status.update(FAILURE_NOTICE).await;
                warn!(file = %name, stage = %FailureStage::Fetch, error = %e, "relay failed");
                return RelayOutcome::Failed {
                    stage: FailureStage::Fetch,
                };
            },
        };

        status.update(SENDING_NOTICE).await;
        let outcome = match envelope::compose(&file, &attachment.sender, &self.from, &self.to).await
        {
            Ok(envelope) => match self.transport.send(envelope).await {
                Ok(()) => RelayOutcome::Delivered,
                Err(e) => {
                    warn!(file = %name, stage = %FailureStage::Send, error = %e, "relay failed");
                    RelayOutcome::Failed {
                        stage: FailureStage::Send,
                    }
                },
            },
            Err(e) => {
                warn!(file = %name, stage = %FailureStage::Compose, error = %e, "relay failed");
                RelayOutcome::Failed {
                    stage: FailureStage::Compose,
                }
            },
        };

        // Reclaim the spool before reporting; a deletion failure is logged
        // and never masks the already-determined outcome.
        if let Err(e) = file.discard() {
            warn!(file = %name, error = %e, "could not remove spooled attachment");
        }

        match &outcome {
            RelayOutcome::Delivered => {
                status.update(&success_notice(&name, &self.to)).await;
                info!(file = %name, recipient = %self.to, "attachment relayed");
            },
            RelayOutcome::Failed { .. } => status.update(FAILURE_NOTICE).await,
            // Rejection returns early above.
            RelayOutcome::Rejected { .. } => {},
        }

        outcome
    }
}
