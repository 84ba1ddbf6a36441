use thiserror::Error;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// Materializing an attachment failed. No spooled file exists when this is
/// returned; there is nothing for the caller to clean up.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The event source rejected the attachment reference (bad or expired
    /// file id).
    #[error("attachment reference rejected by the source: {reason}")]
    BadReference { reason: String },

    #[error("attachment transfer failed: {source}")]
    Transfer { source: Source },

    #[error("could not spool attachment to temporary storage: {source}")]
    Spool {
        #[from]
        source: std::io::Error,
    },
}

/// Building the mail envelope failed.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The spooled file could not be read back. Should not happen under the
    /// single-owner spool discipline, but storage I/O can fail on its own.
    #[error("could not read spooled attachment {name:?}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// The mail transport could not deliver the envelope.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The envelope could not be assembled into a wire message.
    #[error("could not assemble mail message: {reason}")]
    Message { reason: String },

    /// Connection, authentication or protocol-level failure talking to the
    /// mail server.
    #[error("smtp delivery failed: {source}")]
    Delivery { source: Source },
}
