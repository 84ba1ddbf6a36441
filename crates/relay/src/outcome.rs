//! Terminal outcome of one relay operation.

/// What happened to a single inbound attachment. Drives the terminal status
/// text shown to the sender and the structured log entry; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The mail transport accepted the message.
    Delivered,
    /// The declared name failed the extension whitelist.
    Rejected { extension: Option<String> },
    /// A stage past validation failed; the operation was aborted.
    Failed { stage: FailureStage },
}

/// Which pipeline stage aborted a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Fetch,
    Compose,
    Send,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Fetch => "fetch",
            Self::Compose => "compose",
            Self::Send => "send",
        })
    }
}
