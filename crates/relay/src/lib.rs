//! The file-relay pipeline: validate an inbound attachment, spool its bytes
//! to transient storage, compose a mail message, hand it to the transport,
//! and reclaim the spooled file on every exit path.
//!
//! This crate is transport- and platform-agnostic: the chat side and the
//! SMTP side plug in through the [`pipeline::AttachmentFetcher`],
//! [`pipeline::MailTransport`] and [`pipeline::StatusSink`] traits.

pub mod envelope;
pub mod error;
pub mod outcome;
pub mod pipeline;
pub mod policy;
pub mod spool;

pub use {
    envelope::{MailEnvelope, SenderInfo},
    error::{ComposeError, FetchError, TransportError},
    outcome::{FailureStage, RelayOutcome},
    pipeline::{AttachmentFetcher, InboundAttachment, MailTransport, Relay, StatusSink},
    spool::MaterializedFile,
};
