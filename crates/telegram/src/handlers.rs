//! Per-message handling: command replies and attachment extraction.

use std::sync::Arc;

use {
    teloxide::{
        Bot,
        prelude::*,
        types::{MediaKind, Message, MessageKind},
    },
    tracing::debug,
};

use mailferry_relay::{InboundAttachment, Relay, SenderInfo};

use crate::status::TelegramStatusLine;

pub(crate) const GREETING: &str = "\u{1f44b} Hi! I relay files to email.\n\n\
    \u{1f4ce} Send me a file (PDF, PNG, JPEG) and I will forward it to the \
    configured address.\n\n\
    Supported formats:\n\
    \u{2022} PDF documents\n\
    \u{2022} Images (PNG, JPEG, JPG)";

pub(crate) const HELP: &str = "\u{2139}\u{fe0f} How it works:\n\n\
    1. Send me a file (PDF, PNG, JPEG)\n\
    2. I forward it to email automatically\n\
    3. You get a delivery confirmation\n\n\
    Commands:\n\
    /start - Getting started\n\
    /help - This message";

/// Handle one inbound message end to end.
///
/// Attachments run through the relay, which owns all user-visible status
/// reporting; command replies are handled here. Errors surfacing from this
/// function are logged by the polling loop and never stop it.
pub async fn handle_message(bot: Bot, msg: Message, relay: Arc<Relay>) -> anyhow::Result<()> {
    if let Some(text) = msg.text() {
        return handle_command(&bot, &msg, text).await;
    }

    let Some(attachment) = extract_attachment(&msg) else {
        debug!(chat_id = msg.chat.id.0, "ignoring message without a relayable attachment");
        return Ok(());
    };

    let status = TelegramStatusLine::new(bot, msg.chat.id);
    relay.relay(attachment, &status).await;
    Ok(())
}

async fn handle_command(bot: &Bot, msg: &Message, text: &str) -> anyhow::Result<()> {
    let command = text.trim();
    if command.starts_with("/start") {
        bot.send_message(msg.chat.id, GREETING).await?;
    } else if command.starts_with("/help") {
        bot.send_message(msg.chat.id, HELP).await?;
    } else {
        debug!(chat_id = msg.chat.id.0, "ignoring text message");
    }
    Ok(())
}

/// Extract a relayable attachment (document or photo) from a message.
///
/// Documents without a declared name get a synthesized `file_<unique_id>`
/// one, which then runs through the normal extension gate. Photos have no
/// name at all on the wire; the largest size is taken and named
/// `photo_<unique_id>.jpg`, so the gate accepts them by construction.
fn extract_attachment(msg: &Message) -> Option<InboundAttachment> {
    let MessageKind::Common(common) = &msg.kind else {
        return None;
    };
    let sender = sender_info(msg);

    match &common.media_kind {
        MediaKind::Document(d) => {
            let declared_name = d
                .document
                .file_name
                .clone()
                .unwrap_or_else(|| format!("file_{}", d.document.file.unique_id));
            Some(InboundAttachment {
                reference: d.document.file.id.clone(),
                declared_name,
                sender,
            })
        },
        MediaKind::Photo(p) => {
            // Largest size is last; Telegram photos are always JPEG.
            p.photo.last().map(|size| InboundAttachment {
                reference: size.file.id.clone(),
                declared_name: format!("photo_{}.jpg", size.file.unique_id),
                sender,
            })
        },
        _ => None,
    }
}

fn sender_info(msg: &Message) -> SenderInfo {
    match &msg.from {
        Some(user) => SenderInfo {
            display_name: user.full_name(),
            handle: user.username.clone(),
        },
        None => SenderInfo {
            display_name: "unknown sender".into(),
            handle: None,
        },
    }
}
