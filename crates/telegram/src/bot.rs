//! Bot startup handshake and the long-polling loop.

use std::sync::Arc;

use {
    secrecy::{ExposeSecret, Secret},
    teloxide::{
        ApiError, RequestError,
        prelude::*,
        types::{AllowedUpdate, BotCommand, UpdateKind},
    },
    tokio_util::{sync::CancellationToken, task::TaskTracker},
    tracing::{debug, info, warn},
};

use mailferry_relay::Relay;

use crate::handlers;

/// Build the bot and run the startup handshake: verify the token, clear any
/// webhook so long polling works, and register slash commands.
pub async fn connect(token: &Secret<String>) -> anyhow::Result<Bot> {
    // Client timeout above the long-polling timeout (30s) so the HTTP
    // client doesn't abort the request before Telegram responds.
    let client = teloxide::net::default_reqwest_settings()
        .timeout(std::time::Duration::from_secs(45))
        .build()?;
    let bot = Bot::with_client(token.expose_secret(), client);

    let me = bot.get_me().await?;
    bot.delete_webhook().send().await?;

    let commands = vec![
        BotCommand::new("start", "What this bot does"),
        BotCommand::new("help", "How to send files"),
    ];
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!("failed to register bot commands: {e}");
    }

    info!(username = ?me.username, "telegram bot connected (webhook cleared)");
    Ok(bot)
}

/// Start polling for updates, handing each message to its own task.
///
/// Returns a token that stops the loop when cancelled. The loop also
/// cancels it itself when Telegram reports another instance polling with
/// the same token. Relay tasks are spawned on `tracker` so shutdown can
/// await the in-flight operations (and their spool cleanup).
pub fn start_polling(bot: Bot, relay: Arc<Relay>, tracker: TaskTracker) -> CancellationToken {
    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        info!("starting telegram polling loop");
        let mut offset: i32 = 0;

        loop {
            if cancel_clone.is_cancelled() {
                info!("telegram polling stopped");
                break;
            }

            let result = bot
                .get_updates()
                .offset(offset)
                .timeout(30)
                .allowed_updates(vec![AllowedUpdate::Message])
                .await;

            match result {
                Ok(updates) => {
                    debug!(count = updates.len(), "got telegram updates");
                    for update in updates {
                        offset = update.id.as_offset();
                        match update.kind {
                            UpdateKind::Message(msg) => {
                                let bot = bot.clone();
                                let relay = Arc::clone(&relay);
                                // Each message is handled independently;
                                // one sender's slow fetch never blocks
                                // another's delivery.
                                tracker.spawn(async move {
                                    let chat_id = msg.chat.id.0;
                                    if let Err(e) = handlers::handle_message(bot, msg, relay).await
                                    {
                                        warn!(
                                            chat_id,
                                            error = %e,
                                            "error handling telegram message"
                                        );
                                    }
                                });
                            },
                            other => {
                                debug!("ignoring non-message update: {other:?}");
                            },
                        }
                    }
                },
                Err(e) => {
                    // Another instance polling the same token is fatal for
                    // this loop; transient failures back off and retry.
                    if matches!(&e, RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) {
                        warn!(
                            "telegram polling stopped: another instance is already running \
                             with this token"
                        );
                        cancel_clone.cancel();
                        break;
                    }

                    warn!(error = %e, "telegram getUpdates failed");
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                },
            }
        }
    });

    cancel
}
