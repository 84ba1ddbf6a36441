//! Materializes Telegram attachments through the Bot API file endpoint.

use {
    async_trait::async_trait,
    teloxide::{Bot, RequestError, prelude::Requester},
    tracing::debug,
};

use mailferry_relay::{AttachmentFetcher, FetchError, InboundAttachment, MaterializedFile};

pub struct TelegramFetcher {
    bot: Bot,
}

impl TelegramFetcher {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl AttachmentFetcher for TelegramFetcher {
    async fn fetch(
        &self,
        attachment: &InboundAttachment,
    ) -> Result<MaterializedFile, FetchError> {
        // Resolve the file id to a server-side path. An API-level error
        // means the reference itself is bad or expired; anything else is a
        // transfer problem.
        let file = self
            .bot
            .get_file(attachment.reference.as_str())
            .await
            .map_err(|e| match e {
                RequestError::Api(api) => FetchError::BadReference {
                    reason: api.to_string(),
                },
                other => FetchError::Transfer {
                    source: Box::new(other),
                },
            })?;

        // Telegram file URL format: https://api.telegram.org/file/bot<token>/<file_path>
        // The URL embeds the bot token, so reqwest errors are stripped of it
        // before they can reach a log line.
        let url = format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.bot.token(),
            file.path
        );
        let response = reqwest::get(&url).await.map_err(|e| FetchError::Transfer {
            source: Box::new(e.without_url()),
        })?;
        if !response.status().is_success() {
            return Err(FetchError::Transfer {
                source: format!("download failed: HTTP {}", response.status()).into(),
            });
        }
        let bytes = response.bytes().await.map_err(|e| FetchError::Transfer {
            source: Box::new(e.without_url()),
        })?;

        debug!(
            file = %attachment.declared_name,
            bytes = bytes.len(),
            "downloaded attachment"
        );

        Ok(MaterializedFile::write(&attachment.declared_name, &bytes)?)
    }
}
