//! The single evolving status line shown to a sender.

use {
    async_trait::async_trait,
    teloxide::{
        Bot,
        prelude::*,
        types::{ChatId, MessageId},
    },
    tokio::sync::Mutex,
    tracing::warn,
};

use mailferry_relay::StatusSink;

/// Sends the first update as a new message and edits it thereafter, so each
/// attachment gets exactly one status line in the chat.
pub struct TelegramStatusLine {
    bot: Bot,
    chat_id: ChatId,
    message_id: Mutex<Option<MessageId>>,
}

impl TelegramStatusLine {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            bot,
            chat_id,
            message_id: Mutex::new(None),
        }
    }
}

#[async_trait]
impl StatusSink for TelegramStatusLine {
    async fn update(&self, text: &str) {
        let mut message_id = self.message_id.lock().await;
        let result = match *message_id {
            Some(id) => self.bot.edit_message_text(self.chat_id, id, text).await,
            None => self.bot.send_message(self.chat_id, text).await,
        };
        // Best effort: a dropped status update never changes the outcome.
        match result {
            Ok(message) => *message_id = Some(message.id),
            Err(e) => warn!(chat_id = self.chat_id.0, error = %e, "status update failed"),
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        axum::{
            Router,
            body::Bytes,
            extract::State,
            http::Uri,
            response::Json,
            routing::post,
        },
        serde_json::{Value, json},
        std::sync::{Arc, Mutex as StdMutex},
        tokio::sync::oneshot,
    };

    #[derive(Clone, Default)]
    struct MockBotApi {
        requests: Arc<StdMutex<Vec<(String, Value)>>>,
    }

    async fn bot_api_handler(
        State(state): State<MockBotApi>,
        uri: Uri,
        body: Bytes,
    ) -> Json<Value> {
        let method = uri
            .path()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        state.requests.lock().unwrap().push((method, body));

        // Both SendMessage and EditMessageText return a Message.
        Json(json!({
            "ok": true,
            "result": {
                "message_id": 7,
                "date": 0,
                "chat": { "id": 42, "type": "private" },
                "text": "ok"
            }
        }))
    }

    async fn start_mock_api(state: MockBotApi) -> (String, oneshot::Sender<()>) {
        let app = Router::new()
            .route("/{*path}", post(bot_api_handler))
            .with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });
        (format!("http://{addr}/"), shutdown_tx)
    }

    #[tokio::test]
    async fn first_update_sends_then_later_updates_edit_in_place() {
        let api = MockBotApi::default();
        let (url, _shutdown) = start_mock_api(api.clone()).await;

        let bot = Bot::new("test-token").set_api_url(reqwest::Url::parse(&url).unwrap());
        let status = TelegramStatusLine::new(bot, ChatId(42));

        status.update("receiving").await;
        status.update("sending").await;
        status.update("done").await;

        let requests = api.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 3);

        let (method, body) = &requests[0];
        assert_eq!(method, "SendMessage");
        assert_eq!(body["chat_id"], json!(42));
        assert_eq!(body["text"], json!("receiving"));

        for (method, body) in &requests[1..] {
            assert_eq!(method, "EditMessageText");
            assert_eq!(body["chat_id"], json!(42));
            assert_eq!(body["message_id"], json!(7));
        }
        assert_eq!(requests[2].1["text"], json!("done"));
    }

    #[tokio::test]
    async fn unreachable_api_is_swallowed() {
        // Port 1 refuses connections; the sink must not panic or propagate.
        let bot =
            Bot::new("test-token").set_api_url(reqwest::Url::parse("http://127.0.0.1:1/").unwrap());
        let status = TelegramStatusLine::new(bot, ChatId(42));
        status.update("receiving").await;
    }
}
