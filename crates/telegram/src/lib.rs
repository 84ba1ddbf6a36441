//! Telegram event source for mailferry.
//!
//! Long-polls the Bot API with teloxide, turns document and photo messages
//! into relay operations (one task each), and reports per-attachment status
//! by editing a single message in place.

pub mod bot;
pub mod fetcher;
pub mod handlers;
pub mod status;

pub use {
    bot::{connect, start_polling},
    fetcher::TelegramFetcher,
};
