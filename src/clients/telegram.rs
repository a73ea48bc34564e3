//! Telegram Bot API client.
//!
//! Covers the one method this service needs: `sendMessage`. Party
//! announcements go to the configured group chat; reset codes go to the
//! user's own chat, whose id equals their Telegram id.

use anyhow::Result;
use reqwest::Client;
use serde::Serialize;

pub const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_base_url: String,
    bot_token: String,
}

impl TelegramClient {
    #[must_use]
    pub fn new(bot_token: String) -> Self {
        Self {
            client: Client::new(),
            api_base_url: TELEGRAM_API.to_string(),
            bot_token,
        }
    }

    /// Preferred constructor, reusing the process-wide HTTP client. The
    /// base URL is overridable so tests can point at a local stub.
    #[must_use]
    pub const fn with_shared_client(
        client: Client,
        bot_token: String,
        api_base_url: String,
    ) -> Self {
        Self {
            client,
            api_base_url,
            bot_token,
        }
    }

    /// Sends an HTML-formatted message to a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        // The token is part of the URL; never log it.
        let url = format!("{}/bot{}/sendMessage", self.api_base_url, self.bot_token);

        let response = self
            .client
            .post(&url)
            .json(&SendMessageRequest {
                chat_id,
                text,
                parse_mode: "HTML",
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Telegram API error: {} - {}", status, body));
        }

        Ok(())
    }
}
