// src/services/telegram.rs

//! Telegram Bot API notifier.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Markup, TelegramConfig};
use crate::utils::http::endpoint;

use super::Notifier;

/// `sendMessage` request body.
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages to one chat through the Bot API.
pub struct TelegramNotifier {
    client: Client,
    /// Contains the bot token; never log it
    send_url: Url,
    chat_id: String,
    parse_mode: Option<&'static str>,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig, client: Client) -> Result<Self> {
        let send_url = endpoint(
            &config.api_base,
            &format!("bot{}/sendMessage", config.token.trim()),
        )?;
        let parse_mode = match config.markup {
            Markup::Html => Some("HTML"),
            Markup::Plain => None,
        };

        Ok(Self {
            client,
            send_url,
            chat_id: config.chat_id.clone(),
            parse_mode,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: self.parse_mode,
        };

        // Strip the URL from transport errors so the token stays out of logs
        let response = self
            .client
            .post(self.send_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        let status = response.status();
        let reply_body = response
            .text()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        match serde_json::from_str::<ApiResponse>(&reply_body) {
            Ok(reply) if status.is_success() && reply.ok => Ok(()),
            Ok(reply) => Err(AppError::send_failed(
                status.as_u16(),
                reply
                    .description
                    .unwrap_or_else(|| "request rejected".to_string()),
            )),
            Err(_) if status.is_success() => {
                log::debug!("Unparseable sendMessage reply accepted: {}", reply_body);
                Ok(())
            }
            Err(_) => Err(AppError::send_failed(status.as_u16(), reply_body.trim())),
        }
    }
}
