// src/notify/telegram.rs

use crate::scraper::browser_client;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("request failed: {0}")]
    Request(String),
}

/// Outbound side of the bot: one text message, or one group of photos.
pub trait BotTransport {
    fn send_message(&self, text: &str) -> Result<(), TransportError>;
    fn send_media_group(&self, photo_urls: &[String]) -> Result<(), TransportError>;
}

/// Checks whether a listing page still resolves before it is announced.
pub trait LinkProbe {
    fn is_live(&self, url: &str) -> Result<bool, TransportError>;
}

#[derive(Serialize)]
struct MessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct InputMediaPhoto<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media: &'a str,
}

#[derive(Serialize)]
struct MediaGroupPayload<'a> {
    chat_id: &'a str,
    media: Vec<InputMediaPhoto<'a>>,
}

#[derive(Deserialize)]
struct ErrorBody {
    parameters: Option<ResponseParameters>,
}

#[derive(Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

pub struct TelegramClient {
    bot_url: String,
    chat_id: String,
    client: Client,
}

impl TelegramClient {
    pub fn new(bot_url: String, chat_id: String, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            bot_url,
            chat_id,
            client,
        })
    }

    fn post<T: Serialize>(&self, method: &str, payload: &T) -> Result<(), TransportError> {
        let resp = self
            .client
            .post(format!("{}/{}", self.bot_url, method))
            .json(payload)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp.text().unwrap_or_else(|_| "(no body)".to_string());
        Err(classify_failure(status, body))
    }
}

/// A 429 whose body names `parameters.retry_after` is a rate limit; anything else is
/// a plain API error.
fn classify_failure(status: StatusCode, body: String) -> TransportError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.parameters)
            .and_then(|p| p.retry_after);
        if let Some(retry_after) = retry_after {
            return TransportError::RateLimited { retry_after };
        }
    }

    TransportError::Api {
        status: status.as_u16(),
        body,
    }
}

impl BotTransport for TelegramClient {
    fn send_message(&self, text: &str) -> Result<(), TransportError> {
        self.post(
            "sendMessage",
            &MessagePayload {
                chat_id: &self.chat_id,
                text,
            },
        )
    }

    fn send_media_group(&self, photo_urls: &[String]) -> Result<(), TransportError> {
        let media = photo_urls
            .iter()
            .map(|url| InputMediaPhoto {
                kind: "photo",
                media: url,
            })
            .collect();

        self.post(
            "sendMediaGroup",
            &MediaGroupPayload {
                chat_id: &self.chat_id,
                media,
            },
        )
    }
}

/// Plain GET against the listing URL; any 2xx counts as live.
pub struct HttpLinkProbe {
    client: Client,
}

impl HttpLinkProbe {
    /// Same browser identity as the page fetcher, so the site treats both alike.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client =
            browser_client(timeout).map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

impl LinkProbe for HttpLinkProbe {
    fn is_live(&self, url: &str) -> Result<bool, TransportError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(resp.status().is_success())
    }
}
