mod poller;

pub use poller::CommandPoller;

use crate::data_models::UserId;
use crate::notifier::{Notifier, NotifyError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("request to bot api failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("bot api answered with an error: {0}")]
    Api(String),
    #[error("invalid bot api url: {0}")]
    Url(#[from] url::ParseError),
}

impl From<TelegramError> for NotifyError {
    fn from(err: TelegramError) -> Self {
        match err {
            TelegramError::Transport(err) => NotifyError::Transport(err),
            other => NotifyError::Rejected(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub from: Option<Sender>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Sender {
    pub id: i64,
}

impl IncomingMessage {
    /// The sending user, or the chat itself when the sender is hidden.
    pub fn sender(&self) -> UserId {
        self.from.map(|from| from.id).unwrap_or(self.chat.id).into()
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

/// Minimal Bot API client: sends messages and long-polls for updates.
#[derive(Debug, Clone)]
pub struct TelegramBot {
    client: Client,
    base_url: Url,
}

impl TelegramBot {
    pub fn new(api_url: &str, token: &str, request_timeout: Duration) -> Result<Self, TelegramError> {
        let base_url = Url::parse(&format!("{}/bot{}/", api_url.trim_end_matches('/'), token))?;
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), TelegramError> {
        let url = self.base_url.join("sendMessage")?;
        let request = self.client.post(url).json(&SendMessage { chat_id, text });
        let _: serde_json::Value = Self::call(request).await?;
        Ok(())
    }

    pub async fn get_updates(
        &self,
        offset: i64,
        long_poll: Duration,
    ) -> Result<Vec<Update>, TelegramError> {
        let url = self.base_url.join("getUpdates")?;
        let request = self
            .client
            .post(url)
            .timeout(long_poll + Duration::from_secs(10))
            .json(&GetUpdates {
                offset,
                timeout: long_poll.as_secs(),
                allowed_updates: ["message"],
            });
        Self::call(request).await
    }

    async fn call<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, TelegramError> {
        let response: ApiResponse<T> = request.send().await?.json().await?;
        match (response.ok, response.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::Api(
                response
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            )),
        }
    }
}

#[async_trait]
impl Notifier for TelegramBot {
    async fn send(&self, recipient: &UserId, text: &str) -> Result<(), NotifyError> {
        self.send_message(recipient.as_str(), text)
            .await
            .map_err(NotifyError::from)
    }
}
