use crate::data_models::UserId;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("message rejected: {0}")]
    Rejected(String),
    #[error("send timed out after {0:?}")]
    Timeout(Duration),
}

/// Delivers one text message to one recipient. Calls are independent of each other.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &UserId, text: &str) -> Result<(), NotifyError>;
}
