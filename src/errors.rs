use crate::telegram::TelegramError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("socket address parsing error: {0}")]
    SocketAddressParsingError(#[from] std::net::AddrParseError),
    #[error(transparent)]
    Telegram(#[from] TelegramError),
    #[error("a background task stopped before shutdown was requested")]
    BackgroundTaskStopped,
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("BOT_TOKEN is not set, export it before starting the bot")]
    MissingBotToken,
    #[error("poll interval must be greater than zero seconds")]
    InvalidPollInterval,
    #[error("catalog snapshot must hold at least one product")]
    InvalidSnapshotSize,
    #[error("{0} is not a supported environment. Use either `dev` or `prod`.")]
    UnknownEnvironment(String),
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
}

#[derive(Error, Debug)]
pub enum AppErrors {
    #[error("invalid request: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
    #[error("store task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

impl IntoResponse for AppErrors {
    fn into_response(self) -> Response {
        match self {
            AppErrors::ValidationError(err) => {
                warn!(error = %err, "rejected invalid request");
                (StatusCode::BAD_REQUEST, format!("invalid request: {err}")).into_response()
            }
            AppErrors::TaskError(err) => {
                error!(error = %err, "keyword store task failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
