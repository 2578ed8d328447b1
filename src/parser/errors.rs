use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("failed to request catalog page: {0}")]
    FailedClient(#[from] reqwest::Error),
    #[error("scrapper selector error: {0}")]
    CrawlerSelectorError(String),
    #[error("tokio task error: {0}")]
    TokioTaskError(#[from] tokio::task::JoinError),
    #[error("url parsing error {0}")]
    UrlParsingError(#[from] url::ParseError),
    #[error("catalog fetch timed out after {0:?}")]
    Timeout(Duration),
}
