use thiserror::Error;

#[derive(Error, Debug)]
pub enum DBError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("failed to write with serde: {0}")]
    SerdeError(#[from] serde_json::error::Error),
}
