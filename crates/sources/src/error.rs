use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected payload shape: {0}")]
    Payload(String),
}

pub type Result<T> = std::result::Result<T, SourceError>;
