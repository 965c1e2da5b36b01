use chromiumoxide::error::CdpError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Browser error: {0}")]
    BrowserError(#[from] CdpError),

    #[error("Failed to initialise browser session: {0}")]
    SessionInitError(String),

    #[error("Navigation error: {0}")]
    NavigationError(String),

    #[error("Extraction error: {0}")]
    ExtractionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Aggregation failed: {0}")]
    AggregationError(#[source] Box<ScraperError>),
}

pub type ScraperResult<T> = Result<T, ScraperError>;
