//! Error handling for clipfetch

use thiserror::Error;

/// Main error type for clipfetch
///
/// Everything except [`ExtractError::ChainExhausted`] and
/// [`ExtractError::Cancelled`] is recovered inside the orchestrator and only
/// ever shows up in strategy-level log events.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Expected JSON but got content type '{content_type}'")]
    NonJson { content_type: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Service rejected the request: {0}")]
    Rejected(String),

    #[error("All {tried} remote sources failed")]
    AllSourcesFailed { tried: usize },

    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("Failed to extract video info: {0}")]
    ExtractionError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Payload rejected by normalizer: {0}")]
    NormalizationRejected(String),

    #[error("Could not extract video: all {attempts} strategies failed")]
    ChainExhausted { attempts: usize },

    #[error("Extraction cancelled after {attempts} attempts")]
    Cancelled { attempts: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
