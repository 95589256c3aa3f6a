use thiserror::Error;

pub type AdsResult<T> = Result<T, AdsError>;

#[derive(Error, Debug)]
pub enum AdsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Ads API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
