use thiserror::Error;

pub type Result<T> = std::result::Result<T, SerperError>;

#[derive(Debug, Error)]
pub enum SerperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serper API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed Serper response: {0}")]
    Malformed(String),
}
