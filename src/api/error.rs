use std::io;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by calls to the music backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error! status: {0}")]
    Status(StatusCode),

    /// The backend answered but refused the request; carries its message.
    #[error("{0}")]
    Rejected(String),

    /// Rejected on our side before any request was made.
    #[error("{0}")]
    InvalidInput(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
