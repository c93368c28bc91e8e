//! Structured error types for the log fetcher.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
  #[error("http: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{url} returned {status}")]
  Status { url: String, status: u16 },

  #[error("{url} returned non-UTF-8 text: {reason}")]
  InvalidUtf8 { url: String, reason: String },

  #[error("{0} returned an empty body")]
  EmptyBody(String),

  #[error("crumb issuer response: {0}")]
  Crumb(String),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}
