//! Error type for `castwatch-tmdb`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Transport failure, timeout, or a body that did not deserialise.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("tmdb returned {status}: {message}")]
  Api { status: u16, message: String },
}

impl Error {
  /// Wrap a request error with its URL removed.
  pub(crate) fn http(e: reqwest::Error) -> Self { Self::Http(e.without_url()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
