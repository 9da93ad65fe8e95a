//! Error types for `castwatch-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown media kind: {0:?}")]
  UnknownMediaKind(String),

  #[error("malformed seen key: {0:?}")]
  MalformedSeenKey(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
