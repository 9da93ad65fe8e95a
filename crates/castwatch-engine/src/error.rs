//! Error types for `castwatch-engine`.

use std::time::Duration;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why one subject was abandoned for this cycle. Never fatal to the cycle.
#[derive(Debug, Error)]
pub enum SubjectError {
  #[error("no provider match")]
  NotFound,

  #[error("provider error: {0}")]
  Provider(#[source] BoxError),

  #[error("provider did not answer within {0:?}")]
  Timeout(Duration),

  #[error("store error: {0}")]
  Store(#[source] BoxError),
}

impl SubjectError {
  pub(crate) fn provider(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Provider(Box::new(e))
  }

  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

/// A failure that prevents a cycle from doing any work at all.
#[derive(Debug, Error)]
pub enum CycleError {
  #[error("failed to list subscriptions: {0}")]
  Subscriptions(#[source] BoxError),
}
