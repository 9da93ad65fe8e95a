//! The `NotificationSink` trait, where announcements of new releases go.

use std::future::Future;

use crate::release::Release;

/// Receives one call per (subscriber, new release) pair.
///
/// A failure is reported back to the caller, which logs it and moves on; it
/// is never retried.
pub trait NotificationSink: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn notify<'a>(
    &'a self,
    subscriber_id: &'a str,
    subject_query: &'a str,
    release: &'a Release,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
