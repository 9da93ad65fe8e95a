//! [`LogSink`] announces new releases as structured log events.

use std::convert::Infallible;

use castwatch_core::{notify::NotificationSink, release::Release};

/// Emits one `info` event per (subscriber, subject, release).
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
  type Error = Infallible;

  async fn notify(
    &self,
    subscriber_id: &str,
    subject_query: &str,
    release: &Release,
  ) -> Result<(), Infallible> {
    tracing::info!(
      target: "castwatch::notify",
      subscriber = subscriber_id,
      subject = subject_query,
      kind = %release.kind,
      work_id = %release.work_id,
      title = %release.title,
      release_date = %release.release_date,
      "new release"
    );
    Ok(())
  }
}
